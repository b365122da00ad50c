use leanback_model::{Video, VideoId};

/// Oldest history entries are dropped past this length.
const MAX_ENTRIES: usize = 50;

#[derive(Debug, Clone)]
struct Entry {
    video: Video,
    /// Explicitly queued by the user and not yet played.
    queued: bool,
}

/// Play history plus the user's "play next" queue.
///
/// Entries before the cursor are history; entries after it are either
/// user-queued items or forward history reached by stepping back.
#[derive(Debug, Clone, Default)]
pub struct PlaybackQueue {
    entries: Vec<Entry>,
    cursor: Option<usize>,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current(&self) -> Option<&Video> {
        self.cursor
            .and_then(|index| self.entries.get(index))
            .map(|entry| &entry.video)
    }

    /// Move the cursor to `video`, inserting it after the current entry when
    /// it is not already known. Forward history that was not explicitly
    /// queued is discarded, like a browser.
    pub fn open(&mut self, video: &Video) {
        if let Some(index) = self.position_of(&video.id) {
            self.cursor = Some(index);
            if let Some(entry) = self.entries.get_mut(index) {
                entry.queued = false;
                entry.video = video.clone();
            }
            return;
        }

        let insert_at = self.cursor.map_or(0, |cursor| cursor + 1);
        let mut index = insert_at;
        while index < self.entries.len() {
            if self.entries[index].queued {
                index += 1;
            } else {
                self.entries.remove(index);
            }
        }

        self.entries.insert(
            insert_at,
            Entry {
                video: video.clone(),
                queued: false,
            },
        );
        self.cursor = Some(insert_at);
        self.trim();
    }

    /// Append `video` to the user queue. A pending duplicate moves to the
    /// end; the current item is never re-queued.
    pub fn enqueue(&mut self, video: Video) {
        if self.current().is_some_and(|current| current.id == video.id) {
            return;
        }
        if let Some(index) = self.position_of(&video.id) {
            self.entries.remove(index);
            if let Some(cursor) = self.cursor.as_mut()
                && index < *cursor
            {
                *cursor -= 1;
            }
        }
        self.entries.push(Entry {
            video,
            queued: true,
        });
        self.trim();
    }

    pub fn next(&self) -> Option<&Video> {
        let index = self.cursor.map_or(0, |cursor| cursor + 1);
        self.entries.get(index).map(|entry| &entry.video)
    }

    pub fn previous(&self) -> Option<&Video> {
        let cursor = self.cursor?;
        let index = cursor.checked_sub(1)?;
        self.entries.get(index).map(|entry| &entry.video)
    }

    pub fn has_next(&self) -> bool {
        self.next().is_some()
    }

    /// Something the user explicitly queued is still waiting after the
    /// cursor. Forward history left by stepping back does not count.
    pub fn has_queued(&self) -> bool {
        let start = self.cursor.map_or(0, |cursor| cursor + 1);
        self.entries.iter().skip(start).any(|entry| entry.queued)
    }

    fn position_of(&self, id: &VideoId) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.video.id == id)
    }

    fn trim(&mut self) {
        while self.entries.len() > MAX_ENTRIES {
            match self.cursor {
                Some(cursor) if cursor > 0 => {
                    self.entries.remove(0);
                    self.cursor = Some(cursor - 1);
                }
                _ => {
                    self.entries.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(id: &str) -> Video {
        Video::new(id, id.to_uppercase())
    }

    #[test]
    fn queued_items_survive_opening_new_videos() {
        let mut queue = PlaybackQueue::new();
        queue.open(&video("a"));
        queue.enqueue(video("q"));
        queue.open(&video("b"));

        assert_eq!(queue.previous().map(|v| v.id.as_str()), Some("a"));
        assert_eq!(queue.next().map(|v| v.id.as_str()), Some("q"));
        assert!(queue.has_queued());
    }

    #[test]
    fn stepping_back_keeps_forward_history_until_a_new_open() {
        let mut queue = PlaybackQueue::new();
        queue.open(&video("a"));
        queue.open(&video("b"));
        queue.open(&video("a"));

        assert_eq!(queue.next().map(|v| v.id.as_str()), Some("b"));
        assert!(!queue.has_queued());

        queue.open(&video("c"));
        assert!(queue.next().is_none());
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn current_item_is_never_requeued() {
        let mut queue = PlaybackQueue::new();
        queue.open(&video("a"));
        queue.enqueue(video("a"));

        assert!(!queue.has_next());
    }

    #[test]
    fn history_is_bounded() {
        let mut queue = PlaybackQueue::new();
        for index in 0..(MAX_ENTRIES + 5) {
            queue.open(&video(&format!("v{index}")));
        }

        assert_eq!(queue.len(), MAX_ENTRIES);
        assert_eq!(
            queue.current().map(|v| v.id.to_string()),
            Some(format!("v{}", MAX_ENTRIES + 4))
        );
    }
}
