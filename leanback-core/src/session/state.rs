use leanback_model::{ErrorKind, PlaybackTweaks, Video, VideoId};

use super::{GroupRegistry, PlaybackQueue};

/// Mutable state shared by all handlers of one session.
///
/// Lives in the composition root and is lent to handlers through the
/// dispatch context; handlers never keep references to it.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    current: Option<Video>,
    /// Bumped every time a new video pipeline actually starts.
    serial: u64,
    pub last_error: Option<ErrorKind>,
    pub tweaks: PlaybackTweaks,
    pub queue: PlaybackQueue,
    pub groups: GroupRegistry,
}

impl SessionState {
    pub fn new(tweaks: PlaybackTweaks) -> Self {
        Self {
            tweaks,
            ..Default::default()
        }
    }

    pub fn current(&self) -> Option<&Video> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut Video> {
        self.current.as_mut()
    }

    pub fn current_id(&self) -> Option<&VideoId> {
        self.current.as_ref().map(|video| &video.id)
    }

    pub fn is_current(&self, id: &VideoId) -> bool {
        self.current_id() == Some(id)
    }

    /// Make `video` current and start a new serial. Called by the loader
    /// once it commits to opening a video; handlers that run later for the
    /// same `NewVideo` compare serials to tell a real open from a duplicate.
    pub fn begin_video(&mut self, video: Video) -> u64 {
        self.queue.open(&video);
        self.current = Some(video);
        self.serial += 1;
        self.serial
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_video_records_history_and_bumps_serial() {
        let mut state = SessionState::default();
        let first = state.begin_video(Video::new("a", "A"));
        let second = state.begin_video(Video::new("b", "B"));

        assert_eq!(second, first + 1);
        assert!(state.is_current(&"b".into()));
        assert_eq!(state.queue.previous().map(|v| v.id.as_str()), Some("a"));
    }
}
