use crate::ids::{ChannelId, GroupId, PlaylistId, VideoId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Playlist context a video was opened from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlaylistLink {
    pub playlist_id: Option<PlaylistId>,
    pub playlist_index: Option<u32>,
    /// Opaque catalog parameters forwarded with metadata requests
    pub playlist_params: Option<String>,
}

impl PlaylistLink {
    pub fn is_empty(&self) -> bool {
        self.playlist_id.is_none()
    }
}

/// What kind of row a group represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GroupKind {
    Playlist,
    Channel,
    Uploads,
    Suggestions,
    Queue,
}

impl GroupKind {
    /// Bounded groups have a meaningful first item, so reverse stepping
    /// through them terminates.
    pub fn is_bounded(&self) -> bool {
        matches!(
            self,
            GroupKind::Playlist | GroupKind::Channel | GroupKind::Uploads
        )
    }
}

/// Non-owning link from a video to the row it was picked from.
///
/// Resolved through the session's group registry; the group itself is owned
/// by whoever loaded it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroupRef {
    pub id: GroupId,
    pub kind: GroupKind,
}

/// A single playable catalog item.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Video {
    pub id: VideoId,
    pub title: String,
    pub channel_id: Option<ChannelId>,

    pub is_live: bool,
    pub is_upcoming: bool,
    pub is_shorts: bool,
    pub belongs_to_music: bool,
    /// Close the player once this item ends instead of applying repeat policy
    pub finish_on_ended: bool,

    pub playlist: PlaylistLink,

    /// Seek target requested by whoever opened the video (e.g. a `t=` link)
    pub pending_position_ms: Option<i64>,
    /// Server-reported watch percentage (0-100)
    pub percent_watched: f32,
    /// Set once metadata has been merged into this item
    pub is_synced: bool,
    /// Server timestamp of `percent_watched`, unix millis
    pub timestamp_ms: i64,

    /// Lazily resolved successor; cleared once consumed
    pub next_item: Option<Box<Video>>,
    /// UI-only back link to the owning row
    pub group: Option<GroupRef>,
}

impl Video {
    pub fn new(id: impl Into<VideoId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_group(mut self, id: GroupId, kind: GroupKind) -> Self {
        self.group = Some(GroupRef { id, kind });
        self
    }

    pub fn has_playlist(&self) -> bool {
        !self.playlist.is_empty()
    }

    /// Take the successor link, leaving `None` behind.
    pub fn take_next(&mut self) -> Option<Video> {
        self.next_item.take().map(|next| *next)
    }

    pub fn is_fully_watched(&self) -> bool {
        self.percent_watched >= 100.0
    }

    /// Belongs to a group that can be walked backwards to a first item.
    pub fn in_bounded_group(&self) -> bool {
        self.group
            .as_ref()
            .map(|group| group.kind.is_bounded())
            .unwrap_or(false)
    }

    /// Merge refreshed catalog fields without discarding local linkage.
    pub fn sync_from(&mut self, fresh: &Video) {
        if !fresh.title.is_empty() {
            self.title = fresh.title.clone();
        }
        if fresh.channel_id.is_some() {
            self.channel_id = fresh.channel_id.clone();
        }
        self.is_live = fresh.is_live;
        self.is_upcoming = fresh.is_upcoming;
        self.is_shorts |= fresh.is_shorts;
        self.belongs_to_music |= fresh.belongs_to_music;
        if fresh.timestamp_ms > self.timestamp_ms {
            self.percent_watched = fresh.percent_watched;
            self.timestamp_ms = fresh.timestamp_ms;
        }
        if self.playlist.is_empty() {
            self.playlist = fresh.playlist.clone();
        }
        self.is_synced = true;
    }
}

/// An ordered, growable row of videos with an opaque continuation token.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VideoGroup {
    pub id: GroupId,
    pub kind: GroupKind,
    pub title: String,
    pub videos: Vec<Video>,
    pub continuation: Option<String>,
}

impl VideoGroup {
    pub fn new(id: impl Into<GroupId>, kind: GroupKind) -> Self {
        Self {
            id: id.into(),
            kind,
            title: String::new(),
            videos: Vec::new(),
            continuation: None,
        }
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn has_more(&self) -> bool {
        self.continuation.is_some()
    }

    pub fn position_of(&self, video_id: &VideoId) -> Option<usize> {
        self.videos.iter().position(|video| &video.id == video_id)
    }

    pub fn get(&self, index: usize) -> Option<&Video> {
        self.videos.get(index)
    }

    /// Append a page in place; the group keeps its identity while it grows.
    pub fn append(&mut self, videos: Vec<Video>, continuation: Option<String>) {
        let group_ref = GroupRef {
            id: self.id.clone(),
            kind: self.kind,
        };
        self.videos.extend(videos.into_iter().map(|mut video| {
            video.group.get_or_insert_with(|| group_ref.clone());
            video
        }));
        self.continuation = continuation;
    }
}
