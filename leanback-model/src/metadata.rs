use crate::ids::{PlaylistId, VideoId};
use crate::video::{Video, VideoGroup};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for a metadata lookup
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MetadataRequest {
    pub video_id: VideoId,
    pub playlist_id: Option<PlaylistId>,
    pub playlist_index: Option<u32>,
    pub playlist_params: Option<String>,
}

impl From<&Video> for MetadataRequest {
    fn from(video: &Video) -> Self {
        Self {
            video_id: video.id.clone(),
            playlist_id: video.playlist.playlist_id.clone(),
            playlist_index: video.playlist.playlist_index,
            playlist_params: video.playlist.playlist_params.clone(),
        }
    }
}

/// Catalog metadata for the playing video: refreshed item fields, ranked
/// suggestion groups and the successor hint.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Metadata {
    pub video: Video,
    pub suggestions: Vec<VideoGroup>,
    pub next_video: Option<Video>,
}

/// One continuation page for a group
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Page {
    pub videos: Vec<Video>,
    pub continuation: Option<String>,
}
