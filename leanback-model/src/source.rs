use crate::ids::VideoId;
use url::Url;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Everything the catalog knows about how a video can be streamed.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FormatInfo {
    pub video_id: VideoId,
    pub is_live: bool,
    /// Broadcast start for live streams; `None` when the catalog doesn't know
    pub start_time_ms: Option<i64>,
    pub is_unplayable: bool,
    pub is_age_restricted: bool,
    pub status_message: Option<String>,
    /// Adaptive formats are present and a manifest can be built from them
    pub has_dash_formats: bool,
    pub dash_manifest_url: Option<Url>,
    pub hls_manifest_url: Option<Url>,
    /// Progressive fallbacks, best first
    pub url_list: Vec<Url>,
}

impl FormatInfo {
    pub fn contains_dash_formats(&self) -> bool {
        self.has_dash_formats
    }

    pub fn contains_dash_url(&self) -> bool {
        self.dash_manifest_url.is_some()
    }

    pub fn contains_hls_url(&self) -> bool {
        self.hls_manifest_url.is_some()
    }

    pub fn contains_url_list(&self) -> bool {
        !self.url_list.is_empty()
    }

    pub fn has_known_start_time(&self) -> bool {
        self.start_time_ms.is_some_and(|start| start > 0)
    }
}

/// A decoded DASH manifest ready to hand to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DashManifest {
    pub video_id: VideoId,
    pub mpd: String,
}

/// The concrete representation the engine is told to open
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum StreamDescriptor {
    DashManifest { manifest: DashManifest },
    DashUrl { url: Url },
    HlsUrl { url: Url },
    UrlList { urls: Vec<Url> },
}

impl StreamDescriptor {
    pub fn label(&self) -> &'static str {
        match self {
            StreamDescriptor::DashManifest { .. } => "dash_manifest",
            StreamDescriptor::DashUrl { .. } => "dash_url",
            StreamDescriptor::HlsUrl { .. } => "hls_url",
            StreamDescriptor::UrlList { .. } => "url_list",
        }
    }
}

/// A selected stream plus the availability flags it was resolved with
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlayableSource {
    pub stream: StreamDescriptor,
    pub is_live: bool,
    pub is_unplayable: bool,
    pub is_age_restricted: bool,
    pub status_message: Option<String>,
}

impl PlayableSource {
    pub fn from_format(info: &FormatInfo, stream: StreamDescriptor) -> Self {
        Self {
            stream,
            is_live: info.is_live,
            is_unplayable: info.is_unplayable,
            is_age_restricted: info.is_age_restricted,
            status_message: info.status_message.clone(),
        }
    }
}
