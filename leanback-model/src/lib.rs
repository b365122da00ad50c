//! Value types shared across the Leanback playback crates.
#![allow(missing_docs)]

pub mod error;
pub mod ids;
pub mod metadata;
pub mod playback;
pub mod prelude;
pub mod source;
pub mod video;
pub mod watch;

// Intentionally curated re-exports for downstream consumers.
pub use error::{ModelError, Result as ModelResult};
pub use ids::{ChannelId, GroupId, PlaylistId, VideoId};
pub use metadata::{Metadata, MetadataRequest, Page};
pub use playback::{
    BufferTarget, ErrorEvent, ErrorKind, KeyInput, NetworkTransport,
    PlaybackTweaks, RepeatPolicy, TrackChannel,
};
pub use source::{DashManifest, FormatInfo, PlayableSource, StreamDescriptor};
pub use video::{GroupKind, GroupRef, PlaylistLink, Video, VideoGroup};
pub use watch::WatchState;
