//! Flat snapshot of the model surface for handler and collaborator code.

pub use super::ids::{ChannelId, GroupId, PlaylistId, VideoId};
pub use super::metadata::{Metadata, MetadataRequest, Page};
pub use super::playback::{
    BufferTarget, ErrorEvent, ErrorKind, KeyInput, NetworkTransport,
    PlaybackTweaks, RepeatPolicy, TrackChannel,
};
pub use super::source::{
    DashManifest, FormatInfo, PlayableSource, StreamDescriptor,
};
pub use super::video::{GroupKind, GroupRef, PlaylistLink, Video, VideoGroup};
pub use super::watch::{WatchState, speed_from_percent, speed_to_percent};
