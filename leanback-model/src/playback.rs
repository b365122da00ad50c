use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Where the engine says a failure originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ErrorKind {
    Source,
    Renderer,
    Unexpected,
}

/// Which track renderer an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TrackChannel {
    Video,
    Audio,
    Subtitle,
    Unknown,
}

/// A failure reported by the rendering engine
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ErrorEvent {
    pub kind: ErrorKind,
    pub channel: TrackChannel,
    pub message: Option<String>,
    /// Engine-side cause, e.g. the exception class name
    pub cause: Option<String>,
}

impl ErrorEvent {
    pub fn new(kind: ErrorKind, channel: TrackChannel) -> Self {
        Self {
            kind,
            channel,
            message: None,
            cause: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }

    pub fn cause(&self) -> &str {
        self.cause.as_deref().unwrap_or_default()
    }
}

impl fmt::Display for ErrorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}", self.kind, self.channel)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(cause) = &self.cause {
            write!(f, " ({cause})")?;
        }
        Ok(())
    }
}

/// What happens when a video ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RepeatPolicy {
    #[default]
    All,
    One,
    Close,
    Pause,
    List,
    Shuffle,
    ReverseList,
}

/// Network stack used by the engine's data source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NetworkTransport {
    #[default]
    Default,
    Cronet,
    OkHttp,
}

impl NetworkTransport {
    /// Rotate to the next transport in a fixed cycle.
    pub fn next(self) -> Self {
        match self {
            NetworkTransport::Default => NetworkTransport::Cronet,
            NetworkTransport::Cronet => NetworkTransport::OkHttp,
            NetworkTransport::OkHttp => NetworkTransport::Default,
        }
    }
}

/// Engine forward-buffer size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BufferTarget {
    Low,
    Medium,
    #[default]
    High,
}

impl BufferTarget {
    pub fn shrink(self) -> Self {
        match self {
            BufferTarget::High => BufferTarget::Medium,
            BufferTarget::Medium | BufferTarget::Low => BufferTarget::Low,
        }
    }
}

/// Engine-facing knobs mutated by error remediation
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlaybackTweaks {
    pub transport: NetworkTransport,
    pub buffer_target: BufferTarget,
    /// Sectioned/chunked buffering; some streams stall with it on
    pub buffering_feature_enabled: bool,
    /// Fall back to the default (most compatible) format per channel
    pub video_format_fallback: bool,
    pub audio_format_fallback: bool,
    pub subtitles_disabled: bool,
}

impl Default for PlaybackTweaks {
    fn default() -> Self {
        Self {
            transport: NetworkTransport::Default,
            buffer_target: BufferTarget::High,
            buffering_feature_enabled: true,
            video_format_fallback: false,
            audio_format_fallback: false,
            subtitles_disabled: false,
        }
    }
}

/// Remote/keyboard input routed through chain dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum KeyInput {
    Back,
    PlayPause,
    Enter,
    Up,
    Down,
    Left,
    Right,
    MediaNext,
    MediaPrevious,
    Other(u32),
}
