use leanback_contracts::{CatalogResult, StorageResult};
use leanback_model::{
    DashManifest, ErrorEvent, FormatInfo, GroupId, KeyInput, Metadata, Page,
    Video, VideoId,
};

use crate::runtime::TaskId;

/// Lifecycle events broadcast to every handler in list order.
#[derive(Debug, Clone)]
pub enum PlaybackEvent {
    Init,
    /// A video was opened, either by the user or by next-item resolution.
    NewVideo(Video),
    ViewAttached,
    ViewDetached,
    EngineInitialized,
    EngineReleased,
    EngineError(ErrorEvent),
    /// The engine finished preparing the current video.
    VideoLoaded,
    Play,
    Pause,
    SeekEnd,
    PlayEnd,
    Buffering,
    TracksChanged,
    SpeedChanged(f32),
    /// Periodic engine tick while playing.
    Tickle,
    MetadataLoaded(Metadata),
    SuggestionClicked(Video),
    /// Add a video to the user queue.
    Enqueue(Video),
    /// Load the next page of a registered group.
    ContinueGroup(GroupId),
    Timer {
        task: TaskId,
        timer: TimerKind,
    },
    Completed {
        task: TaskId,
        completion: Completion,
    },
}

impl PlaybackEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackEvent::Init => "init",
            PlaybackEvent::NewVideo(_) => "new_video",
            PlaybackEvent::ViewAttached => "view_attached",
            PlaybackEvent::ViewDetached => "view_detached",
            PlaybackEvent::EngineInitialized => "engine_initialized",
            PlaybackEvent::EngineReleased => "engine_released",
            PlaybackEvent::EngineError(_) => "engine_error",
            PlaybackEvent::VideoLoaded => "video_loaded",
            PlaybackEvent::Play => "play",
            PlaybackEvent::Pause => "pause",
            PlaybackEvent::SeekEnd => "seek_end",
            PlaybackEvent::PlayEnd => "play_end",
            PlaybackEvent::Buffering => "buffering",
            PlaybackEvent::TracksChanged => "tracks_changed",
            PlaybackEvent::SpeedChanged(_) => "speed_changed",
            PlaybackEvent::Tickle => "tickle",
            PlaybackEvent::MetadataLoaded(_) => "metadata_loaded",
            PlaybackEvent::SuggestionClicked(_) => "suggestion_clicked",
            PlaybackEvent::Enqueue(_) => "enqueue",
            PlaybackEvent::ContinueGroup(_) => "continue_group",
            PlaybackEvent::Timer { timer, .. } => timer.name(),
            PlaybackEvent::Completed { completion, .. } => completion.name(),
        }
    }

    /// High-frequency events logged at trace level only.
    pub fn is_noisy(&self) -> bool {
        matches!(
            self,
            PlaybackEvent::Tickle
                | PlaybackEvent::Completed {
                    completion: Completion::StateSaved { .. },
                    ..
                }
        )
    }
}

/// Inputs only one handler may claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainEvent {
    KeyDown(KeyInput),
    PreviousClicked,
    NextClicked,
}

impl ChainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ChainEvent::KeyDown(_) => "key_down",
            ChainEvent::PreviousClicked => "previous_clicked",
            ChainEvent::NextClicked => "next_clicked",
        }
    }
}

/// Outcome of chain dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Handled {
    Yes,
    #[default]
    No,
}

impl Handled {
    pub fn is_handled(self) -> bool {
        self == Handled::Yes
    }
}

impl From<bool> for Handled {
    fn from(handled: bool) -> Self {
        if handled { Handled::Yes } else { Handled::No }
    }
}

/// Single-shot timers issued by handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Engine restart after an error cool-down.
    RestartEngine,
    /// Re-run format resolution (retry or scheduled stream reload).
    ReloadVideo,
    BufferingWatchdog,
    /// Re-check whether a successor is known yet.
    NextPoll,
    /// Move past an unplayable item.
    SkipUnplayable,
}

impl TimerKind {
    pub fn name(&self) -> &'static str {
        match self {
            TimerKind::RestartEngine => "timer.restart_engine",
            TimerKind::ReloadVideo => "timer.reload_video",
            TimerKind::BufferingWatchdog => "timer.buffering_watchdog",
            TimerKind::NextPoll => "timer.next_poll",
            TimerKind::SkipUnplayable => "timer.skip_unplayable",
        }
    }
}

/// Results of background work, delivered back on the dispatch loop.
#[derive(Debug, Clone)]
pub enum Completion {
    Formats {
        video_id: VideoId,
        result: CatalogResult<FormatInfo>,
    },
    Manifest {
        video_id: VideoId,
        result: CatalogResult<DashManifest>,
    },
    Metadata {
        video_id: VideoId,
        result: CatalogResult<Metadata>,
    },
    Page {
        group_id: GroupId,
        result: CatalogResult<Page>,
    },
    StateLookup {
        video_id: VideoId,
        result: StorageResult<Option<Vec<u8>>>,
    },
    StateSaved {
        video_id: VideoId,
        result: StorageResult<()>,
    },
    HistoryPushed {
        video_id: VideoId,
        result: CatalogResult<()>,
    },
}

impl Completion {
    pub fn name(&self) -> &'static str {
        match self {
            Completion::Formats { .. } => "completed.formats",
            Completion::Manifest { .. } => "completed.manifest",
            Completion::Metadata { .. } => "completed.metadata",
            Completion::Page { .. } => "completed.page",
            Completion::StateLookup { .. } => "completed.state_lookup",
            Completion::StateSaved { .. } => "completed.state_saved",
            Completion::HistoryPushed { .. } => "completed.history_pushed",
        }
    }
}
