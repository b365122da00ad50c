use leanback_model::{
    DashManifest, PlaybackTweaks, Video, VideoGroup, VideoId,
};
use std::fmt::Debug;
use url::Url;

/// Controls exposed by the rendering engine.
pub trait PlaybackEngine: Send + Sync {
    fn open_dash(&self, manifest: &DashManifest);
    fn open_dash_url(&self, url: &Url);
    fn open_hls(&self, url: &Url);
    fn open_url_list(&self, urls: &[Url]);

    fn position_ms(&self) -> i64;
    fn set_position_ms(&self, position_ms: i64);
    fn duration_ms(&self) -> i64;

    fn speed(&self) -> f32;
    fn set_speed(&self, speed: f32);

    fn is_play_when_ready(&self) -> bool;
    fn set_play_when_ready(&self, play: bool);

    /// Tear the engine down and build a new one; it reports back through
    /// the released/initialized callbacks.
    fn restart(&self);

    fn apply_tweaks(&self, tweaks: &PlaybackTweaks);
}

/// A user-visible failure report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub video_id: VideoId,
    pub title: String,
    pub detail: Option<String>,
}

/// Intents emitted to the view layer.
pub trait PlaybackOverlay: Send + Sync {
    fn show_metadata(&self, video: &Video);

    fn show_suggestions(&self, show: bool);
    fn is_suggestions_shown(&self) -> bool;

    /// Any modal dialog (settings, comments, ...) currently on screen
    fn is_dialog_open(&self) -> bool;

    /// Replace or add a suggestion row with the group's current contents.
    fn update_group(&self, group: &VideoGroup);

    fn show_error(&self, notice: &ErrorNotice);
    fn show_sign_in(&self);

    /// Close the playback surface entirely.
    fn close(&self);
}

/// The bound playback screen: engine controls plus view intents.
pub trait PlaybackSurface: PlaybackEngine + PlaybackOverlay + Debug {}

impl<T> PlaybackSurface for T where
    T: PlaybackEngine + PlaybackOverlay + Debug
{
}
