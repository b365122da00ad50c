use std::fmt;

use leanback_contracts::{ErrorNotice, PlaybackEngine, PlaybackOverlay};
use leanback_model::{
    DashManifest, GroupId, PlaybackTweaks, StreamDescriptor, Video, VideoGroup,
    VideoId,
};
use parking_lot::Mutex;
use url::Url;

/// Everything a handler asked the surface to do, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Open(StreamDescriptor),
    SetPosition(i64),
    SetSpeed(f32),
    SetPlayWhenReady(bool),
    Restart,
    ApplyTweaks(PlaybackTweaks),
    ShowMetadata(VideoId),
    ShowSuggestions(bool),
    UpdateGroup { group_id: GroupId, visible: usize },
    ShowError(ErrorNotice),
    ShowSignIn,
    Close,
}

struct Inner {
    position_ms: i64,
    duration_ms: i64,
    speed: f32,
    play_when_ready: bool,
    suggestions_shown: bool,
    dialog_open: bool,
    calls: Vec<SurfaceCall>,
}

/// In-memory engine and overlay that records every call.
pub struct FakeSurface {
    inner: Mutex<Inner>,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                position_ms: 0,
                duration_ms: 0,
                speed: 1.0,
                play_when_ready: true,
                suggestions_shown: false,
                dialog_open: false,
                calls: Vec::new(),
            }),
        }
    }

    fn record(inner: &mut Inner, call: SurfaceCall) {
        inner.calls.push(call);
    }

    /// Simulate the engine reaching `position_ms` of `duration_ms`.
    pub fn set_progress(&self, position_ms: i64, duration_ms: i64) {
        let mut inner = self.inner.lock();
        inner.position_ms = position_ms;
        inner.duration_ms = duration_ms;
    }

    pub fn set_dialog_open(&self, open: bool) {
        self.inner.lock().dialog_open = open;
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.inner.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    pub fn opened(&self) -> Vec<StreamDescriptor> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                SurfaceCall::Open(stream) => Some(stream.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<ErrorNotice> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                SurfaceCall::ShowError(notice) => Some(notice.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn was_called(&self, call: &SurfaceCall) -> bool {
        self.inner.lock().calls.contains(call)
    }
}

impl Default for FakeSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FakeSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(inner) => f
                .debug_struct("FakeSurface")
                .field("position_ms", &inner.position_ms)
                .field("duration_ms", &inner.duration_ms)
                .field("speed", &inner.speed)
                .field("calls", &inner.calls.len())
                .finish(),
            None => f.write_str("FakeSurface { <locked> }"),
        }
    }
}

impl PlaybackEngine for FakeSurface {
    fn open_dash(&self, manifest: &DashManifest) {
        let mut inner = self.inner.lock();
        inner.position_ms = 0;
        Self::record(
            &mut inner,
            SurfaceCall::Open(StreamDescriptor::DashManifest {
                manifest: manifest.clone(),
            }),
        );
    }

    fn open_dash_url(&self, url: &Url) {
        let mut inner = self.inner.lock();
        inner.position_ms = 0;
        Self::record(
            &mut inner,
            SurfaceCall::Open(StreamDescriptor::DashUrl { url: url.clone() }),
        );
    }

    fn open_hls(&self, url: &Url) {
        let mut inner = self.inner.lock();
        inner.position_ms = 0;
        Self::record(
            &mut inner,
            SurfaceCall::Open(StreamDescriptor::HlsUrl { url: url.clone() }),
        );
    }

    fn open_url_list(&self, urls: &[Url]) {
        let mut inner = self.inner.lock();
        inner.position_ms = 0;
        Self::record(
            &mut inner,
            SurfaceCall::Open(StreamDescriptor::UrlList {
                urls: urls.to_vec(),
            }),
        );
    }

    fn position_ms(&self) -> i64 {
        self.inner.lock().position_ms
    }

    fn set_position_ms(&self, position_ms: i64) {
        let mut inner = self.inner.lock();
        inner.position_ms = position_ms;
        Self::record(&mut inner, SurfaceCall::SetPosition(position_ms));
    }

    fn duration_ms(&self) -> i64 {
        self.inner.lock().duration_ms
    }

    fn speed(&self) -> f32 {
        self.inner.lock().speed
    }

    fn set_speed(&self, speed: f32) {
        let mut inner = self.inner.lock();
        inner.speed = speed;
        Self::record(&mut inner, SurfaceCall::SetSpeed(speed));
    }

    fn is_play_when_ready(&self) -> bool {
        self.inner.lock().play_when_ready
    }

    fn set_play_when_ready(&self, play: bool) {
        let mut inner = self.inner.lock();
        inner.play_when_ready = play;
        Self::record(&mut inner, SurfaceCall::SetPlayWhenReady(play));
    }

    fn restart(&self) {
        Self::record(&mut self.inner.lock(), SurfaceCall::Restart);
    }

    fn apply_tweaks(&self, tweaks: &PlaybackTweaks) {
        let call = SurfaceCall::ApplyTweaks(tweaks.clone());
        Self::record(&mut self.inner.lock(), call);
    }
}

impl PlaybackOverlay for FakeSurface {
    fn show_metadata(&self, video: &Video) {
        Self::record(
            &mut self.inner.lock(),
            SurfaceCall::ShowMetadata(video.id.clone()),
        );
    }

    fn show_suggestions(&self, show: bool) {
        let mut inner = self.inner.lock();
        inner.suggestions_shown = show;
        Self::record(&mut inner, SurfaceCall::ShowSuggestions(show));
    }

    fn is_suggestions_shown(&self) -> bool {
        self.inner.lock().suggestions_shown
    }

    fn is_dialog_open(&self) -> bool {
        self.inner.lock().dialog_open
    }

    fn update_group(&self, group: &VideoGroup) {
        Self::record(
            &mut self.inner.lock(),
            SurfaceCall::UpdateGroup {
                group_id: group.id.clone(),
                visible: group.len(),
            },
        );
    }

    fn show_error(&self, notice: &ErrorNotice) {
        let call = SurfaceCall::ShowError(notice.clone());
        Self::record(&mut self.inner.lock(), call);
    }

    fn show_sign_in(&self) {
        Self::record(&mut self.inner.lock(), SurfaceCall::ShowSignIn);
    }

    fn close(&self) {
        Self::record(&mut self.inner.lock(), SurfaceCall::Close);
    }
}
