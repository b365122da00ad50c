//! Shared session harness for core integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use leanback_config::PlaybackConfig;
use leanback_contracts::KeyValueStore;
use leanback_core::PlaybackEvent;
use leanback_core::PlaybackSession;
use leanback_core::state::{decode, state_key};
use leanback_core::storage::InMemoryStore;
use leanback_core::testing::{
    self, FakeSurface, ManualRuntime, RecordingCatalog,
};
use leanback_model::{Video, VideoId, WatchState};

/// A built session wired to deterministic doubles with a surface attached.
pub struct Harness {
    pub session: PlaybackSession,
    pub runtime: Arc<ManualRuntime>,
    pub catalog: Arc<RecordingCatalog>,
    pub store: Arc<dyn KeyValueStore>,
    pub surface: Arc<FakeSurface>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(PlaybackConfig::default())
    }

    pub fn with_config(config: PlaybackConfig) -> Self {
        Self::with_store(config, Arc::new(InMemoryStore::new()))
    }

    pub fn with_store(
        config: PlaybackConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self::with_parts(config, store, Arc::new(RecordingCatalog::new()))
    }

    pub fn with_parts(
        config: PlaybackConfig,
        store: Arc<dyn KeyValueStore>,
        catalog: Arc<RecordingCatalog>,
    ) -> Self {
        let runtime = Arc::new(ManualRuntime::new());
        let mut session = PlaybackSession::builder()
            .config(config)
            .catalog(catalog.clone())
            .store(Arc::clone(&store))
            .runtime(runtime.clone())
            .build()
            .expect("session should build");
        let surface = Arc::new(FakeSurface::new());
        session.attach_surface(surface.clone());

        Self {
            session,
            runtime,
            catalog,
            store,
            surface,
        }
    }

    pub fn dispatch(&mut self, event: PlaybackEvent) {
        self.session.dispatch(event);
    }

    pub async fn settle(&mut self) -> usize {
        testing::settle(&mut self.session, &self.runtime).await
    }

    pub async fn advance_ms(&mut self, ms: u64) {
        let step = Duration::from_millis(ms);
        testing::advance(&mut self.session, &self.runtime, step).await;
    }

    /// Open a video and let resolution, metadata and state lookup finish.
    pub async fn open(&mut self, video: Video) {
        self.session.open(video);
        self.settle().await;
    }

    /// Report the engine as loaded at `position_ms` of `duration_ms`.
    pub async fn load(&mut self, position_ms: i64, duration_ms: i64) {
        self.surface.set_progress(position_ms, duration_ms);
        self.dispatch(PlaybackEvent::VideoLoaded);
        self.settle().await;
    }

    pub async fn stored(&self, id: &str) -> Option<WatchState> {
        let video_id = VideoId::from(id);
        let bytes = self
            .store
            .get(&state_key(&video_id))
            .await
            .expect("store read")?;
        Some(decode(&video_id, &bytes).expect("decode"))
    }

    pub fn current_id(&self) -> Option<String> {
        self.session
            .state()
            .current_id()
            .map(|id| id.as_str().to_string())
    }
}
