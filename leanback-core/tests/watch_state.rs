mod support;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use leanback_config::PlaybackConfig;
use leanback_contracts::{KeyValueStore, PlaybackEngine, StorageResult};
use leanback_core::state::{decode, encode, state_key};
use leanback_core::{PlaybackEvent, StateStore, TokioTaskRuntime};
use tokio::sync::mpsc;
use leanback_core::storage::InMemoryStore;
use leanback_core::testing::{
    EPOCH_MS, FailingStore, ManualRuntime, RecordingCatalog, SurfaceCall,
};
use leanback_model::{FormatInfo, Metadata, Video, VideoId, WatchState};
use support::Harness;
use url::Url;

fn video(id: &str) -> Video {
    Video::new(id, format!("Video {id}"))
}

async fn seeded(states: &[WatchState]) -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    for state in states {
        store
            .put(&state_key(&state.video_id), encode(state).expect("encode"))
            .await
            .expect("seed");
    }
    store
}

fn positions(h: &Harness) -> Vec<i64> {
    h.surface
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            SurfaceCall::SetPosition(position) => Some(position),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn save_then_restore_returns_the_same_tuple() {
    let backing = Arc::new(InMemoryStore::new());
    let runtime = Arc::new(ManualRuntime::new());
    let mut store = StateStore::new(
        backing.clone(),
        Arc::new(RecordingCatalog::new()),
        runtime.clone(),
        Default::default(),
    );
    let state = WatchState::new("v".into(), 42_000, 600_000, 1.25, EPOCH_MS);

    store.save(state.clone());

    assert_eq!(store.restore(&"v".into()), Some(&state));
    assert_eq!(runtime.run_tasks().await.len(), 1);
    assert!(backing.contains_key("watch_state/v1/v"));
}

#[tokio::test]
async fn position_and_speed_survive_a_new_session() {
    let mut config = PlaybackConfig::default();
    config.state.remember_speed_per_item = true;
    let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());

    let mut first = Harness::with_store(config.clone(), Arc::clone(&store));
    first.open(video("v")).await;
    first.load(0, 600_000).await;
    first.surface.set_progress(42_000, 600_000);
    first.dispatch(PlaybackEvent::SpeedChanged(1.25));
    first.surface.set_speed(1.25);
    first.dispatch(PlaybackEvent::Pause);
    first.settle().await;

    let stored = first.stored("v").await.expect("saved");
    assert_eq!(
        (stored.position_ms, stored.length_ms, stored.speed),
        (42_000, 600_000, 1.25)
    );

    let mut second = Harness::with_store(config, store);
    second.open(video("v")).await;
    second.load(0, 600_000).await;

    assert_eq!(positions(&second), vec![42_000]);
    assert!(second.surface.was_called(&SurfaceCall::SetSpeed(1.25)));
}

#[tokio::test]
async fn global_speed_carries_to_the_next_item() {
    let mut h = Harness::new();
    h.open(video("a")).await;
    h.load(0, 600_000).await;
    h.dispatch(PlaybackEvent::SpeedChanged(1.5));

    h.open(video("b")).await;
    h.load(0, 600_000).await;

    assert_eq!(
        h.surface.calls().last(),
        Some(&SurfaceCall::SetSpeed(1.5))
    );
}

fn live_catalog(live: &Video) -> Arc<RecordingCatalog> {
    let catalog = Arc::new(RecordingCatalog::new());
    catalog.set_formats(
        "live",
        Ok(FormatInfo {
            video_id: "live".into(),
            is_live: true,
            hls_manifest_url: Url::parse("https://media.example/live.m3u8")
                .ok(),
            ..FormatInfo::default()
        }),
    );
    catalog.set_metadata(
        "live",
        Ok(Metadata {
            video: live.clone(),
            suggestions: Vec::new(),
            next_video: None,
        }),
    );
    catalog
}

fn live_video() -> Video {
    let mut live = video("live");
    live.is_live = true;
    live
}

fn speeds(h: &Harness) -> Vec<f32> {
    h.surface
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            SurfaceCall::SetSpeed(speed) => Some(speed),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn live_items_ignore_stale_local_and_fresher_server_positions() {
    let store = seeded(&[WatchState::new(
        "live".into(),
        900_000,
        3_600_000,
        1.0,
        EPOCH_MS - 86_400_000,
    )])
    .await;
    let mut live = live_video();
    live.percent_watched = 40.0;
    live.timestamp_ms = EPOCH_MS;
    let catalog = live_catalog(&live);

    let mut h = Harness::with_parts(PlaybackConfig::default(), store, catalog);
    h.open(live).await;
    h.load(0, 3_600_000).await;

    assert!(positions(&h).is_empty());
    assert!(h.surface.was_called(&SurfaceCall::SetSpeed(1.0)));
}

async fn live_with_remembered_speed() -> Harness {
    let store = seeded(&[WatchState::new(
        "live".into(),
        0,
        3_600_000,
        2.0,
        EPOCH_MS - 86_400_000,
    )])
    .await;
    let mut config = PlaybackConfig::default();
    config.state.remember_speed_per_item = true;
    let live = live_video();
    let catalog = live_catalog(&live);

    let mut h = Harness::with_parts(config, store, catalog);
    h.open(live).await;
    h
}

#[tokio::test]
async fn live_streams_at_the_edge_play_at_normal_speed() {
    let mut h = live_with_remembered_speed().await;

    h.load(3_590_000, 3_600_000).await;

    assert_eq!(speeds(&h), vec![1.0]);
}

#[tokio::test]
async fn live_streams_behind_the_edge_keep_their_speed() {
    let mut h = live_with_remembered_speed().await;

    h.load(1_000_000, 3_600_000).await;

    assert_eq!(speeds(&h), vec![2.0]);
}

#[tokio::test]
async fn fresher_server_progress_wins_over_missing_local_state() {
    let catalog = Arc::new(RecordingCatalog::new());
    let mut fresh = video("v");
    fresh.percent_watched = 50.0;
    fresh.timestamp_ms = EPOCH_MS;
    catalog.set_metadata(
        "v",
        Ok(Metadata {
            video: fresh,
            suggestions: Vec::new(),
            next_video: None,
        }),
    );

    let mut h = Harness::with_parts(
        PlaybackConfig::default(),
        Arc::new(InMemoryStore::new()),
        catalog,
    );
    h.open(video("v")).await;
    h.load(0, 600_000).await;

    assert_eq!(positions(&h), vec![300_000]);
}

#[tokio::test]
async fn saves_near_the_end_record_the_full_length() {
    let mut h = Harness::new();
    h.open(video("v")).await;
    h.load(0, 600_000).await;

    h.surface.set_progress(599_100, 600_000);
    h.dispatch(PlaybackEvent::Pause);
    h.settle().await;

    let stored = h.stored("v").await.expect("saved");
    assert_eq!(stored.position_ms, 600_000);
    let current = h.session.state().current().expect("current");
    assert_eq!(current.percent_watched, 100.0);
}

#[tokio::test]
async fn finished_short_items_are_pruned() {
    let store =
        seeded(&[WatchState::new("s".into(), 50_000, 200_000, 1.0, EPOCH_MS)])
            .await;
    let mut h = Harness::with_store(PlaybackConfig::default(), store);

    h.open(video("s")).await;
    h.load(0, 200_000).await;
    assert!(positions(&h).is_empty(), "short items restart from zero");

    h.surface.set_progress(199_500, 200_000);
    h.dispatch(PlaybackEvent::Pause);
    h.settle().await;

    assert!(h.stored("s").await.is_none());
}

#[tokio::test]
async fn switching_items_saves_the_outgoing_position() {
    let mut h = Harness::new();
    h.open(video("a")).await;
    h.load(0, 600_000).await;
    h.surface.set_progress(120_000, 600_000);

    h.open(video("b")).await;

    assert_eq!(h.stored("a").await.expect("saved").position_ms, 120_000);
}

#[tokio::test]
async fn explicit_start_offset_wins() {
    let mut h = Harness::new();
    let mut linked = video("v");
    linked.pending_position_ms = Some(12_000);

    h.open(linked).await;
    h.load(0, 600_000).await;

    assert_eq!(positions(&h), vec![12_000]);
    let current = h.session.state().current().expect("current");
    assert_eq!(current.pending_position_ms, None);
}

#[tokio::test]
async fn failed_lookups_restore_to_zero() {
    let failing = Arc::new(FailingStore::new());
    let mut h =
        Harness::with_store(PlaybackConfig::default(), failing.clone());

    h.open(video("v")).await;
    h.load(0, 600_000).await;
    assert!(positions(&h).is_empty());

    h.surface.set_progress(30_000, 600_000);
    h.dispatch(PlaybackEvent::Pause);
    h.settle().await;

    assert_eq!(failing.attempts(), 2);
}

#[tokio::test]
async fn history_is_pushed_every_few_ticks() {
    let mut h = Harness::new();
    h.open(video("v")).await;
    h.load(0, 600_000).await;
    h.surface.set_progress(30_000, 600_000);

    for _ in 0..5 {
        h.dispatch(PlaybackEvent::Tickle);
    }
    h.settle().await;

    assert_eq!(
        h.catalog.history_pushes(),
        vec![(VideoId::from("v"), 30.0)]
    );
}

#[tokio::test]
async fn history_push_can_be_disabled() {
    let mut config = PlaybackConfig::default();
    config.state.history_enabled = false;
    let mut h = Harness::with_config(config);
    h.open(video("v")).await;
    h.load(0, 600_000).await;

    for _ in 0..10 {
        h.dispatch(PlaybackEvent::Tickle);
    }
    h.settle().await;

    assert!(h.catalog.history_pushes().is_empty());
}

#[tokio::test]
async fn ticks_only_write_when_the_position_moves() {
    let mut h = Harness::new();
    h.open(video("v")).await;
    h.load(0, 600_000).await;
    h.surface.set_progress(30_000, 600_000);
    let before = h.runtime.spawned_count("save_state");

    for _ in 0..10 {
        h.dispatch(PlaybackEvent::Tickle);
    }
    h.settle().await;
    assert_eq!(h.runtime.spawned_count("save_state"), before + 1);

    h.surface.set_progress(35_000, 600_000);
    for _ in 0..5 {
        h.dispatch(PlaybackEvent::Tickle);
    }
    h.settle().await;
    assert_eq!(h.runtime.spawned_count("save_state"), before + 2);
    assert_eq!(h.stored("v").await.expect("saved").position_ms, 35_000);
}

/// Holds the first `put` back so a later write can overtake it.
#[derive(Debug, Default)]
struct SlowFirstStore {
    inner: InMemoryStore,
    puts: AtomicUsize,
}

#[async_trait]
impl KeyValueStore for SlowFirstStore {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> StorageResult<()> {
        if self.puts.fetch_add(1, Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        self.inner.put(key, value).await
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        self.inner.remove(key).await
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn the_latest_save_for_an_item_wins() {
    let backing = Arc::new(SlowFirstStore::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut store = StateStore::new(
        backing.clone(),
        Arc::new(RecordingCatalog::new()),
        Arc::new(TokioTaskRuntime::new(tx)),
        Default::default(),
    );

    store.save(WatchState::new("v".into(), 42_000, 600_000, 1.0, EPOCH_MS));
    store.save(WatchState::new("v".into(), 90_000, 600_000, 1.0, EPOCH_MS));
    for _ in 0..2 {
        rx.recv().await.expect("completion");
    }

    let bytes = backing
        .get(&state_key(&"v".into()))
        .await
        .expect("read")
        .expect("stored");
    let stored = decode(&"v".into(), &bytes).expect("decode");
    assert_eq!(stored.position_ms, 90_000);
}
