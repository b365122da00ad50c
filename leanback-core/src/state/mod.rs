//! Per-video watch state: where to resume, at which speed, and what the
//! server should hear about.
//!
//! [`StateStore`] keeps an in-memory cache of [`WatchState`] entries backed
//! by a [`KeyValueStore`]. Lookups and writes run as background tasks; a
//! failed lookup restores nothing and a failed write is logged and dropped.

mod policy;
mod record;

pub use policy::{
    Settled, is_short, open_state, restore_position, restore_speed,
    settle_position,
};
pub use record::{KEY_PREFIX, decode, encode, state_key};

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use leanback_config::StateConfig;
use leanback_contracts::{CatalogClient, KeyValueStore};
use leanback_model::{Metadata, Video, VideoId, WatchState};
use tracing::{debug, trace, warn};

use crate::bridge::{Completion, DispatchContext, PlaybackHandler};
use crate::error::HandlerResult;
use crate::runtime::{TaskId, TaskRuntime, TaskSlot};

/// Orders the writes for one key. Writes queue on `lock`; one that finds a
/// newer ticket issued after it is skipped, so the last save wins on disk.
#[derive(Debug, Default)]
struct WriteGate {
    latest: AtomicU64,
    lock: tokio::sync::Mutex<()>,
}

#[derive(Debug)]
pub struct StateStore {
    store: Arc<dyn KeyValueStore>,
    catalog: Arc<dyn CatalogClient>,
    runtime: Arc<dyn TaskRuntime>,
    config: StateConfig,
    cache: HashMap<VideoId, WatchState>,
    gates: HashMap<VideoId, Arc<WriteGate>>,

    /// The item positions are currently recorded against. Lags the session
    /// during a switch so the outgoing item can still be saved.
    tracked: Option<Video>,
    /// Session serial `tracked` was opened under.
    serial: Option<u64>,
    lookup: TaskSlot,
    history: TaskSlot,
    /// The engine has reported the tracked item as loaded.
    loaded: bool,
    restored: bool,
    global_speed: f32,
    ticks: u32,
}

impl StateStore {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        catalog: Arc<dyn CatalogClient>,
        runtime: Arc<dyn TaskRuntime>,
        config: StateConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            runtime,
            config,
            cache: HashMap::new(),
            gates: HashMap::new(),
            tracked: None,
            serial: None,
            lookup: TaskSlot::new(),
            history: TaskSlot::new(),
            loaded: false,
            restored: false,
            global_speed: 1.0,
            ticks: 0,
        }
    }

    pub fn config(&self) -> &StateConfig {
        &self.config
    }

    /// Cached state for a video, if any has been loaded or saved.
    pub fn restore(&self, video_id: &VideoId) -> Option<&WatchState> {
        self.cache.get(video_id)
    }

    /// Speed applied to items without their own remembered speed.
    pub fn global_speed(&self) -> f32 {
        self.global_speed
    }

    /// Cache `state` and write it through to the backing store.
    pub fn save(&mut self, state: WatchState) {
        let bytes = match encode(&state) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(
                    target: "playback::state",
                    video_id = %state.video_id,
                    error = %err,
                    "failed to encode watch state"
                );
                return;
            }
        };
        let video_id = state.video_id.clone();
        self.cache.insert(video_id.clone(), state);
        self.write(video_id, Some(bytes));
    }

    fn prune(&mut self, video_id: &VideoId) {
        debug!(
            target: "playback::state",
            video_id = %video_id,
            "pruning finished short item"
        );
        self.cache.remove(video_id);
        self.write(video_id.clone(), None);
    }

    /// Put `bytes` (or remove the entry, for `None`) behind any earlier
    /// write to the same key.
    fn write(&mut self, video_id: VideoId, bytes: Option<Vec<u8>>) {
        let gate = Arc::clone(self.gates.entry(video_id.clone()).or_default());
        let ticket = gate.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let label = if bytes.is_some() {
            "save_state"
        } else {
            "prune_state"
        };

        let store = Arc::clone(&self.store);
        let key = state_key(&video_id);
        self.runtime.spawn(
            label,
            async move {
                let _turn = gate.lock.lock().await;
                if gate.latest.load(Ordering::SeqCst) != ticket {
                    trace!(
                        target: "playback::state",
                        video_id = %video_id,
                        ticket,
                        "write superseded"
                    );
                    return Completion::StateSaved {
                        video_id,
                        result: Ok(()),
                    };
                }
                let result = match bytes {
                    Some(bytes) => store.put(&key, bytes).await,
                    None => store.remove(&key).await,
                };
                Completion::StateSaved { video_id, result }
            }
            .boxed(),
        );
    }

    fn track(&mut self, video: &Video, ctx: &DispatchContext<'_>) {
        self.serial = Some(ctx.session().serial());
        self.tracked = Some(video.clone());
        self.lookup.cancel();
        self.history.cancel();
        self.loaded = false;
        self.restored = false;
        self.ticks = 0;

        if let Some(stored) = self.cache.remove(&video.id) {
            if let Some(state) = open_state(video, stored, &self.config) {
                self.cache.insert(video.id.clone(), state);
            }
            return;
        }

        let store = Arc::clone(&self.store);
        let video_id = video.id.clone();
        let key = state_key(&video_id);
        let handle = self.runtime.spawn(
            "lookup_state",
            async move {
                let result = store.get(&key).await;
                Completion::StateLookup { video_id, result }
            }
            .boxed(),
        );
        self.lookup.replace(handle);
    }

    /// The session's copy of the tracked item when it is still current;
    /// it carries metadata synced since the open.
    fn tracked_video(&self, ctx: &DispatchContext<'_>) -> Option<Video> {
        let tracked = self.tracked.as_ref()?;
        Some(
            ctx.session()
                .current()
                .filter(|video| video.id == tracked.id)
                .unwrap_or(tracked)
                .clone(),
        )
    }

    /// Record the engine's current position for the tracked item.
    fn save_position(&mut self, ctx: &mut DispatchContext<'_>) {
        if !self.loaded {
            return;
        }
        let (Some(video), Some(surface)) =
            (self.tracked_video(ctx), ctx.surface())
        else {
            return;
        };
        let length = surface.duration_ms();
        if length <= 0 {
            return;
        }
        let (position, speed) = (surface.position_ms(), surface.speed());
        self.record(&video, position, length, speed, ctx);
    }

    fn record(
        &mut self,
        video: &Video,
        position_ms: i64,
        length_ms: i64,
        speed: f32,
        ctx: &mut DispatchContext<'_>,
    ) {
        let settled = settle_position(
            video.is_live,
            position_ms,
            length_ms,
            &self.config,
        );

        if settled.fully_watched {
            if let Some(tracked) = self.tracked.as_mut() {
                tracked.percent_watched = 100.0;
            }
            if let Some(current) = ctx.session_mut().current_mut()
                && current.id == video.id
            {
                current.percent_watched = 100.0;
            }
            if is_short(length_ms, &self.config)
                && !self.config.remember_short_items
            {
                self.prune(&video.id);
                return;
            }
        }

        let unchanged = self.cache.get(&video.id).is_some_and(|cached| {
            cached.position_ms == settled.position_ms
                && cached.length_ms == length_ms
                && cached.speed == speed
        });
        if unchanged {
            return;
        }

        trace!(
            target: "playback::state",
            video_id = %video.id,
            position_ms = settled.position_ms,
            length_ms,
            speed,
            "saving watch state"
        );
        self.save(WatchState::new(
            video.id.clone(),
            settled.position_ms,
            length_ms,
            speed,
            self.runtime.now_ms(),
        ));
    }

    fn apply_restore(&mut self, ctx: &mut DispatchContext<'_>) {
        let (Some(video), Some(surface)) =
            (self.tracked_video(ctx), ctx.surface())
        else {
            return;
        };
        let local = self.cache.get(&video.id);

        let duration = surface.duration_ms();
        let position = video.pending_position_ms.unwrap_or_else(|| {
            restore_position(&video, local, duration, &self.config)
        });
        // Live items are not seeked, so the engine's own position counts.
        let playing_from = if position > 0 {
            position
        } else {
            surface.position_ms()
        };
        let speed = restore_speed(
            &video,
            local,
            self.global_speed,
            playing_from,
            duration,
            &self.config,
        );

        debug!(
            target: "playback::state",
            video_id = %video.id,
            position_ms = position,
            speed,
            "restoring watch state"
        );
        if position > 0 {
            surface.set_position_ms(position);
        }
        surface.set_speed(speed);
        self.restored = true;

        if let Some(current) = ctx.session_mut().current_mut()
            && current.id == video.id
        {
            current.pending_position_ms = None;
        }
    }

    fn on_lookup(
        &mut self,
        video_id: &VideoId,
        bytes: Option<&[u8]>,
        ctx: &mut DispatchContext<'_>,
    ) {
        let Some(video) = self.tracked_video(ctx).filter(|v| &v.id == video_id)
        else {
            return;
        };

        if let Some(bytes) = bytes {
            match decode(video_id, bytes) {
                Ok(stored) => {
                    if let Some(state) =
                        open_state(&video, stored, &self.config)
                    {
                        self.cache.entry(video_id.clone()).or_insert(state);
                    }
                }
                Err(err) => warn!(
                    target: "playback::state",
                    video_id = %video_id,
                    error = %err,
                    "discarding unreadable watch state"
                ),
            }
        }

        if self.loaded && !self.restored {
            self.apply_restore(ctx);
        }
    }

    fn push_history(&mut self, ctx: &DispatchContext<'_>) {
        if !self.config.history_enabled || !self.loaded {
            return;
        }
        let (Some(video), Some(surface)) =
            (self.tracked.as_ref(), ctx.surface())
        else {
            return;
        };
        let position_secs = surface.position_ms().max(0) as f64 / 1_000.0;

        let catalog = Arc::clone(&self.catalog);
        let video_id = video.id.clone();
        let handle = self.runtime.spawn(
            "push_history",
            async move {
                let result = catalog
                    .push_history_position(&video_id, position_secs)
                    .await;
                Completion::HistoryPushed { video_id, result }
            }
            .boxed(),
        );
        self.history.replace(handle);
    }
}

impl PlaybackHandler for StateStore {
    fn name(&self) -> &'static str {
        "state_store"
    }

    fn on_new_video(
        &mut self,
        video: &Video,
        ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        // The loader bumps the serial for every real open; an unchanged
        // serial means the request was a duplicate it ignored.
        if self.serial == Some(ctx.session().serial()) {
            return Ok(());
        }
        self.save_position(ctx);
        self.track(video, ctx);
        Ok(())
    }

    fn on_view_detached(
        &mut self,
        ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        self.save_position(ctx);
        Ok(())
    }

    fn on_engine_released(
        &mut self,
        ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        self.save_position(ctx);
        self.loaded = false;
        self.restored = false;
        Ok(())
    }

    fn on_video_loaded(
        &mut self,
        ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        if self.tracked.is_none() {
            return Ok(());
        }
        self.loaded = true;
        if self.lookup.is_pending() {
            trace!(target: "playback::state", "waiting for stored state");
            return Ok(());
        }
        self.apply_restore(ctx);
        Ok(())
    }

    fn on_pause(&mut self, ctx: &mut DispatchContext<'_>) -> HandlerResult {
        self.save_position(ctx);
        Ok(())
    }

    fn on_seek_end(&mut self, ctx: &mut DispatchContext<'_>) -> HandlerResult {
        self.save_position(ctx);
        Ok(())
    }

    fn on_play_end(&mut self, ctx: &mut DispatchContext<'_>) -> HandlerResult {
        if !self.loaded {
            return Ok(());
        }
        let Some(video) = self.tracked_video(ctx) else {
            return Ok(());
        };
        let surface = ctx.surface();
        let length = surface
            .as_ref()
            .map(|surface| surface.duration_ms())
            .filter(|length| *length > 0)
            .or_else(|| self.cache.get(&video.id).map(|state| state.length_ms))
            .unwrap_or(0);
        if length <= 0 {
            return Ok(());
        }
        let speed =
            surface.map_or(self.global_speed, |surface| surface.speed());
        self.record(&video, length, length, speed, ctx);
        Ok(())
    }

    fn on_speed_changed(
        &mut self,
        speed: f32,
        _ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        self.global_speed = speed;
        Ok(())
    }

    fn on_tickle(&mut self, ctx: &mut DispatchContext<'_>) -> HandlerResult {
        self.ticks = self.ticks.wrapping_add(1);
        let interval = self.config.history_tick_interval.max(1);
        if self.ticks % interval == 0 {
            self.save_position(ctx);
            self.push_history(ctx);
        }
        Ok(())
    }

    fn on_metadata_loaded(
        &mut self,
        metadata: &Metadata,
        ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        let Some(tracked) = self.tracked.as_mut() else {
            return Ok(());
        };
        if tracked.id != metadata.video.id {
            return Ok(());
        }
        tracked.sync_from(&metadata.video);
        self.push_history(ctx);
        Ok(())
    }

    fn on_completed(
        &mut self,
        task: TaskId,
        completion: &Completion,
        ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        match completion {
            Completion::StateLookup { video_id, result } => {
                if !self.lookup.complete(task) {
                    trace!(
                        target: "playback::state",
                        %task,
                        "stale state lookup"
                    );
                    return Ok(());
                }
                match result {
                    Ok(bytes) => {
                        self.on_lookup(video_id, bytes.as_deref(), ctx)
                    }
                    Err(err) => {
                        warn!(
                            target: "playback::state",
                            video_id = %video_id,
                            error = %err,
                            "state lookup failed; starting from zero"
                        );
                        self.on_lookup(video_id, None, ctx);
                    }
                }
            }
            Completion::StateSaved { video_id, result } => {
                if let Err(err) = result {
                    warn!(
                        target: "playback::state",
                        video_id = %video_id,
                        error = %err,
                        "watch state write dropped"
                    );
                }
            }
            Completion::HistoryPushed { video_id, result } => {
                if !self.history.complete(task) {
                    return Ok(());
                }
                if let Err(err) = result {
                    debug!(
                        target: "playback::state",
                        video_id = %video_id,
                        error = %err,
                        "history push failed"
                    );
                }
            }
            _ => {}
        }
        Ok(())
    }
}
