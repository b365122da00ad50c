//! Resolving videos into playable streams and keeping them playing.
//!
//! [`VideoLoader`] owns the load pipeline for the current video: format
//! resolution, source selection, manifest decode, metadata, engine error
//! remediation, the buffering watchdog and what happens when a video ends.
//! Every asynchronous step is held in its own [`TaskSlot`], so opening a new
//! video (or retrying) cancels and supersedes the old step.

mod remediation;
mod repeat;
mod selection;

pub use remediation::{Remediation, classify};
pub use repeat::{EndAction, EndFacts, resolve_end};
pub use selection::{Selection, SourcePreferences, select_source};

use std::sync::Arc;

use futures::FutureExt;
use leanback_config::LoaderConfig;
use leanback_contracts::{
    CatalogClient, CatalogError, ErrorNotice, PlaybackSurface,
};
use leanback_model::{
    ErrorEvent, FormatInfo, KeyInput, Metadata, MetadataRequest,
    PlayableSource, StreamDescriptor, Video, VideoId,
};
use tracing::{debug, info, trace, warn};

use crate::bridge::{
    Completion, DispatchContext, Handled, PlaybackEvent, PlaybackHandler,
    TimerKind,
};
use crate::error::{HandlerResult, ResolutionFailure, UnplayableReason};
use crate::runtime::{TaskId, TaskRuntime, TaskSlot};

/// Where the current video is in its load/playback lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Idle,
    Resolving,
    DecodingManifest,
    /// A source was chosen and handed (or is about to be handed) to the
    /// engine.
    Playable,
    Unplayable,
    /// Scheduled stream with nothing to play yet; a reload is pending.
    EmptyFuture,
    Active,
    Buffering,
    /// The watchdog decided a stalled buffer was really the end.
    StreamEnded,
    Ended,
    NextPending,
    RetryScheduled,
}

impl LoaderState {
    /// States in which re-opening the current id starts a fresh pipeline.
    fn accepts_reopen(self) -> bool {
        matches!(
            self,
            LoaderState::Idle
                | LoaderState::Ended
                | LoaderState::Unplayable
                | LoaderState::NextPending
        )
    }

    /// A source has been opened on the engine for the current video.
    fn has_opened_source(self) -> bool {
        matches!(
            self,
            LoaderState::Playable
                | LoaderState::Active
                | LoaderState::Buffering
                | LoaderState::StreamEnded
                | LoaderState::RetryScheduled
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Successor {
    Unknown,
    Known,
    /// The catalog answered and there is nothing after this video.
    Exhausted,
}

#[derive(Debug)]
pub struct VideoLoader {
    catalog: Arc<dyn CatalogClient>,
    runtime: Arc<dyn TaskRuntime>,
    config: LoaderConfig,
    state: LoaderState,

    formats: TaskSlot,
    manifest: TaskSlot,
    metadata: TaskSlot,
    restart: TaskSlot,
    reload: TaskSlot,
    watchdog: TaskSlot,
    /// Next-item poll or unplayable skip; never both.
    next: TaskSlot,

    last_formats: Option<FormatInfo>,
    /// Chosen while no engine could take it.
    pending_source: Option<PlayableSource>,
    successor: Successor,
    error_reported: bool,
    engine_ready: bool,
    resume_on_attach: bool,
}

impl VideoLoader {
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        runtime: Arc<dyn TaskRuntime>,
        config: LoaderConfig,
    ) -> Self {
        Self {
            catalog,
            runtime,
            config,
            state: LoaderState::Idle,
            formats: TaskSlot::new(),
            manifest: TaskSlot::new(),
            metadata: TaskSlot::new(),
            restart: TaskSlot::new(),
            reload: TaskSlot::new(),
            watchdog: TaskSlot::new(),
            next: TaskSlot::new(),
            last_formats: None,
            pending_source: None,
            successor: Successor::Unknown,
            error_reported: false,
            engine_ready: true,
            resume_on_attach: false,
        }
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    fn cancel_all(&mut self) {
        self.formats.cancel();
        self.manifest.cancel();
        self.metadata.cancel();
        self.restart.cancel();
        self.reload.cancel();
        self.watchdog.cancel();
        self.next.cancel();
    }

    fn open(&mut self, video: Video, ctx: &mut DispatchContext<'_>) {
        self.cancel_all();
        self.last_formats = None;
        self.pending_source = None;
        self.successor = Successor::Unknown;
        self.error_reported = false;
        self.resume_on_attach = false;

        info!(
            target: "playback::loader",
            video_id = %video.id,
            title = %video.title,
            "opening video"
        );

        let request = MetadataRequest::from(&video);
        ctx.session_mut().begin_video(video);
        self.resolve(ctx);
        self.fetch_metadata(request);
    }

    /// (Re)start format resolution for the current video.
    fn resolve(&mut self, ctx: &mut DispatchContext<'_>) {
        let Some(video_id) = ctx.session().current_id().cloned() else {
            return;
        };
        self.manifest.cancel();
        self.reload.cancel();

        let catalog = Arc::clone(&self.catalog);
        let id = video_id.clone();
        let handle = self.runtime.spawn(
            "resolve_formats",
            async move {
                let result = catalog.resolve_formats(&id).await;
                Completion::Formats { video_id: id, result }
            }
            .boxed(),
        );
        debug!(
            target: "playback::loader",
            video_id = %video_id,
            task = %handle.id(),
            "resolving formats"
        );
        self.formats.replace(handle);
        self.state = LoaderState::Resolving;
    }

    fn fetch_metadata(&mut self, request: MetadataRequest) {
        let catalog = Arc::clone(&self.catalog);
        let handle = self.runtime.spawn(
            "fetch_metadata",
            async move {
                let result = catalog.fetch_metadata(&request).await;
                Completion::Metadata {
                    video_id: request.video_id,
                    result,
                }
            }
            .boxed(),
        );
        self.metadata.replace(handle);
    }

    fn decode_manifest(&mut self, info: FormatInfo) {
        let catalog = Arc::clone(&self.catalog);
        let handle = self.runtime.spawn(
            "resolve_manifest",
            async move {
                let result = catalog.resolve_manifest(&info).await;
                Completion::Manifest {
                    video_id: info.video_id,
                    result,
                }
            }
            .boxed(),
        );
        self.manifest.replace(handle);
        self.state = LoaderState::DecodingManifest;
    }

    fn on_formats(&mut self, info: &FormatInfo, ctx: &mut DispatchContext<'_>) {
        if let Some(video) = ctx.session_mut().current_mut() {
            video.is_live = info.is_live;
        }

        let prefs = SourcePreferences {
            hls_forced: self.config.hls_forced,
            dash_live_disabled: self.config.dash_live_disabled,
        };
        let selection = select_source(info, prefs, ctx.session().last_error);
        self.last_formats = Some(info.clone());

        match selection {
            Selection::DecodeManifest => self.decode_manifest(info.clone()),
            Selection::Open(stream) => {
                self.open_source(PlayableSource::from_format(info, stream), ctx)
            }
            Selection::Unplayable(reason) => {
                self.on_unplayable(reason, info, ctx)
            }
            Selection::Empty => {
                info!(
                    target: "playback::loader",
                    video_id = %info.video_id,
                    "no stream yet; scheduling reload"
                );
                self.state = LoaderState::EmptyFuture;
                if let (Some(surface), Some(video)) =
                    (ctx.surface(), ctx.session().current())
                {
                    surface.show_metadata(video);
                }
                self.reload.replace(self.runtime.schedule(
                    self.config.future_stream_reload(),
                    TimerKind::ReloadVideo,
                ));
            }
        }
    }

    fn open_source(
        &mut self,
        source: PlayableSource,
        ctx: &mut DispatchContext<'_>,
    ) {
        self.state = LoaderState::Playable;
        match ctx.surface() {
            Some(surface) if self.engine_ready => {
                info!(
                    target: "playback::loader",
                    video_id = ?ctx.session().current_id(),
                    stream = source.stream.label(),
                    live = source.is_live,
                    "opening stream"
                );
                play_stream(surface.as_ref(), &source.stream);
            }
            _ => {
                debug!(
                    target: "playback::loader",
                    stream = source.stream.label(),
                    "engine unavailable; deferring stream"
                );
                self.pending_source = Some(source);
            }
        }
    }

    fn flush_pending(&mut self, ctx: &mut DispatchContext<'_>) -> bool {
        match self.pending_source.take() {
            Some(source) => {
                self.open_source(source, ctx);
                true
            }
            None => false,
        }
    }

    fn on_unplayable(
        &mut self,
        reason: UnplayableReason,
        info: &FormatInfo,
        ctx: &mut DispatchContext<'_>,
    ) {
        warn!(
            target: "playback::loader",
            video_id = %info.video_id,
            %reason,
            status = info.status_message.as_deref().unwrap_or_default(),
            "video is unplayable"
        );
        self.state = LoaderState::Unplayable;

        if reason == UnplayableReason::AgeRestricted {
            if let Some(surface) = ctx.surface() {
                surface.show_sign_in();
            }
            return;
        }

        self.report_error(ctx, info.status_message.clone());
        if self.has_successor(ctx) {
            self.schedule_skip();
        }
    }

    fn on_resolution_failed(
        &mut self,
        err: CatalogError,
        ctx: &mut DispatchContext<'_>,
    ) {
        if err == CatalogError::Cancelled {
            return;
        }
        let failure = ResolutionFailure::from(err);
        warn!(
            target: "playback::loader",
            video_id = ?ctx.session().current_id(),
            error = %failure,
            "format resolution failed"
        );
        self.report_error(ctx, Some(failure.to_string()));
        self.state = LoaderState::RetryScheduled;

        if let ResolutionFailure::Signing(_) = failure {
            self.catalog.invalidate_signing_cache();
            self.schedule_restart();
        } else {
            self.reload.replace(self.runtime.schedule(
                self.config.resolve_retry(),
                TimerKind::ReloadVideo,
            ));
        }
    }

    fn on_metadata(
        &mut self,
        metadata: &Metadata,
        ctx: &mut DispatchContext<'_>,
    ) {
        let Some(current) = ctx.session_mut().current_mut() else {
            return;
        };
        current.sync_from(&metadata.video);
        match &metadata.next_video {
            Some(next) => {
                current.next_item = Some(Box::new(next.clone()));
                self.successor = Successor::Known;
            }
            None => self.successor = Successor::Exhausted,
        }
        let snapshot = current.clone();

        debug!(
            target: "playback::loader",
            video_id = %snapshot.id,
            suggestions = metadata.suggestions.len(),
            has_next = metadata.next_video.is_some(),
            "metadata loaded"
        );
        if let Some(surface) = ctx.surface() {
            surface.show_metadata(&snapshot);
        }
        ctx.emit(PlaybackEvent::MetadataLoaded(metadata.clone()));

        if self.state == LoaderState::NextPending && self.next.is_pending() {
            self.next.cancel();
            self.advance(ctx);
        }
        // Age-restricted items report nothing and wait for sign-in instead.
        if self.state == LoaderState::Unplayable
            && self.error_reported
            && !self.next.is_pending()
            && self.has_successor(ctx)
        {
            self.schedule_skip();
        }
    }

    fn schedule_skip(&mut self) {
        self.next.replace(self.runtime.schedule(
            self.config.unplayable_skip(),
            TimerKind::SkipUnplayable,
        ));
    }

    /// Show at most one failure notice per video.
    fn report_error(
        &mut self,
        ctx: &mut DispatchContext<'_>,
        detail: Option<String>,
    ) {
        if self.error_reported {
            return;
        }
        let (Some(surface), Some(video)) =
            (ctx.surface(), ctx.session().current())
        else {
            return;
        };
        surface.show_error(&ErrorNotice {
            video_id: video.id.clone(),
            title: video.title.clone(),
            detail,
        });
        self.error_reported = true;
    }

    fn schedule_restart(&mut self) {
        self.restart.replace(self.runtime.schedule(
            self.config.restart_cooldown(),
            TimerKind::RestartEngine,
        ));
    }

    fn restart_engine(&mut self, ctx: &mut DispatchContext<'_>) {
        match ctx.surface() {
            Some(surface) => {
                info!(
                    target: "playback::loader",
                    video_id = ?ctx.session().current_id(),
                    "restarting engine"
                );
                surface.apply_tweaks(&ctx.session().tweaks);
                surface.restart();
            }
            None => self.resolve(ctx),
        }
    }

    fn check_watchdog(&mut self, ctx: &mut DispatchContext<'_>) {
        if self.state != LoaderState::Buffering {
            return;
        }
        let Some(video) = ctx.session().current() else {
            return;
        };
        if video.is_live {
            return;
        }
        let Some(surface) = ctx.surface() else {
            return;
        };

        let duration = surface.duration_ms();
        let position = surface.position_ms();
        let window = i64::try_from(self.config.buffering_end_window_ms)
            .unwrap_or(i64::MAX);
        if duration > 0 && duration - position < window {
            info!(
                target: "playback::loader",
                video_id = %video.id,
                position_ms = position,
                duration_ms = duration,
                "buffering stalled near the end; treating as ended"
            );
            self.state = LoaderState::StreamEnded;
            ctx.emit(PlaybackEvent::PlayEnd);
        }
    }

    fn has_successor(&self, ctx: &DispatchContext<'_>) -> bool {
        ctx.session().queue.has_next()
            || ctx
                .session()
                .current()
                .is_some_and(|video| video.next_item.is_some())
    }

    fn end_facts(&self, video: &Video, ctx: &DispatchContext<'_>) -> EndFacts {
        let surface = ctx.surface();
        let groups = &ctx.session().groups;
        EndFacts {
            policy: self.config.repeat_policy,
            finish_on_ended: video.finish_on_ended,
            loop_short: self.config.loop_shorts && video.is_shorts,
            has_queued: ctx.session().queue.has_queued(),
            suggestions_shown: surface
                .as_ref()
                .is_some_and(|surface| surface.is_suggestions_shown()),
            dialog_open: surface
                .as_ref()
                .is_some_and(|surface| surface.is_dialog_open()),
            can_step_back: video.in_bounded_group()
                && groups.previous_of(video).is_some(),
            has_group: video
                .group
                .as_ref()
                .and_then(|group| groups.resolve(group))
                .is_some_and(|group| group.len() > 1),
        }
    }

    /// Next-item resolution: user queue, then the successor link, then
    /// wait for the catalog to say whether anything follows.
    fn advance(&mut self, ctx: &mut DispatchContext<'_>) {
        if let Some(next) = ctx.session().queue.next().cloned() {
            self.open_next(next, ctx);
            return;
        }
        if let Some(next) =
            ctx.session_mut().current_mut().and_then(Video::take_next)
        {
            self.open_next(next, ctx);
            return;
        }

        if self.successor == Successor::Exhausted {
            debug!(target: "playback::loader", "nothing left to play");
            self.stop_with_suggestions(ctx);
            return;
        }

        if !self.metadata.is_pending()
            && let Some(video) = ctx.session().current()
        {
            self.fetch_metadata(MetadataRequest::from(video));
        }
        trace!(target: "playback::loader", "successor unknown; polling");
        self.state = LoaderState::NextPending;
        self.next.replace(self.runtime.schedule(
            self.config.next_poll_interval(),
            TimerKind::NextPoll,
        ));
    }

    fn open_next(&mut self, video: Video, ctx: &mut DispatchContext<'_>) {
        debug!(
            target: "playback::loader",
            video_id = %video.id,
            "advancing"
        );
        self.state = LoaderState::NextPending;
        ctx.emit(PlaybackEvent::NewVideo(video));
    }

    fn stop_with_suggestions(&mut self, ctx: &mut DispatchContext<'_>) {
        self.state = LoaderState::Ended;
        if let Some(surface) = ctx.surface() {
            surface.set_play_when_ready(false);
            surface.show_suggestions(true);
        }
    }

    fn restart_item(&mut self, surface: &dyn PlaybackSurface) {
        surface.set_position_ms(0);
        surface.set_play_when_ready(true);
        self.state = LoaderState::Active;
    }

    fn owns(&self, id: &VideoId, ctx: &DispatchContext<'_>) -> bool {
        ctx.session().is_current(id)
    }
}

fn play_stream(surface: &dyn PlaybackSurface, stream: &StreamDescriptor) {
    match stream {
        StreamDescriptor::DashManifest { manifest } => {
            surface.open_dash(manifest)
        }
        StreamDescriptor::DashUrl { url } => surface.open_dash_url(url),
        StreamDescriptor::HlsUrl { url } => surface.open_hls(url),
        StreamDescriptor::UrlList { urls } => surface.open_url_list(urls),
    }
}

impl PlaybackHandler for VideoLoader {
    fn name(&self) -> &'static str {
        "video_loader"
    }

    fn on_new_video(
        &mut self,
        video: &Video,
        ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        if ctx.session().is_current(&video.id) && !self.state.accepts_reopen() {
            debug!(
                target: "playback::loader",
                video_id = %video.id,
                state = ?self.state,
                "video already open"
            );
            return Ok(());
        }
        self.open(video.clone(), ctx);
        Ok(())
    }

    fn on_view_attached(
        &mut self,
        ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        if self.engine_ready && self.flush_pending(ctx) {
            return Ok(());
        }
        if std::mem::take(&mut self.resume_on_attach) {
            self.resolve(ctx);
        }
        Ok(())
    }

    fn on_view_detached(
        &mut self,
        _ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        self.watchdog.cancel();
        self.resume_on_attach = self.state.has_opened_source();
        Ok(())
    }

    fn on_engine_initialized(
        &mut self,
        ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        self.engine_ready = true;
        if ctx.session().current().is_none() || self.flush_pending(ctx) {
            return Ok(());
        }
        if self.state.has_opened_source() {
            debug!(
                target: "playback::loader",
                video_id = ?ctx.session().current_id(),
                "engine initialized; reloading current video"
            );
            self.resolve(ctx);
        }
        Ok(())
    }

    fn on_engine_released(
        &mut self,
        _ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        self.engine_ready = false;
        self.watchdog.cancel();
        Ok(())
    }

    fn on_engine_error(
        &mut self,
        error: &ErrorEvent,
        ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        ctx.session_mut().last_error = Some(error.kind);
        self.watchdog.cancel();

        let remediation = classify(error);
        warn!(
            target: "playback::loader",
            video_id = ?ctx.session().current_id(),
            %error,
            remediation = remediation.name(),
            "engine error"
        );

        if remediation == Remediation::RequestPlaybackFix {
            self.catalog.request_playback_fix();
        }
        if remediation.apply(&mut ctx.session_mut().tweaks)
            && let Some(surface) = ctx.surface()
        {
            surface.apply_tweaks(&ctx.session().tweaks);
        }

        self.report_error(ctx, Some(error.to_string()));
        self.state = LoaderState::RetryScheduled;
        self.schedule_restart();
        Ok(())
    }

    fn on_video_loaded(
        &mut self,
        ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        self.state = LoaderState::Active;
        ctx.session_mut().last_error = None;
        Ok(())
    }

    fn on_play(&mut self, _ctx: &mut DispatchContext<'_>) -> HandlerResult {
        self.watchdog.cancel();
        if matches!(
            self.state,
            LoaderState::Buffering | LoaderState::Playable
        ) {
            self.state = LoaderState::Active;
        }
        Ok(())
    }

    fn on_buffering(
        &mut self,
        _ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        self.state = LoaderState::Buffering;
        self.watchdog.replace(self.runtime.schedule(
            self.config.buffering_watchdog(),
            TimerKind::BufferingWatchdog,
        ));
        Ok(())
    }

    fn on_play_end(&mut self, ctx: &mut DispatchContext<'_>) -> HandlerResult {
        self.watchdog.cancel();
        self.state = LoaderState::Ended;
        let Some(video) = ctx.session().current().cloned() else {
            return Ok(());
        };

        let facts = self.end_facts(&video, ctx);
        let action = resolve_end(&facts);
        debug!(
            target: "playback::loader",
            video_id = %video.id,
            policy = ?facts.policy,
            ?action,
            "video ended"
        );

        match action {
            EndAction::Close => {
                if let Some(surface) = ctx.surface() {
                    surface.close();
                }
            }
            EndAction::Restart => {
                if let Some(surface) = ctx.surface() {
                    self.restart_item(surface.as_ref());
                }
            }
            EndAction::Advance => self.advance(ctx),
            EndAction::Shuffle => {
                match ctx.session().groups.random_member(&video).cloned() {
                    Some(pick) => self.open_next(pick, ctx),
                    None => self.advance(ctx),
                }
            }
            EndAction::StepBack => {
                match ctx.session().groups.previous_of(&video).cloned() {
                    Some(previous) => self.open_next(previous, ctx),
                    None => self.advance(ctx),
                }
            }
            EndAction::StopAndSuggest => self.stop_with_suggestions(ctx),
            EndAction::Stop => {
                if let Some(surface) = ctx.surface() {
                    surface.set_play_when_ready(false);
                }
            }
        }
        Ok(())
    }

    fn on_suggestion_clicked(
        &mut self,
        video: &Video,
        ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        if let Some(surface) = ctx.surface() {
            surface.show_suggestions(false);
        }
        ctx.emit(PlaybackEvent::NewVideo(video.clone()));
        Ok(())
    }

    fn on_enqueue(
        &mut self,
        video: &Video,
        ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        debug!(target: "playback::loader", video_id = %video.id, "queued");
        ctx.session_mut().queue.enqueue(video.clone());
        Ok(())
    }

    fn on_timer(
        &mut self,
        task: TaskId,
        timer: TimerKind,
        ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        let slot = match timer {
            TimerKind::RestartEngine => &mut self.restart,
            TimerKind::ReloadVideo => &mut self.reload,
            TimerKind::BufferingWatchdog => &mut self.watchdog,
            TimerKind::NextPoll | TimerKind::SkipUnplayable => &mut self.next,
        };
        if !slot.complete(task) {
            trace!(
                target: "playback::loader",
                %task,
                timer = timer.name(),
                "stale timer"
            );
            return Ok(());
        }

        match timer {
            TimerKind::RestartEngine => self.restart_engine(ctx),
            TimerKind::ReloadVideo => self.resolve(ctx),
            TimerKind::BufferingWatchdog => self.check_watchdog(ctx),
            TimerKind::NextPoll => {
                if self.state == LoaderState::NextPending {
                    self.advance(ctx);
                }
            }
            TimerKind::SkipUnplayable => self.advance(ctx),
        }
        Ok(())
    }

    fn on_completed(
        &mut self,
        task: TaskId,
        completion: &Completion,
        ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        match completion {
            Completion::Formats { video_id, result } => {
                if !self.formats.complete(task) || !self.owns(video_id, ctx) {
                    trace!(
                        target: "playback::loader",
                        %task,
                        "stale format resolution"
                    );
                    return Ok(());
                }
                match result {
                    Ok(info) => self.on_formats(info, ctx),
                    Err(err) => self.on_resolution_failed(err.clone(), ctx),
                }
            }
            Completion::Manifest { video_id, result } => {
                if !self.manifest.complete(task) || !self.owns(video_id, ctx) {
                    trace!(target: "playback::loader", %task, "stale manifest");
                    return Ok(());
                }
                match (result, self.last_formats.clone()) {
                    (Ok(manifest), Some(info)) => {
                        let source = PlayableSource::from_format(
                            &info,
                            StreamDescriptor::DashManifest {
                                manifest: manifest.clone(),
                            },
                        );
                        self.open_source(source, ctx);
                    }
                    (Ok(_), None) => {
                        warn!(
                            target: "playback::loader",
                            "manifest without formats; resolving again"
                        );
                        self.resolve(ctx);
                    }
                    (Err(err), _) => {
                        self.on_resolution_failed(err.clone(), ctx)
                    }
                }
            }
            Completion::Metadata { video_id, result } => {
                if !self.metadata.complete(task) || !self.owns(video_id, ctx) {
                    trace!(target: "playback::loader", %task, "stale metadata");
                    return Ok(());
                }
                match result {
                    Ok(metadata) => self.on_metadata(metadata, ctx),
                    Err(err) => warn!(
                        target: "playback::loader",
                        video_id = %video_id,
                        error = %err,
                        "metadata fetch failed"
                    ),
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn on_key_down(
        &mut self,
        key: KeyInput,
        _ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult<Handled> {
        if self.restart.is_pending() {
            info!(
                target: "playback::loader",
                ?key,
                "key press cancelled pending engine restart"
            );
            self.restart.cancel();
        }
        Ok(Handled::No)
    }

    fn on_previous_clicked(
        &mut self,
        ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult<Handled> {
        let Some(current) = ctx.session().current().cloned() else {
            return Ok(Handled::No);
        };
        let surface = ctx.surface();
        let threshold = i64::try_from(self.config.previous_restart_threshold_ms)
            .unwrap_or(i64::MAX);

        if let Some(surface) = &surface
            && surface.position_ms() > threshold
        {
            surface.set_position_ms(0);
            return Ok(Handled::Yes);
        }

        let target = ctx
            .session()
            .queue
            .previous()
            .cloned()
            .or_else(|| ctx.session().groups.previous_of(&current).cloned());
        match (target, surface) {
            (Some(previous), _) => {
                self.open_next(previous, ctx);
                Ok(Handled::Yes)
            }
            (None, Some(surface)) => {
                surface.set_position_ms(0);
                Ok(Handled::Yes)
            }
            (None, None) => Ok(Handled::No),
        }
    }

    fn on_next_clicked(
        &mut self,
        ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult<Handled> {
        if ctx.session().current().is_none() {
            return Ok(Handled::No);
        }
        self.next.cancel();
        self.advance(ctx);
        Ok(Handled::Yes)
    }
}
