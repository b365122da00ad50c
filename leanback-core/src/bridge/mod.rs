//! Ordered dispatch of playback lifecycle events.
//!
//! The [`EventBridge`] owns a fixed list of [`PlaybackHandler`]s and the
//! currently attached surface. Broadcast events reach every handler in list
//! order; chain events stop at the first handler that claims them. Events a
//! handler emits while processing are queued and dispatched FIFO once the
//! current event has run to completion.

mod context;
mod event;
mod handler;

pub use context::DispatchContext;
pub use event::{ChainEvent, Completion, Handled, PlaybackEvent, TimerKind};
pub use handler::PlaybackHandler;

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use leanback_contracts::PlaybackSurface;
use tracing::{debug, trace, warn};

use crate::error::HandlerResult;
use crate::session::SessionState;

/// Upper bound on follow-up events drained for one external event; guards
/// against two handlers bouncing events off each other forever.
const MAX_FOLLOW_UPS: usize = 256;

pub struct EventBridge {
    handlers: Vec<Box<dyn PlaybackHandler>>,
    surface: Option<Arc<dyn PlaybackSurface>>,
}

impl EventBridge {
    pub fn new(handlers: Vec<Box<dyn PlaybackHandler>>) -> Self {
        Self {
            handlers,
            surface: None,
        }
    }

    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|handler| handler.name()).collect()
    }

    pub fn surface(&self) -> Option<&Arc<dyn PlaybackSurface>> {
        self.surface.as_ref()
    }

    /// Bind `surface`. Re-binding the surface that is already attached is a
    /// no-op; returns whether `ViewAttached` was broadcast.
    pub fn attach_surface(
        &mut self,
        surface: Arc<dyn PlaybackSurface>,
        session: &mut SessionState,
    ) -> bool {
        if let Some(current) = &self.surface
            && same_surface(current, &surface)
        {
            trace!(target: "playback::bridge", "surface already attached");
            return false;
        }

        debug!(target: "playback::bridge", "surface attached");
        self.surface = Some(surface);
        self.dispatch(PlaybackEvent::ViewAttached, session);
        true
    }

    pub fn detach_surface(&mut self, session: &mut SessionState) {
        if self.surface.take().is_none() {
            return;
        }
        debug!(target: "playback::bridge", "surface detached");
        self.dispatch(PlaybackEvent::ViewDetached, session);
    }

    /// Broadcast `event`, then every follow-up it produced.
    pub fn dispatch(
        &mut self,
        event: PlaybackEvent,
        session: &mut SessionState,
    ) {
        let mut outbox = VecDeque::new();
        self.broadcast(event, session, &mut outbox);
        self.drain(session, &mut outbox);
    }

    /// Offer `event` to each handler until one claims it.
    pub fn dispatch_chain(
        &mut self,
        event: ChainEvent,
        session: &mut SessionState,
    ) -> Handled {
        let mut outbox = VecDeque::new();
        let mut outcome = Handled::No;

        for handler in self.handlers.iter_mut() {
            let mut ctx = DispatchContext::new(
                self.surface.as_ref(),
                session,
                &mut outbox,
            );
            let result = match event {
                ChainEvent::KeyDown(key) => handler.on_key_down(key, &mut ctx),
                ChainEvent::PreviousClicked => {
                    handler.on_previous_clicked(&mut ctx)
                }
                ChainEvent::NextClicked => handler.on_next_clicked(&mut ctx),
            };

            match result {
                Ok(Handled::Yes) => {
                    debug!(
                        target: "playback::bridge",
                        event = event.name(),
                        handler = handler.name(),
                        "chain event handled"
                    );
                    outcome = Handled::Yes;
                    break;
                }
                Ok(Handled::No) => {}
                Err(err) => {
                    warn!(
                        target: "playback::bridge",
                        event = event.name(),
                        handler = handler.name(),
                        error = %err,
                        "handler failed; treating as unhandled"
                    );
                }
            }
        }

        self.drain(session, &mut outbox);
        outcome
    }

    fn drain(
        &mut self,
        session: &mut SessionState,
        outbox: &mut VecDeque<PlaybackEvent>,
    ) {
        let mut follow_ups = 0;
        while let Some(next) = outbox.pop_front() {
            follow_ups += 1;
            if follow_ups > MAX_FOLLOW_UPS {
                warn!(
                    target: "playback::bridge",
                    dropped = outbox.len() + 1,
                    "follow-up limit reached; dropping queued events"
                );
                outbox.clear();
                break;
            }
            self.broadcast(next, session, outbox);
        }
    }

    fn broadcast(
        &mut self,
        event: PlaybackEvent,
        session: &mut SessionState,
        outbox: &mut VecDeque<PlaybackEvent>,
    ) {
        if event.is_noisy() {
            trace!(
                target: "playback::bridge",
                event = event.name(),
                "broadcast"
            );
        } else {
            debug!(
                target: "playback::bridge",
                event = event.name(),
                "broadcast"
            );
        }

        for handler in self.handlers.iter_mut() {
            let mut ctx =
                DispatchContext::new(self.surface.as_ref(), session, outbox);
            if let Err(err) = deliver(handler.as_mut(), &event, &mut ctx) {
                warn!(
                    target: "playback::bridge",
                    event = event.name(),
                    handler = handler.name(),
                    error = %err,
                    "handler failed"
                );
            }
        }
    }
}

impl fmt::Debug for EventBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBridge")
            .field("handlers", &self.handler_names())
            .field("surface_attached", &self.surface.is_some())
            .finish()
    }
}

fn same_surface(
    a: &Arc<dyn PlaybackSurface>,
    b: &Arc<dyn PlaybackSurface>,
) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

fn deliver(
    handler: &mut dyn PlaybackHandler,
    event: &PlaybackEvent,
    ctx: &mut DispatchContext<'_>,
) -> HandlerResult {
    match event {
        PlaybackEvent::Init => handler.on_init(ctx),
        PlaybackEvent::NewVideo(video) => handler.on_new_video(video, ctx),
        PlaybackEvent::ViewAttached => handler.on_view_attached(ctx),
        PlaybackEvent::ViewDetached => handler.on_view_detached(ctx),
        PlaybackEvent::EngineInitialized => handler.on_engine_initialized(ctx),
        PlaybackEvent::EngineReleased => handler.on_engine_released(ctx),
        PlaybackEvent::EngineError(error) => {
            handler.on_engine_error(error, ctx)
        }
        PlaybackEvent::VideoLoaded => handler.on_video_loaded(ctx),
        PlaybackEvent::Play => handler.on_play(ctx),
        PlaybackEvent::Pause => handler.on_pause(ctx),
        PlaybackEvent::SeekEnd => handler.on_seek_end(ctx),
        PlaybackEvent::PlayEnd => handler.on_play_end(ctx),
        PlaybackEvent::Buffering => handler.on_buffering(ctx),
        PlaybackEvent::TracksChanged => handler.on_tracks_changed(ctx),
        PlaybackEvent::SpeedChanged(speed) => {
            handler.on_speed_changed(*speed, ctx)
        }
        PlaybackEvent::Tickle => handler.on_tickle(ctx),
        PlaybackEvent::MetadataLoaded(metadata) => {
            handler.on_metadata_loaded(metadata, ctx)
        }
        PlaybackEvent::SuggestionClicked(video) => {
            handler.on_suggestion_clicked(video, ctx)
        }
        PlaybackEvent::Enqueue(video) => handler.on_enqueue(video, ctx),
        PlaybackEvent::ContinueGroup(group_id) => {
            handler.on_continue_group(group_id, ctx)
        }
        PlaybackEvent::Timer { task, timer } => {
            handler.on_timer(*task, *timer, ctx)
        }
        PlaybackEvent::Completed { task, completion } => {
            handler.on_completed(*task, completion, ctx)
        }
    }
}
