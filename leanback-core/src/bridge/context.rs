use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use leanback_contracts::PlaybackSurface;

use super::PlaybackEvent;
use crate::session::SessionState;

/// What a handler sees while it processes one event.
///
/// The surface handle is `None` between detach and the next attach;
/// handlers null-check it instead of holding their own reference. Events
/// passed to [`emit`](Self::emit) are dispatched after the current event
/// has reached every handler.
pub struct DispatchContext<'a> {
    surface: Option<&'a Arc<dyn PlaybackSurface>>,
    session: &'a mut SessionState,
    outbox: &'a mut VecDeque<PlaybackEvent>,
}

impl<'a> DispatchContext<'a> {
    pub fn new(
        surface: Option<&'a Arc<dyn PlaybackSurface>>,
        session: &'a mut SessionState,
        outbox: &'a mut VecDeque<PlaybackEvent>,
    ) -> Self {
        Self {
            surface,
            session,
            outbox,
        }
    }

    pub fn surface(&self) -> Option<Arc<dyn PlaybackSurface>> {
        self.surface.cloned()
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    pub fn session(&self) -> &SessionState {
        self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionState {
        self.session
    }

    pub fn emit(&mut self, event: PlaybackEvent) {
        self.outbox.push_back(event);
    }
}

impl fmt::Debug for DispatchContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchContext")
            .field("surface_attached", &self.surface.is_some())
            .field("pending_events", &self.outbox.len())
            .finish()
    }
}
