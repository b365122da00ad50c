//! Background work and timers that rejoin the dispatch loop.
//!
//! Everything a handler starts in the background goes through a
//! [`TaskRuntime`] and comes back as a
//! [`PlaybackEvent`](crate::bridge::PlaybackEvent) tagged with the
//! [`TaskId`] it was issued under. The issuing component keeps the
//! [`TaskHandle`] (usually in a [`TaskSlot`]) and drops any completion whose
//! id no longer matches, so a cancelled operation can never write state.

mod tokio_runtime;

pub use tokio_runtime::TokioTaskRuntime;

use std::fmt;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::bridge::{Completion, TimerKind};

/// Identity of one spawned task or scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Owned handle to an outstanding task or timer.
///
/// Dropping the handle does not cancel the work; fire-and-forget writes rely
/// on that.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: TaskId,
    token: CancellationToken,
}

impl TaskHandle {
    pub fn new(id: TaskId) -> Self {
        Self {
            id,
            token: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Token the runtime watches while the work is pending.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// At most one outstanding operation of a given kind.
///
/// Replacing cancels the previous occupant, which is how "starting a new
/// resolution cancels the old one" is enforced.
#[derive(Debug, Default)]
pub struct TaskSlot(Option<TaskHandle>);

impl TaskSlot {
    pub fn new() -> Self {
        Self(None)
    }

    pub fn replace(&mut self, handle: TaskHandle) {
        if let Some(previous) = self.0.replace(handle) {
            previous.cancel();
        }
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.0.take() {
            handle.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.0.is_some()
    }

    pub fn id(&self) -> Option<TaskId> {
        self.0.as_ref().map(TaskHandle::id)
    }

    /// Clear the slot if `id` is its occupant. Returns `false` for stale
    /// completions, which callers must then ignore.
    pub fn complete(&mut self, id: TaskId) -> bool {
        if self.id() == Some(id) {
            self.0 = None;
            true
        } else {
            false
        }
    }
}

pub type TaskFuture = BoxFuture<'static, Completion>;

/// Spawns background work and timers on behalf of handlers.
///
/// Results are delivered back into the session as
/// `PlaybackEvent::Completed` and `PlaybackEvent::Timer`.
pub trait TaskRuntime: Send + Sync + fmt::Debug {
    /// Run `work` in the background; `label` is only used for logging.
    fn spawn(&self, label: &'static str, work: TaskFuture) -> TaskHandle;

    /// Fire `timer` once after `delay` unless cancelled first.
    fn schedule(&self, delay: Duration, timer: TimerKind) -> TaskHandle;

    /// Wall-clock unix millis; virtual in tests.
    fn now_ms(&self) -> i64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replacing_a_slot_cancels_the_previous_handle() {
        let first = TaskHandle::new(TaskId::new(1));
        let second = TaskHandle::new(TaskId::new(2));
        let mut slot = TaskSlot::new();

        slot.replace(first.clone());
        slot.replace(second.clone());

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert_eq!(slot.id(), Some(TaskId::new(2)));
    }

    #[test]
    fn stale_completion_leaves_slot_untouched() {
        let mut slot = TaskSlot::new();
        slot.replace(TaskHandle::new(TaskId::new(7)));

        assert!(!slot.complete(TaskId::new(6)));
        assert!(slot.is_pending());
        assert!(slot.complete(TaskId::new(7)));
        assert!(!slot.is_pending());
    }
}
