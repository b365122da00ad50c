use std::fmt;
use std::time::Duration;

use parking_lot::Mutex;

use crate::bridge::{PlaybackEvent, TimerKind};
use crate::runtime::{TaskFuture, TaskHandle, TaskId, TaskRuntime};

/// Unix millis the virtual clock starts at.
pub const EPOCH_MS: i64 = 1_700_000_000_000;

struct QueuedTask {
    handle: TaskHandle,
    label: &'static str,
    work: TaskFuture,
}

#[derive(Debug, Clone)]
struct QueuedTimer {
    handle: TaskHandle,
    due_ms: i64,
    timer: TimerKind,
}

struct Inner {
    next_id: u64,
    now_ms: i64,
    tasks: Vec<QueuedTask>,
    timers: Vec<QueuedTimer>,
    labels: Vec<&'static str>,
}

/// Deterministic [`TaskRuntime`]: nothing runs until the test asks.
///
/// Spawned work is held until [`run_tasks`](Self::run_tasks); timers fire
/// only when the virtual clock is moved with [`advance`](Self::advance).
/// Completions of cancelled tasks are still returned so that stale-result
/// filtering gets exercised; cancelled timers are dropped.
pub struct ManualRuntime {
    inner: Mutex<Inner>,
}

impl ManualRuntime {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                now_ms: EPOCH_MS,
                tasks: Vec::new(),
                timers: Vec::new(),
                labels: Vec::new(),
            }),
        }
    }

    fn allocate(inner: &mut Inner) -> TaskHandle {
        let id = TaskId::new(inner.next_id);
        inner.next_id += 1;
        TaskHandle::new(id)
    }

    /// Await every queued task and return their completions in spawn order.
    pub async fn run_tasks(&self) -> Vec<PlaybackEvent> {
        let tasks = std::mem::take(&mut self.inner.lock().tasks);
        let mut events = Vec::with_capacity(tasks.len());
        for QueuedTask { handle, work, .. } in tasks {
            let completion = work.await;
            events.push(PlaybackEvent::Completed {
                task: handle.id(),
                completion,
            });
        }
        events
    }

    /// Move the clock forward and return the timers that came due.
    pub fn advance(&self, by: Duration) -> Vec<PlaybackEvent> {
        let mut inner = self.inner.lock();
        inner.now_ms += i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        let now = inner.now_ms;

        let (mut due, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut inner.timers)
                .into_iter()
                .partition(|timer| timer.due_ms <= now);
        inner.timers = pending;

        due.sort_by_key(|timer| (timer.due_ms, timer.handle.id()));
        due.into_iter()
            .filter(|timer| !timer.handle.is_cancelled())
            .map(|timer| PlaybackEvent::Timer {
                task: timer.handle.id(),
                timer: timer.timer,
            })
            .collect()
    }

    pub fn set_now(&self, now_ms: i64) {
        self.inner.lock().now_ms = now_ms;
    }

    /// Live (uncancelled) timers, soonest first.
    pub fn pending_timers(&self) -> Vec<TimerKind> {
        let inner = self.inner.lock();
        let mut timers: Vec<&QueuedTimer> = inner
            .timers
            .iter()
            .filter(|timer| !timer.handle.is_cancelled())
            .collect();
        timers.sort_by_key(|timer| timer.due_ms);
        timers.into_iter().map(|timer| timer.timer).collect()
    }

    pub fn has_pending_timer(&self, kind: TimerKind) -> bool {
        self.pending_timers().contains(&kind)
    }

    /// Labels of every task ever spawned, in order.
    pub fn spawned(&self) -> Vec<&'static str> {
        self.inner.lock().labels.clone()
    }

    pub fn spawned_count(&self, label: &str) -> usize {
        self.inner
            .lock()
            .labels
            .iter()
            .filter(|spawned| **spawned == label)
            .count()
    }

    pub fn queued_tasks(&self) -> usize {
        self.inner.lock().tasks.len()
    }
}

impl Default for ManualRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ManualRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(inner) => f
                .debug_struct("ManualRuntime")
                .field("now_ms", &inner.now_ms)
                .field(
                    "tasks",
                    &inner
                        .tasks
                        .iter()
                        .map(|task| task.label)
                        .collect::<Vec<_>>(),
                )
                .field("timers", &inner.timers)
                .finish(),
            None => f.write_str("ManualRuntime { <locked> }"),
        }
    }
}

impl TaskRuntime for ManualRuntime {
    fn spawn(&self, label: &'static str, work: TaskFuture) -> TaskHandle {
        let mut inner = self.inner.lock();
        let handle = Self::allocate(&mut inner);
        inner.labels.push(label);
        inner.tasks.push(QueuedTask {
            handle: handle.clone(),
            label,
            work,
        });
        handle
    }

    fn schedule(&self, delay: Duration, timer: TimerKind) -> TaskHandle {
        let mut inner = self.inner.lock();
        let handle = Self::allocate(&mut inner);
        let due_ms =
            inner.now_ms + i64::try_from(delay.as_millis()).unwrap_or(i64::MAX);
        inner.timers.push(QueuedTimer {
            handle: handle.clone(),
            due_ms,
            timer,
        });
        handle
    }

    fn now_ms(&self) -> i64 {
        self.inner.lock().now_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use leanback_contracts::StorageResult;

    use crate::bridge::Completion;

    fn saved() -> TaskFuture {
        async {
            let result: StorageResult<()> = Ok(());
            Completion::StateSaved {
                video_id: "v".into(),
                result,
            }
        }
        .boxed()
    }

    #[test]
    fn timers_fire_in_due_order_and_skip_cancelled() {
        let runtime = ManualRuntime::new();
        let late =
            runtime.schedule(Duration::from_secs(5), TimerKind::NextPoll);
        let cancelled =
            runtime.schedule(Duration::from_secs(1), TimerKind::RestartEngine);
        runtime.schedule(Duration::from_secs(2), TimerKind::ReloadVideo);
        cancelled.cancel();

        assert!(runtime.advance(Duration::from_millis(500)).is_empty());
        let fired = runtime.advance(Duration::from_secs(10));
        let kinds: Vec<TimerKind> = fired
            .iter()
            .filter_map(|event| match event {
                PlaybackEvent::Timer { timer, .. } => Some(*timer),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec![TimerKind::ReloadVideo, TimerKind::NextPoll]);
        assert!(late.id() < cancelled.id(), "ids follow allocation order");
    }

    #[tokio::test]
    async fn cancelled_tasks_still_complete() {
        let runtime = ManualRuntime::new();
        let handle = runtime.spawn("save_state", saved());
        handle.cancel();

        let events = runtime.run_tasks().await;
        assert_eq!(events.len(), 1);
        assert_eq!(runtime.spawned(), vec!["save_state"]);
        assert_eq!(runtime.queued_tasks(), 0);
    }
}
