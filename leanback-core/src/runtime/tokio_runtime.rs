use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::trace;

use super::{TaskFuture, TaskHandle, TaskId, TaskRuntime};
use crate::bridge::{PlaybackEvent, TimerKind};

/// Production runtime: tasks run on the ambient tokio runtime and post their
/// results to the session's event channel.
///
/// Must be used from within a tokio runtime context.
pub struct TokioTaskRuntime {
    events: mpsc::UnboundedSender<PlaybackEvent>,
    next_id: AtomicU64,
}

impl TokioTaskRuntime {
    pub fn new(events: mpsc::UnboundedSender<PlaybackEvent>) -> Self {
        Self {
            events,
            next_id: AtomicU64::new(1),
        }
    }

    fn allocate(&self) -> TaskHandle {
        let raw = self.next_id.fetch_add(1, Ordering::Relaxed);
        TaskHandle::new(TaskId::new(raw))
    }
}

impl fmt::Debug for TokioTaskRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioTaskRuntime")
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .field("closed", &self.events.is_closed())
            .finish()
    }
}

impl TaskRuntime for TokioTaskRuntime {
    fn spawn(&self, label: &'static str, work: TaskFuture) -> TaskHandle {
        let handle = self.allocate();
        let task = handle.id();
        let token = handle.token();
        let events = self.events.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    trace!(
                        target: "playback::runtime",
                        %task,
                        label,
                        "task cancelled"
                    );
                }
                completion = work => {
                    if token.is_cancelled() {
                        return;
                    }
                    let event = PlaybackEvent::Completed { task, completion };
                    if events.send(event).is_err() {
                        trace!(
                            target: "playback::runtime",
                            %task,
                            label,
                            "session gone; dropping completion"
                        );
                    }
                }
            }
        });

        handle
    }

    fn schedule(&self, delay: Duration, timer: TimerKind) -> TaskHandle {
        let handle = self.allocate();
        let task = handle.id();
        let token = handle.token();
        let events = self.events.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if !token.is_cancelled() {
                        let event = PlaybackEvent::Timer { task, timer };
                        let _ = events.send(event);
                    }
                }
            }
        });

        handle
    }

    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::Completion;
    use futures::FutureExt;
    use leanback_model::VideoId;

    #[tokio::test]
    async fn completion_is_tagged_with_the_task_id() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runtime = TokioTaskRuntime::new(tx);

        let handle = runtime.spawn(
            "history",
            async {
                Completion::HistoryPushed {
                    video_id: VideoId::from("v"),
                    result: Ok(()),
                }
            }
            .boxed(),
        );

        match rx.recv().await {
            Some(PlaybackEvent::Completed { task, .. }) => {
                assert_eq!(task, handle.id())
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancelled_timer_never_fires() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runtime = TokioTaskRuntime::new(tx);

        let cancelled = runtime
            .schedule(Duration::from_millis(5), TimerKind::BufferingWatchdog);
        cancelled.cancel();
        let kept =
            runtime.schedule(Duration::from_millis(10), TimerKind::NextPoll);

        match rx.recv().await {
            Some(PlaybackEvent::Timer { task, timer }) => {
                assert_eq!(task, kept.id());
                assert_eq!(timer, TimerKind::NextPoll);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
