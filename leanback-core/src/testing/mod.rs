//! Deterministic doubles for driving a session in tests.
//!
//! A typical test builds a session on a [`ManualRuntime`], a
//! [`RecordingCatalog`] and a [`FakeSurface`], dispatches lifecycle events,
//! and calls [`settle`] to feed background completions back in:
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use leanback_core::testing::*;
//! # use leanback_core::PlaybackSession;
//! # use leanback_model::Video;
//! # async fn demo() -> leanback_core::Result<()> {
//! let runtime = Arc::new(ManualRuntime::new());
//! let catalog = Arc::new(RecordingCatalog::new());
//! let mut session = PlaybackSession::builder()
//!     .catalog(catalog.clone())
//!     .runtime(runtime.clone())
//!     .build()?;
//! session.attach_surface(Arc::new(FakeSurface::new()));
//! session.open(Video::new("abc", "A video"));
//! settle(&mut session, &runtime).await;
//! # Ok(())
//! # }
//! ```

mod catalog;
mod runtime;
mod store;
mod surface;

pub use catalog::{CatalogCall, RecordingCatalog};
pub use runtime::{EPOCH_MS, ManualRuntime};
pub use store::FailingStore;
pub use surface::{FakeSurface, SurfaceCall};

use std::time::Duration;

use crate::session::PlaybackSession;

/// Rounds after which [`settle`] gives up; completions that keep spawning
/// more work would otherwise spin forever.
const MAX_ROUNDS: usize = 64;

/// Run queued background work and dispatch its completions until nothing
/// new is spawned. Returns the number of completions delivered.
pub async fn settle(
    session: &mut PlaybackSession,
    runtime: &ManualRuntime,
) -> usize {
    let mut delivered = 0;
    for _ in 0..MAX_ROUNDS {
        let events = runtime.run_tasks().await;
        if events.is_empty() {
            break;
        }
        delivered += events.len();
        for event in events {
            session.dispatch(event);
        }
    }
    delivered
}

/// Move the virtual clock, fire due timers, then [`settle`].
pub async fn advance(
    session: &mut PlaybackSession,
    runtime: &ManualRuntime,
    by: Duration,
) {
    for event in runtime.advance(by) {
        session.dispatch(event);
    }
    settle(session, runtime).await;
}
