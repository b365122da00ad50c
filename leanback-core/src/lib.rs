//! # Leanback Core
//!
//! Playback orchestration for a lean-back video client: turning "play this
//! video" into a stream the engine can open, keeping it playing through
//! engine failures, remembering where the viewer left off, and deciding
//! what plays next.
//!
//! ## Architecture
//!
//! A [`PlaybackSession`] owns an [`EventBridge`] with a fixed list of
//! [`PlaybackHandler`]s plus the mutable [`SessionState`]. Lifecycle events
//! from the engine and the view are dispatched to every handler in order;
//! input events (keys, previous/next) run as a chain that stops at the
//! first handler to claim them.
//!
//! - [`loader`]: format resolution, source selection, error remediation,
//!   buffering watchdog and end-of-video handling
//! - [`state`]: per-video position and speed persistence
//! - [`pagination`]: suggestion-row continuation
//! - [`runtime`]: background tasks and timers that rejoin the dispatch loop
//! - [`storage`]: in-memory and `cacache`-backed key-value stores
//! - [`testing`]: deterministic runtime, fake surface and scripted catalog
//!
//! Background work never touches session state directly. It comes back as a
//! [`PlaybackEvent::Completed`] tagged with the [`TaskId`] it was issued
//! under, and a handler that has since moved on drops it.
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use leanback_contracts::{CatalogClient, PlaybackSurface};
//! use leanback_core::{PlaybackEvent, PlaybackSession};
//! use leanback_model::Video;
//!
//! async fn play(
//!     catalog: Arc<dyn CatalogClient>,
//!     surface: Arc<dyn PlaybackSurface>,
//! ) -> leanback_core::Result<()> {
//!     let (session, _join) =
//!         PlaybackSession::builder().catalog(catalog).spawn()?;
//!     session.attach_surface(surface)?;
//!     session.open(Video::new("dQw4w9WgXcQ", "Example"))?;
//!     session.send(PlaybackEvent::VideoLoaded)?;
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod error;
pub mod loader;
pub mod pagination;
pub mod runtime;
pub mod session;
pub mod state;
pub mod storage;
pub mod telemetry;
pub mod testing;

pub use bridge::{
    ChainEvent, Completion, DispatchContext, EventBridge, Handled,
    PlaybackEvent, PlaybackHandler, TimerKind,
};
pub use error::{
    HandlerError, HandlerResult, PlaybackError, ResolutionFailure, Result,
    UnplayableReason,
};
pub use loader::{LoaderState, VideoLoader};
pub use pagination::{ContinueOutcome, PaginationLoader};
pub use runtime::{
    TaskHandle, TaskId, TaskRuntime, TaskSlot, TokioTaskRuntime,
};
pub use session::{
    PlaybackSession, SessionBuilder, SessionCommand, SessionHandle,
    SessionState,
};
pub use state::StateStore;
pub use storage::{DiskStore, InMemoryStore, StoreRoot};
pub use telemetry::init_tracing;
