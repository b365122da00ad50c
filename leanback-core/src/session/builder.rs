use std::fmt;
use std::sync::Arc;

use leanback_config::PlaybackConfig;
use leanback_contracts::{CatalogClient, KeyValueStore};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{PlaybackSession, SessionHandle, SessionState};
use crate::bridge::{EventBridge, PlaybackHandler};
use crate::error::{PlaybackError, Result};
use crate::loader::VideoLoader;
use crate::pagination::PaginationLoader;
use crate::runtime::{TaskRuntime, TokioTaskRuntime};
use crate::state::StateStore;
use crate::storage::InMemoryStore;

/// Composition root for a [`PlaybackSession`].
///
/// Built-in handlers always run in the order loader, state, pagination;
/// handlers added with [`handler`](Self::handler) run before them.
#[derive(Default)]
pub struct SessionBuilder {
    config: PlaybackConfig,
    catalog: Option<Arc<dyn CatalogClient>>,
    store: Option<Arc<dyn KeyValueStore>>,
    runtime: Option<Arc<dyn TaskRuntime>>,
    leading: Vec<Box<dyn PlaybackHandler>>,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: PlaybackConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catalog(mut self, catalog: Arc<dyn CatalogClient>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Backing store for watch state; defaults to [`InMemoryStore`].
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn runtime(mut self, runtime: Arc<dyn TaskRuntime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn handler(mut self, handler: Box<dyn PlaybackHandler>) -> Self {
        self.leading.push(handler);
        self
    }

    pub fn build(self) -> Result<PlaybackSession> {
        let catalog = self.catalog.ok_or_else(|| {
            PlaybackError::Internal("session requires a catalog client".into())
        })?;
        let runtime = self.runtime.ok_or_else(|| {
            PlaybackError::Internal("session requires a task runtime".into())
        })?;
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryStore::new()));
        let PlaybackConfig {
            loader,
            state,
            pagination,
            tweaks,
        } = self.config;

        let mut handlers = self.leading;
        handlers.push(Box::new(VideoLoader::new(
            Arc::clone(&catalog),
            Arc::clone(&runtime),
            loader,
        )));
        handlers.push(Box::new(StateStore::new(
            store,
            Arc::clone(&catalog),
            Arc::clone(&runtime),
            state,
        )));
        handlers.push(Box::new(PaginationLoader::new(
            catalog, runtime, pagination,
        )));

        Ok(PlaybackSession::new(
            EventBridge::new(handlers),
            SessionState::new(tweaks),
        ))
    }

    /// Build on a [`TokioTaskRuntime`] and run the session on the ambient
    /// tokio runtime. Any runtime set on the builder is replaced.
    pub fn spawn(mut self) -> Result<(SessionHandle, JoinHandle<()>)> {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        self.runtime = Some(Arc::new(TokioTaskRuntime::new(event_tx)));

        let session = self.build()?;
        let join = tokio::spawn(session.run(command_rx, event_rx));
        Ok((SessionHandle::new(command_tx), join))
    }
}

impl fmt::Debug for SessionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionBuilder")
            .field("config", &self.config)
            .field("catalog", &self.catalog.is_some())
            .field("store", &self.store.is_some())
            .field("runtime", &self.runtime.is_some())
            .field(
                "leading",
                &self.leading.iter().map(|h| h.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ManualRuntime, RecordingCatalog};

    #[test]
    fn built_in_handlers_run_in_fixed_order() {
        let session = SessionBuilder::new()
            .catalog(Arc::new(RecordingCatalog::new()))
            .runtime(Arc::new(ManualRuntime::new()))
            .build()
            .expect("session");

        assert_eq!(
            session.bridge().handler_names(),
            vec!["video_loader", "state_store", "pagination_loader"]
        );
    }

    #[test]
    fn missing_catalog_is_an_error() {
        let result = SessionBuilder::new()
            .runtime(Arc::new(ManualRuntime::new()))
            .build();

        assert!(matches!(result, Err(PlaybackError::Internal(_))));
    }
}
