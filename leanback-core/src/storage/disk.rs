use std::path::{Path, PathBuf};

use async_trait::async_trait;
use leanback_contracts::{KeyValueStore, StorageError, StorageResult};
use tracing::trace;

/// Directory that `cacache` manages (index plus content-addressed blobs).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StoreRoot(PathBuf);

impl StoreRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

/// Persistent store over a `cacache` directory.
#[derive(Clone, Debug)]
pub struct DiskStore {
    root: StoreRoot,
}

impl DiskStore {
    pub fn new(root: StoreRoot) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &StoreRoot {
        &self.root
    }
}

#[async_trait]
impl KeyValueStore for DiskStore {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        match cacache::read(self.root.as_path(), key).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(cacache::Error::EntryNotFound(_, _)) => Ok(None),
            Err(cacache::Error::IntegrityError(err)) => {
                Err(StorageError::Corrupt(format!(
                    "entry failed integrity check: {key} ({err})"
                )))
            }
            Err(cacache::Error::SizeMismatch(wanted, actual)) => {
                Err(StorageError::Corrupt(format!(
                    "entry size mismatch: key={key}, \
                     wanted={wanted}, actual={actual}"
                )))
            }
            Err(cacache::Error::IoError(_, msg)) => Err(StorageError::Backend(
                format!("cacache read I/O error: {msg}"),
            )),
            Err(cacache::Error::SerdeError(_, msg)) => {
                Err(StorageError::Backend(format!(
                    "cacache read serde error: {msg}"
                )))
            }
        }
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> StorageResult<()> {
        let integrity = cacache::write(self.root.as_path(), key, &value)
            .await
            .map_err(|e| {
                StorageError::Backend(format!("cacache write failed: {e}"))
            })?;
        trace!(target: "playback::state", key, %integrity, "entry written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        cacache::index::RemoveOpts::new()
            .remove_fully(true)
            .remove(self.root.as_path(), key)
            .await
            .map_err(|e| {
                StorageError::Backend(format!("cacache remove failed: {e}"))
            })
    }
}
