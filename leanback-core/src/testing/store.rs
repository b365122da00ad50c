use async_trait::async_trait;
use leanback_contracts::{KeyValueStore, StorageError, StorageResult};
use parking_lot::Mutex;

/// Store whose every operation fails with a backend error.
#[derive(Debug, Default)]
pub struct FailingStore {
    attempts: Mutex<usize>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }

    fn fail(&self, op: &str) -> StorageError {
        *self.attempts.lock() += 1;
        StorageError::Backend(format!("{op}: disk unavailable"))
    }
}

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> StorageResult<Option<Vec<u8>>> {
        Err(self.fail("get"))
    }

    async fn put(&self, _key: &str, _value: Vec<u8>) -> StorageResult<()> {
        Err(self.fail("put"))
    }

    async fn remove(&self, _key: &str) -> StorageResult<()> {
        Err(self.fail("remove"))
    }
}
