use crate::error::StorageResult;
use async_trait::async_trait;
use std::fmt::Debug;

/// Generic key-value persistence. Only key-based lookup is required.
#[async_trait]
pub trait KeyValueStore: Send + Sync + Debug {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    async fn put(&self, key: &str, value: Vec<u8>) -> StorageResult<()>;

    async fn remove(&self, key: &str) -> StorageResult<()>;
}
