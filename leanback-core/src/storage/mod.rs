//! [`KeyValueStore`] backends for watch state.
//!
//! [`KeyValueStore`]: leanback_contracts::KeyValueStore

mod disk;
mod memory;

pub use disk::{DiskStore, StoreRoot};
pub use memory::InMemoryStore;
