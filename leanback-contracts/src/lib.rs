//! Trait surfaces for the collaborators the playback core drives.

pub mod catalog;
pub mod error;
pub mod storage;
pub mod surface;

pub use catalog::CatalogClient;
pub use error::{CatalogError, CatalogResult, StorageError, StorageResult};
pub use storage::KeyValueStore;
pub use surface::{
    ErrorNotice, PlaybackEngine, PlaybackOverlay, PlaybackSurface,
};

/// Frequently used trait combinators for handler and session code.
pub mod prelude {
    pub use super::catalog::CatalogClient;
    pub use super::error::{CatalogError, StorageError};
    pub use super::storage::KeyValueStore;
    pub use super::surface::{
        ErrorNotice, PlaybackEngine, PlaybackOverlay, PlaybackSurface,
    };
    pub use leanback_model::prelude::*;
}
