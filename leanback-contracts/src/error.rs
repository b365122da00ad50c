use thiserror::Error;

/// Failures reported by the catalog/service client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("network error: {0}")]
    Network(String),

    #[error("failed to parse catalog response: {0}")]
    Parse(String),

    /// Stream URL signature/cipher could not be computed
    #[error("signature decipher failed: {0}")]
    Signing(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("request cancelled")]
    Cancelled,
}

impl CatalogError {
    pub fn is_signing(&self) -> bool {
        matches!(self, CatalogError::Signing(_))
    }
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Failures reported by the key-value persistence backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("stored value is corrupt: {0}")]
    Corrupt(String),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;
