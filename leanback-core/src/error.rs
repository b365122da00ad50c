use leanback_contracts::{CatalogError, StorageError};
use leanback_model::ErrorEvent;
use thiserror::Error;

/// Why format resolution failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionFailure {
    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    /// Signature/cipher computation failed; the signing cache is stale
    #[error("signing error: {0}")]
    Signing(String),
}

impl From<CatalogError> for ResolutionFailure {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Signing(msg) => ResolutionFailure::Signing(msg),
            CatalogError::Parse(msg) => ResolutionFailure::Parse(msg),
            CatalogError::Network(msg) | CatalogError::NotFound(msg) => {
                ResolutionFailure::Network(msg)
            }
            CatalogError::Cancelled => {
                ResolutionFailure::Network("request cancelled".into())
            }
        }
    }
}

/// Why a resolved stream cannot be played at all.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnplayableReason {
    #[error("age restricted")]
    AgeRestricted,

    #[error("blocked")]
    Blocked,

    #[error("licensing")]
    Licensing,
}

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Resolution failed: {0}")]
    Resolution(#[from] ResolutionFailure),

    #[error("Stream unplayable: {0}")]
    StreamUnplayable(UnplayableReason),

    #[error("Engine error: {0}")]
    Engine(ErrorEvent),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("Session closed")]
    SessionClosed,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CatalogError> for PlaybackError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Cancelled => {
                PlaybackError::Cancelled("catalog request".into())
            }
            other => PlaybackError::Resolution(other.into()),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlaybackError>;

/// Error type handlers hand back to the bridge. Never fatal: the bridge
/// logs it and keeps dispatching.
pub type HandlerError = PlaybackError;

pub type HandlerResult<T = ()> = std::result::Result<T, HandlerError>;
