//! Error types for the store layer
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

/// Boxed error coming out of a backend's transport or filesystem.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

// == Store Error Enum ==
/// Unified error type for every store, decorator and backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Key is absent on read or existence check
    #[error("store: key not found: {0}")]
    NotFound(String),

    /// Bytes are present but do not parse into the expected type
    #[error("store: can't decode value at {key}: {source}")]
    CantDecode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Value could not be serialized
    #[error("store: can't encode value for {key}: {source}")]
    CantEncode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Backend configuration is invalid, raised at construction time
    #[error("store: configuration is invalid: {0}")]
    BadConfig(String),

    /// Key cannot be represented by the backend
    #[error("store: invalid key: {0:?}")]
    InvalidKey(String),

    /// Transport or I/O failure inside a backend
    #[error("store: {op} {key:?} failed: {source}")]
    Backend {
        op: &'static str,
        key: String,
        #[source]
        source: BackendError,
    },

    /// The caller's context was cancelled
    #[error("store: operation cancelled")]
    Cancelled,

    /// The caller's context deadline elapsed
    #[error("store: deadline exceeded")]
    DeadlineExceeded,
}

impl StoreError {
    /// Wraps a backend failure with the operation and key it happened on.
    pub fn backend(
        op: &'static str,
        key: impl Into<String>,
        source: impl Into<BackendError>,
    ) -> Self {
        StoreError::Backend {
            op,
            key: key.into(),
            source: source.into(),
        }
    }

    /// True for [`StoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    /// True when the operation was aborted by its context.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, StoreError::Cancelled | StoreError::DeadlineExceeded)
    }
}

// == Result Type Alias ==
/// Convenience Result type for the store layer.
pub type Result<T> = std::result::Result<T, StoreError>;
