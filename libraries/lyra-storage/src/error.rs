/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Key was empty
    #[error("Storage key must not be empty")]
    EmptyKey,

    /// Backend is not available (e.g. storage disabled in the browser)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Backend refused the write because it is full
    #[error("Storage quota exceeded")]
    QuotaExceeded,

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<StorageError> for lyra_core::CoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::EmptyKey => lyra_core::CoreError::invalid_input(err.to_string()),
            StorageError::Io(io) => lyra_core::CoreError::Io(io),
            other => lyra_core::CoreError::storage(other.to_string()),
        }
    }
}
