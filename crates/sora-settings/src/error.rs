//! Settings storage error types.

use thiserror::Error;

/// Storage error type.
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid stored data
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias using StorageError.
pub type StorageResult<T> = Result<T, StorageError>;
