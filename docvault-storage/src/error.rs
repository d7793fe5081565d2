//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("S3 operation failed: {0}")]
    S3(String),

    #[error("storage not ready: {0}")]
    NotReady(String),

    #[error("invalid storage configuration: {0}")]
    Config(String),
}
