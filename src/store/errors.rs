//! Task store error types

use thiserror::Error;

/// Errors that can occur during task store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to connect to the store backend
    #[error("Task store connection error: {0}")]
    ConnectionError(String),

    /// A stored record could not be encoded or decoded
    #[error("Task record serialization error: {0}")]
    SerializationError(String),

    /// Generic backend error
    #[error("Task store backend error: {0}")]
    BackendError(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        StoreError::SerializationError(error.to_string())
    }
}

/// Result type for task store operations
pub type StoreResult<T> = Result<T, StoreError>;
