//! Storage boundary errors.

use thiserror::Error;

/// Errors from the storage boundary.
///
/// Transport errors pass through to the caller unchanged; this layer
/// applies no retry policy of its own.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// Network or service failure from the backing store.
    #[error("storage transport error: {0}")]
    Transport(String),

    /// The backend could not interpret the request, e.g. a key-condition
    /// expression outside the supported grammar or an item missing its key
    /// attributes.
    #[error("malformed storage request: {0}")]
    Request(String),
}

impl StorageError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn request(message: impl Into<String>) -> Self {
        Self::Request(message.into())
    }
}

/// Result type for storage boundary operations.
pub type StorageResult<T> = Result<T, StorageError>;
