//! Crate-level error type.
//!
//! Absence of a record is not an error anywhere in this crate; reads return
//! `Option`. Structural path errors surface before any I/O, and transport
//! errors pass through from the storage boundary unchanged, with no retry
//! layer on top.

use thiserror::Error;

use crate::gateway::StorageError;
use crate::path::PathError;

/// Errors returned by trellisdb operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A composite path failed structural validation at handle construction.
    #[error(transparent)]
    Path(#[from] PathError),

    /// The storage boundary failed; the underlying error passes through
    /// unchanged.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A document body failed JSON (de)serialization.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A document body serialized to something other than a JSON object.
    #[error("document body must be a JSON object, got {0}")]
    NonObjectDocument(&'static str),
}

/// Result type for trellisdb operations.
pub type Result<T> = std::result::Result<T, Error>;
