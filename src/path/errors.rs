//! Path validation errors

use thiserror::Error;

/// Structural error raised when a composite path fails validation.
///
/// A `PathError` indicates a programming error in how paths were composed.
/// It is raised synchronously at handle construction, before any storage
/// call, and is never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The path starts with the delimiter, which would produce an empty
    /// leading segment.
    #[error("collection path {path:?} must not start with delimiter {delimiter:?}")]
    LeadingDelimiter { path: String, delimiter: String },

    /// The path splits into an even number of segments and therefore
    /// addresses a document, not a collection.
    #[error("{path:?} addresses a document, not a collection (even segment count on {delimiter:?})")]
    ExpectedCollection { path: String, delimiter: String },

    /// The path splits into an odd number of segments and therefore
    /// addresses a collection, not a document.
    #[error("{path:?} addresses a collection, not a document (odd segment count on {delimiter:?})")]
    ExpectedDocument { path: String, delimiter: String },
}
