//! Composite path handling
//!
//! A path is an ordered sequence of alternating segment kinds, collection
//! name then document id, joined by the configured delimiter. A path with
//! an odd number of segments addresses a collection; an even number
//! addresses a document.
//!
//! Validation runs when a handle is constructed, never at query time, so a
//! malformed hierarchy fails at the point of mis-use rather than at first
//! I/O.

mod codec;
mod errors;

pub use codec::{child_path, validate_collection_path, validate_document_path};
pub use errors::PathError;
