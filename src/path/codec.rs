//! Pure path validation and construction functions.

use super::errors::PathError;

/// Validate a collection path and return its segments.
///
/// Fails if the path starts with the delimiter (empty leading segment) or
/// if it splits into an even number of segments, which means the string
/// actually addresses a document.
pub fn validate_collection_path<'a>(
    path: &'a str,
    delimiter: &str,
) -> Result<Vec<&'a str>, PathError> {
    if path.starts_with(delimiter) {
        return Err(PathError::LeadingDelimiter {
            path: path.to_string(),
            delimiter: delimiter.to_string(),
        });
    }

    let segments: Vec<&str> = path.split(delimiter).collect();
    if segments.len() % 2 == 0 {
        return Err(PathError::ExpectedCollection {
            path: path.to_string(),
            delimiter: delimiter.to_string(),
        });
    }

    Ok(segments)
}

/// Validate a document path and return its segments.
///
/// Fails if the path splits into an odd number of segments, which means
/// the string actually addresses a collection.
pub fn validate_document_path<'a>(
    path: &'a str,
    delimiter: &str,
) -> Result<Vec<&'a str>, PathError> {
    let segments: Vec<&str> = path.split(delimiter).collect();
    if segments.len() % 2 == 1 {
        return Err(PathError::ExpectedDocument {
            path: path.to_string(),
            delimiter: delimiter.to_string(),
        });
    }

    Ok(segments)
}

/// Append a child segment to a parent path.
///
/// No validation happens here; the constructor of the resulting handle
/// validates the combined path.
pub fn child_path(parent: &str, segment: &str, delimiter: &str) -> String {
    format!("{parent}{delimiter}{segment}")
}
