//! Structural path validation fires at handle construction, before any
//! storage call.

use async_trait::async_trait;
use serde_json::Value;
use trellisdb::{
    Error, PathError, QueryRequest, RawRecord, RecordKey, StorageBackend, StorageResult, Trellis,
    TrellisConfig,
};

/// Backend that fails the test if any operation reaches it.
struct UnreachableBackend;

#[async_trait]
impl StorageBackend for UnreachableBackend {
    async fn put(&self, _table: &str, _item: RawRecord) -> StorageResult<()> {
        panic!("storage must not be reached for a structurally invalid path");
    }

    async fn get(&self, _table: &str, _key: &RecordKey) -> StorageResult<Option<RawRecord>> {
        panic!("storage must not be reached for a structurally invalid path");
    }

    async fn delete(&self, _table: &str, _key: &RecordKey) -> StorageResult<()> {
        panic!("storage must not be reached for a structurally invalid path");
    }

    async fn query(&self, _table: &str, _request: &QueryRequest) -> StorageResult<Vec<RawRecord>> {
        panic!("storage must not be reached for a structurally invalid path");
    }
}

fn guarded_db() -> Trellis {
    Trellis::new(UnreachableBackend, TrellisConfig::new("Test"))
}

#[test]
fn test_leading_delimiter_rejected_before_any_io() {
    let db = guarded_db();
    let err = db.collection::<Value>("#abc").unwrap_err();
    assert!(matches!(
        err,
        Error::Path(PathError::LeadingDelimiter { .. })
    ));
}

#[test]
fn test_document_style_path_rejected_as_collection() {
    let db = guarded_db();
    let err = db.collection::<Value>("POSTS#1234").unwrap_err();
    assert!(matches!(
        err,
        Error::Path(PathError::ExpectedCollection { .. })
    ));
}

#[test]
fn test_doc_id_containing_delimiter_breaks_parity() {
    let db = guarded_db();
    let posts = db.collection::<Value>("POSTS").unwrap();
    let err = posts.doc("12#34").unwrap_err();
    assert!(matches!(
        err,
        Error::Path(PathError::ExpectedDocument { .. })
    ));
}

#[test]
fn test_collection_name_containing_delimiter_breaks_parity() {
    let db = guarded_db();
    let post = db.collection::<Value>("POSTS").unwrap().doc("1234").unwrap();
    let err = post.collection::<Value>("COMMENTS#EXTRA").unwrap_err();
    assert!(matches!(
        err,
        Error::Path(PathError::ExpectedCollection { .. })
    ));
}

#[test]
fn test_error_message_names_offending_path_and_delimiter() {
    let db = guarded_db();
    let message = db
        .collection::<Value>("#abc")
        .unwrap_err()
        .to_string();
    assert!(message.contains("#abc"));
    assert!(message.contains("\"#\""));
}

#[test]
fn test_valid_nested_hierarchy_constructs_without_io() {
    let db = guarded_db();
    // three levels of handles, zero storage calls
    let deep = db
        .collection::<Value>("POSTS")
        .unwrap()
        .doc("1")
        .unwrap()
        .collection::<Value>("COMMENTS")
        .unwrap()
        .doc("2")
        .unwrap()
        .collection::<Value>("REACTIONS")
        .unwrap();
    assert_eq!(deep.path(), "POSTS#1#COMMENTS#2#REACTIONS");
}
