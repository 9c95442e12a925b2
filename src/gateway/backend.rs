//! The storage boundary trait.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use super::errors::StorageResult;

/// A stored record as the backend sees it: the two key attributes plus
/// arbitrary caller-supplied fields.
pub type RawRecord = serde_json::Map<String, Value>;

/// The primary key of one record: partition-key and sort-key values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub partition_key: String,
    pub sort_key: String,
}

impl RecordKey {
    pub fn new(partition_key: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: sort_key.into(),
        }
    }
}

/// A single-page range query against one partition.
///
/// The expression references attribute names through `#`-placeholders and
/// literal values through `:`-placeholders, resolved by the two maps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRequest {
    pub key_condition_expression: String,
    pub expression_attribute_names: HashMap<String, String>,
    pub expression_attribute_values: HashMap<String, String>,
}

/// The four primitives every backing store must provide.
///
/// Implementations handle their own connection, credential, timeout and
/// retry concerns; this crate layers nothing on top.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Upsert the whole item, keyed by its key attributes.
    async fn put(&self, table: &str, item: RawRecord) -> StorageResult<()>;

    /// Fetch one item, or `None` when absent.
    async fn get(&self, table: &str, key: &RecordKey) -> StorageResult<Option<RawRecord>>;

    /// Remove one item; a no-op when absent.
    async fn delete(&self, table: &str, key: &RecordKey) -> StorageResult<()>;

    /// Return all items matching the key condition, in ascending sort-key
    /// order.
    async fn query(&self, table: &str, request: &QueryRequest) -> StorageResult<Vec<RawRecord>>;
}
