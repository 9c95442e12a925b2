//! Document handles.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::client::Trellis;
use crate::collection::{CollectionArgs, CollectionRef};
use crate::errors::{Error, Result};
use crate::gateway::RawRecord;
use crate::merge::merge_records;
use crate::path;
use crate::projection::project;

/// An addressable handle for one document: a single (partition key, sort
/// key) pair.
///
/// Handles are free to construct, even for documents that do not exist in
/// storage; [`get`](Self::get) returning `None` is expected and
/// non-exceptional. The handle is immutable after construction, a value
/// describing where to read and write rather than a cached copy of data.
///
/// The local id and the sort key are distinct fields: with an id-prefix on
/// the parent collection, the sort key becomes `PREFIX<delimiter><id>`
/// while [`id`](Self::id) stays unprefixed. Callers should not assume the
/// two match unless no prefix is configured.
pub struct DocumentRef<T> {
    db: Trellis,
    collection_path: String,
    path: String,
    local_id: String,
    sort_key: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for DocumentRef<T> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            collection_path: self.collection_path.clone(),
            path: self.path.clone(),
            local_id: self.local_id.clone(),
            sort_key: self.sort_key.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for DocumentRef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentRef")
            .field("path", &self.path)
            .field("id", &self.local_id)
            .field("sort_key", &self.sort_key)
            .finish()
    }
}

impl<T> DocumentRef<T> {
    pub(crate) fn new(
        db: Trellis,
        collection_path: String,
        local_id: String,
        sort_key: String,
    ) -> Result<Self> {
        let delimiter = &db.config().delimiter;
        let path = path::child_path(&collection_path, &sort_key, delimiter);
        path::validate_document_path(&path, delimiter)?;

        Ok(Self {
            db,
            collection_path,
            path,
            local_id,
            sort_key,
            _marker: PhantomData,
        })
    }

    /// The document's local id, as exposed under the configured id field.
    pub fn id(&self) -> &str {
        &self.local_id
    }

    /// The stored sort key, prefixed when the parent collection carries an
    /// id-prefix.
    pub fn sort_key(&self) -> &str {
        &self.sort_key
    }

    /// Full composite path of this document.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path of the parent collection, which is also this document's
    /// partition key.
    pub fn collection_path(&self) -> &str {
        &self.collection_path
    }

    /// Mint a handle for a sub-collection nested under this document.
    pub fn collection<C>(&self, name: impl AsRef<str>) -> Result<CollectionRef<C>> {
        self.collection_with(name, CollectionArgs::default())
    }

    /// Mint a sub-collection handle with arguments, e.g. an id-prefix.
    pub fn collection_with<C>(
        &self,
        name: impl AsRef<str>,
        args: CollectionArgs,
    ) -> Result<CollectionRef<C>> {
        let child = path::child_path(&self.path, name.as_ref(), &self.db.config().delimiter);
        CollectionRef::new(self.db.clone(), child, args)
    }
}

impl<T: Serialize + DeserializeOwned> DocumentRef<T> {
    /// Fetch the document, or `None` when no record exists at this key.
    pub async fn get(&self) -> Result<Option<T>> {
        let record = self
            .db
            .gateway()
            .get(&self.collection_path, &self.sort_key)
            .await?;

        match record {
            Some(record) => {
                let projected = project(record, self.db.config());
                Ok(Some(serde_json::from_value(Value::Object(projected))?))
            }
            None => Ok(None),
        }
    }

    /// Unconditionally overwrite the document.
    ///
    /// The key attributes derived from this handle's path are always
    /// injected, winning over any caller-supplied fields of the same
    /// names, and the local id is persisted under the configured id field.
    pub async fn set(&self, data: &T) -> Result<()> {
        let mut item = to_record(data)?;
        self.stamp_id(&mut item);
        self.db
            .gateway()
            .put(&self.collection_path, &self.sort_key, item)
            .await?;
        Ok(())
    }

    /// Deep-merge `patch` over the current record and write the result.
    ///
    /// Object-valued fields merge recursively; arrays and scalars in the
    /// patch replace the base value wholesale. When no record exists the
    /// patch merges against an empty base and becomes the whole document.
    ///
    /// This is a read-modify-write with no optimistic locking: two
    /// concurrent updates to the same document can lose one write. Callers
    /// needing stronger guarantees must layer conditional writes
    /// themselves.
    pub async fn update<P: Serialize>(&self, patch: &P) -> Result<()> {
        let config = self.db.config();
        let base = self
            .db
            .gateway()
            .get(&self.collection_path, &self.sort_key)
            .await?;

        let base = match base {
            Some(mut record) => {
                record.remove(&config.partition_key);
                record.remove(&config.sort_key);
                record
            }
            None => Map::new(),
        };

        let patch = to_record(patch)?;
        let mut item = merge_records(base, patch);
        self.stamp_id(&mut item);
        self.db
            .gateway()
            .put(&self.collection_path, &self.sort_key, item)
            .await?;
        Ok(())
    }

    /// Delete the document. Idempotent; deleting an absent record is not
    /// an error.
    pub async fn delete(&self) -> Result<()> {
        self.db
            .gateway()
            .delete(&self.collection_path, &self.sort_key)
            .await?;
        Ok(())
    }

    fn stamp_id(&self, item: &mut RawRecord) {
        let config = self.db.config();
        item.insert(
            config.id_field.clone(),
            Value::String(self.local_id.clone()),
        );
    }
}

pub(crate) fn to_record<T: Serialize>(data: &T) -> Result<RawRecord> {
    match serde_json::to_value(data)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::NonObjectDocument(json_type_name(&other))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_record_rejects_non_objects() {
        let err = to_record(&42).unwrap_err();
        assert!(matches!(err, Error::NonObjectDocument("a number")));
        assert!(to_record(&serde_json::json!({"ok": true})).is_ok());
    }
}
