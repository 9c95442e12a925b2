//! Collection handles.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::client::Trellis;
use crate::document::DocumentRef;
use crate::errors::Result;
use crate::filter::SortKeyFilter;
use crate::path;
use crate::projection::project;

/// Arguments applied when minting a collection handle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionArgs {
    /// Prefix applied to the sort key of every document created within the
    /// collection, e.g. `PUBLISHED` yielding sort keys like
    /// `PUBLISHED#<id>`. Lets one collection namespace its children
    /// without splitting into separate collections.
    pub prefix: Option<String>,
}

impl CollectionArgs {
    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

/// An addressable handle for a set of documents sharing one partition key:
/// the collection's full path string.
///
/// Stateless beyond its path and optional id-prefix, and never persisted
/// itself; only its documents are.
pub struct CollectionRef<T> {
    db: Trellis,
    path: String,
    prefix: Option<String>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for CollectionRef<T> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            path: self.path.clone(),
            prefix: self.prefix.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for CollectionRef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionRef")
            .field("path", &self.path)
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl<T> CollectionRef<T> {
    pub(crate) fn new(db: Trellis, path: String, args: CollectionArgs) -> Result<Self> {
        path::validate_collection_path(&path, &db.config().delimiter)?;

        Ok(Self {
            db,
            path,
            prefix: args.prefix,
            _marker: PhantomData,
        })
    }

    /// Full composite path of this collection; the partition key of all
    /// its documents.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The id-prefix applied to documents created here, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Path of the parent document, or `None` for a root collection.
    pub fn parent_path(&self) -> Option<String> {
        let delimiter = &self.db.config().delimiter;
        self.path
            .rfind(delimiter.as_str())
            .map(|index| self.path[..index].to_string())
    }

    /// Mint a handle for the document with the given local id. Pure
    /// construction; no I/O.
    pub fn doc(&self, id: impl Into<String>) -> Result<DocumentRef<T>> {
        let id = id.into();
        let sort_key = self.sort_key_for(&id);
        DocumentRef::new(self.db.clone(), self.path.clone(), id, sort_key)
    }

    /// Mint a handle with a freshly generated local id.
    pub fn new_doc(&self) -> Result<DocumentRef<T>> {
        self.doc(self.db.config().generate_id())
    }

    fn sort_key_for(&self, id: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}{}{id}", self.db.config().delimiter),
            None => id.to_string(),
        }
    }
}

impl<T: Serialize + DeserializeOwned> CollectionRef<T> {
    /// Fetch every document in the collection, in ascending sort-key
    /// order.
    pub async fn get(&self) -> Result<Vec<T>> {
        self.run_query(None).await
    }

    /// Fetch the documents matching a sort-key filter, in ascending
    /// sort-key order.
    pub async fn get_filtered(&self, filter: &SortKeyFilter) -> Result<Vec<T>> {
        self.run_query(Some(filter)).await
    }

    /// Create a document with a fresh local id (prefixed in the sort key
    /// when this collection carries a prefix) and return its handle.
    pub async fn add(&self, data: &T) -> Result<DocumentRef<T>> {
        let doc = self.new_doc()?;
        doc.set(data).await?;
        Ok(doc)
    }

    async fn run_query(&self, filter: Option<&SortKeyFilter>) -> Result<Vec<T>> {
        let records = self.db.gateway().query(&self.path, filter).await?;
        records
            .into_iter()
            .map(|record| {
                let projected = project(record, self.db.config());
                serde_json::from_value(Value::Object(projected)).map_err(Into::into)
            })
            .collect()
    }
}
