//! trellisdb - hierarchical collections and documents over a single
//! DynamoDB-style table
//!
//! A client-side data-modeling layer for single-table design. Callers
//! address nested collections and documents through composite paths like
//! `POSTS#1234#COMMENTS`, which encode onto the table's partition-key and
//! sort-key pair; queries, prefix filters and partial updates are
//! translated into the store's key-condition grammar.
//!
//! ```no_run
//! use serde::{Deserialize, Serialize};
//! use trellisdb::{SortKeyFilter, Trellis, TrellisConfig};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Comment {
//!     text: String,
//! }
//!
//! # async fn demo() -> trellisdb::Result<()> {
//! let db = Trellis::in_memory(TrellisConfig::new("app-table"));
//!
//! let comments = db
//!     .collection::<serde_json::Value>("POSTS")?
//!     .doc("1234")?
//!     .collection::<Comment>("COMMENTS")?;
//!
//! let created = comments.add(&Comment { text: "first!".into() }).await?;
//! let one = comments.doc(created.id())?.get().await?;
//! let recent = comments
//!     .get_filtered(&SortKeyFilter::begins_with("2026"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod collection;
pub mod config;
pub mod document;
pub mod errors;
pub mod filter;
pub mod gateway;
pub mod hooks;
pub mod merge;
pub mod observe;
pub mod path;
pub mod projection;

pub use client::Trellis;
pub use collection::{CollectionArgs, CollectionRef};
pub use config::{IdGenerator, TrellisConfig};
pub use document::DocumentRef;
pub use errors::{Error, Result};
pub use filter::{KeyCondition, SortKeyFilter};
pub use gateway::{
    MemoryBackend, QueryRequest, RawRecord, RecordKey, StorageBackend, StorageError,
    StorageGateway, StorageResult,
};
pub use hooks::{HookError, HookPayload, HookRegistry, HookStage, OperationLogger, OperationTimer, Plugin};
pub use path::PathError;

#[cfg(feature = "dynamodb")]
pub use gateway::{DynamoBackend, DynamoConfig};
