//! Table configuration.
//!
//! Set once at construction and immutable afterward. All path and key
//! computations are pure functions of this configuration plus the handles'
//! paths.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

/// Generates local document ids. Defaults to random UUID v4 strings.
pub type IdGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// Configuration for a [`Trellis`](crate::Trellis) instance.
#[derive(Clone)]
pub struct TrellisConfig {
    /// Name of the underlying table.
    pub table: String,
    /// Delimiter joining path segments and id prefixes.
    pub delimiter: String,
    /// Attribute name of the partition key.
    pub partition_key: String,
    /// Attribute name of the sort key.
    pub sort_key: String,
    /// Field name under which a record's identity is exposed to callers.
    pub id_field: String,
    /// Retain the raw key attributes in projected responses. Debugging and
    /// migration aid, off in normal operation.
    pub include_index: bool,
    id_generator: IdGenerator,
}

impl TrellisConfig {
    /// Configuration with the default delimiter (`#`), key attribute names
    /// (`PK`, `SK`), id field (`id`) and UUID v4 id generation.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            delimiter: "#".to_string(),
            partition_key: "PK".to_string(),
            sort_key: "SK".to_string(),
            id_field: "id".to_string(),
            include_index: false,
            id_generator: Arc::new(|| Uuid::new_v4().to_string()),
        }
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn with_partition_key(mut self, attribute: impl Into<String>) -> Self {
        self.partition_key = attribute.into();
        self
    }

    pub fn with_sort_key(mut self, attribute: impl Into<String>) -> Self {
        self.sort_key = attribute.into();
        self
    }

    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    pub fn with_include_index(mut self, include_index: bool) -> Self {
        self.include_index = include_index;
        self
    }

    /// Replace the id generator, e.g. with a deterministic counter in tests
    /// or a time-ordered scheme in production.
    pub fn with_id_generator(
        mut self,
        generator: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        self.id_generator = Arc::new(generator);
        self
    }

    /// Produce a fresh local id.
    pub fn generate_id(&self) -> String {
        (self.id_generator.as_ref())()
    }
}

impl fmt::Debug for TrellisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrellisConfig")
            .field("table", &self.table)
            .field("delimiter", &self.delimiter)
            .field("partition_key", &self.partition_key)
            .field("sort_key", &self.sort_key)
            .field("id_field", &self.id_field)
            .field("include_index", &self.include_index)
            .finish_non_exhaustive()
    }
}
