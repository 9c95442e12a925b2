//! In-memory storage backend.
//!
//! Interprets the key-condition grammar this crate emits: a partition-key
//! equality clause, optionally followed by one sort-key comparison
//! (`=`, `<`, `<=`, `>`, `>=`, `BETWEEN`, `begins_with`). Records within a
//! partition are held in a BTree keyed by sort key, so queries come back
//! in ascending sort-key order like the real store's native ordering.
//!
//! This is both the test double and an embedded backend for code that
//! wants the modeling layer without a network.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::backend::{QueryRequest, RawRecord, RecordKey, StorageBackend};
use super::errors::{StorageError, StorageResult};

type Partition = BTreeMap<String, RawRecord>;
type Table = HashMap<String, Partition>;

/// Thread-safe in-memory implementation of [`StorageBackend`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    partition_attribute: String,
    sort_attribute: String,
    tables: Mutex<HashMap<String, Table>>,
}

impl MemoryBackend {
    /// A backend that indexes items by the given key attribute names, the
    /// way a real table's key schema would.
    pub fn new(partition_attribute: impl Into<String>, sort_attribute: impl Into<String>) -> Self {
        Self {
            partition_attribute: partition_attribute.into(),
            sort_attribute: sort_attribute.into(),
            tables: Mutex::new(HashMap::new()),
        }
    }

    fn key_string(&self, item: &RawRecord, attribute: &str) -> StorageResult<String> {
        match item.get(attribute) {
            Some(Value::String(value)) => Ok(value.clone()),
            Some(other) => Err(StorageError::request(format!(
                "key attribute {attribute:?} must be a string, got {other}"
            ))),
            None => Err(StorageError::request(format!(
                "item is missing key attribute {attribute:?}"
            ))),
        }
    }

    fn with_tables<R>(&self, f: impl FnOnce(&mut HashMap<String, Table>) -> R) -> R {
        let mut tables = match self.tables.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut tables)
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn put(&self, table: &str, item: RawRecord) -> StorageResult<()> {
        let partition_key = self.key_string(&item, &self.partition_attribute)?;
        let sort_key = self.key_string(&item, &self.sort_attribute)?;
        self.with_tables(|tables| {
            tables
                .entry(table.to_string())
                .or_default()
                .entry(partition_key)
                .or_default()
                .insert(sort_key, item);
        });
        Ok(())
    }

    async fn get(&self, table: &str, key: &RecordKey) -> StorageResult<Option<RawRecord>> {
        Ok(self.with_tables(|tables| {
            tables
                .get(table)
                .and_then(|t| t.get(&key.partition_key))
                .and_then(|partition| partition.get(&key.sort_key))
                .cloned()
        }))
    }

    async fn delete(&self, table: &str, key: &RecordKey) -> StorageResult<()> {
        self.with_tables(|tables| {
            if let Some(partition) = tables
                .get_mut(table)
                .and_then(|t| t.get_mut(&key.partition_key))
            {
                partition.remove(&key.sort_key);
            }
        });
        Ok(())
    }

    async fn query(&self, table: &str, request: &QueryRequest) -> StorageResult<Vec<RawRecord>> {
        let condition = ParsedCondition::parse(
            request,
            &self.partition_attribute,
            &self.sort_attribute,
        )?;

        Ok(self.with_tables(|tables| {
            let Some(partition) = tables
                .get(table)
                .and_then(|t| t.get(&condition.partition_value))
            else {
                return Vec::new();
            };

            partition
                .iter()
                .filter(|(sort_key, _)| {
                    condition
                        .sort
                        .as_ref()
                        .map_or(true, |predicate| predicate.matches(sort_key))
                })
                .map(|(_, record)| record.clone())
                .collect()
        }))
    }
}

/// One sort-key comparison, decoded from the expression.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SortPredicate {
    Equal(String),
    LessThan(String),
    LessOrEqual(String),
    GreaterThan(String),
    GreaterOrEqual(String),
    Between(String, String),
    BeginsWith(String),
}

impl SortPredicate {
    fn matches(&self, sort_key: &str) -> bool {
        match self {
            Self::Equal(value) => sort_key == value,
            Self::LessThan(value) => sort_key < value.as_str(),
            Self::LessOrEqual(value) => sort_key <= value.as_str(),
            Self::GreaterThan(value) => sort_key > value.as_str(),
            Self::GreaterOrEqual(value) => sort_key >= value.as_str(),
            Self::Between(min, max) => sort_key >= min.as_str() && sort_key <= max.as_str(),
            Self::BeginsWith(prefix) => sort_key.starts_with(prefix.as_str()),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct ParsedCondition {
    partition_value: String,
    sort: Option<SortPredicate>,
}

impl ParsedCondition {
    fn parse(
        request: &QueryRequest,
        partition_attribute: &str,
        sort_attribute: &str,
    ) -> StorageResult<Self> {
        let expression = request.key_condition_expression.trim();
        let mut clauses = expression.split(" and ");

        let partition_clause = clauses.next().unwrap_or_default();
        let partition_value =
            parse_partition_clause(partition_clause, request, partition_attribute)?;

        let sort = match clauses.next() {
            Some(clause) => Some(parse_sort_clause(clause.trim(), request, sort_attribute)?),
            None => None,
        };

        if clauses.next().is_some() {
            return Err(StorageError::request(format!(
                "too many clauses in key condition {expression:?}"
            )));
        }

        Ok(Self {
            partition_value,
            sort,
        })
    }
}

fn resolve_name<'a>(token: &str, request: &'a QueryRequest) -> StorageResult<&'a str> {
    request
        .expression_attribute_names
        .get(token)
        .map(String::as_str)
        .ok_or_else(|| StorageError::request(format!("unresolved attribute name {token:?}")))
}

fn resolve_value(token: &str, request: &QueryRequest) -> StorageResult<String> {
    request
        .expression_attribute_values
        .get(token)
        .cloned()
        .ok_or_else(|| StorageError::request(format!("unresolved attribute value {token:?}")))
}

fn parse_partition_clause(
    clause: &str,
    request: &QueryRequest,
    partition_attribute: &str,
) -> StorageResult<String> {
    let tokens: Vec<&str> = clause.split_whitespace().collect();
    let &[name, "=", value] = tokens.as_slice() else {
        return Err(StorageError::request(format!(
            "expected partition equality, got {clause:?}"
        )));
    };

    let attribute = resolve_name(name, request)?;
    if attribute != partition_attribute {
        return Err(StorageError::request(format!(
            "key condition must target partition attribute {partition_attribute:?}, got {attribute:?}"
        )));
    }

    resolve_value(value, request)
}

fn parse_sort_clause(
    clause: &str,
    request: &QueryRequest,
    sort_attribute: &str,
) -> StorageResult<SortPredicate> {
    if let Some(arguments) = clause
        .strip_prefix("begins_with")
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix('('))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let mut parts = arguments.split(',').map(str::trim);
        let (Some(name), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(StorageError::request(format!(
                "expected begins_with(name, value), got {clause:?}"
            )));
        };
        check_sort_attribute(resolve_name(name, request)?, sort_attribute)?;
        return Ok(SortPredicate::BeginsWith(resolve_value(value, request)?));
    }

    let tokens: Vec<&str> = clause.split_whitespace().collect();
    match tokens.as_slice() {
        &[name, operator, value] => {
            check_sort_attribute(resolve_name(name, request)?, sort_attribute)?;
            let value = resolve_value(value, request)?;
            match operator {
                "=" => Ok(SortPredicate::Equal(value)),
                "<" => Ok(SortPredicate::LessThan(value)),
                "<=" => Ok(SortPredicate::LessOrEqual(value)),
                ">" => Ok(SortPredicate::GreaterThan(value)),
                ">=" => Ok(SortPredicate::GreaterOrEqual(value)),
                other => Err(StorageError::request(format!(
                    "unsupported sort-key operator {other:?}"
                ))),
            }
        }
        &[name, "BETWEEN", min, "AND", max] => {
            check_sort_attribute(resolve_name(name, request)?, sort_attribute)?;
            Ok(SortPredicate::Between(
                resolve_value(min, request)?,
                resolve_value(max, request)?,
            ))
        }
        _ => Err(StorageError::request(format!(
            "unsupported sort-key clause {clause:?}"
        ))),
    }
}

fn check_sort_attribute(attribute: &str, sort_attribute: &str) -> StorageResult<()> {
    if attribute == sort_attribute {
        Ok(())
    } else {
        Err(StorageError::request(format!(
            "sort-key clause must target attribute {sort_attribute:?}, got {attribute:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(expression: &str, values: &[(&str, &str)]) -> QueryRequest {
        QueryRequest {
            key_condition_expression: expression.to_string(),
            expression_attribute_names: HashMap::from([
                ("#PK".to_string(), "PK".to_string()),
                ("#SK".to_string(), "SK".to_string()),
            ]),
            expression_attribute_values: values
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn record(pk: &str, sk: &str) -> RawRecord {
        match json!({"PK": pk, "SK": sk, "text": "x"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_parse_partition_only() {
        let parsed =
            ParsedCondition::parse(&request("#PK = :PK", &[(":PK", "POSTS")]), "PK", "SK").unwrap();
        assert_eq!(parsed.partition_value, "POSTS");
        assert_eq!(parsed.sort, None);
    }

    #[test]
    fn test_parse_each_sort_operator() {
        let cases = [
            ("#PK = :PK and #SK = :SK", SortPredicate::Equal("5".into())),
            ("#PK = :PK and #SK < :SK", SortPredicate::LessThan("5".into())),
            ("#PK = :PK and #SK <= :SK", SortPredicate::LessOrEqual("5".into())),
            ("#PK = :PK and #SK > :SK", SortPredicate::GreaterThan("5".into())),
            ("#PK = :PK and #SK >= :SK", SortPredicate::GreaterOrEqual("5".into())),
            (
                "#PK = :PK and begins_with(#SK, :SK)",
                SortPredicate::BeginsWith("5".into()),
            ),
        ];
        for (expression, expected) in cases {
            let parsed = ParsedCondition::parse(
                &request(expression, &[(":PK", "P"), (":SK", "5")]),
                "PK",
                "SK",
            )
            .unwrap();
            assert_eq!(parsed.sort, Some(expected), "{expression}");
        }
    }

    #[test]
    fn test_parse_between_keeps_bound_order() {
        let parsed = ParsedCondition::parse(
            &request(
                "#PK = :PK and #SK BETWEEN :SKMIN AND :SKMAX",
                &[(":PK", "P"), (":SKMIN", "10"), (":SKMAX", "20")],
            ),
            "PK",
            "SK",
        )
        .unwrap();
        assert_eq!(parsed.sort, Some(SortPredicate::Between("10".into(), "20".into())));
    }

    #[test]
    fn test_parse_rejects_unknown_placeholder() {
        let err =
            ParsedCondition::parse(&request("#PK = :MISSING", &[(":PK", "P")]), "PK", "SK")
                .unwrap_err();
        assert!(matches!(err, StorageError::Request(_)));
    }

    #[test]
    fn test_parse_rejects_wrong_partition_attribute() {
        let err =
            ParsedCondition::parse(&request("#SK = :PK", &[(":PK", "P")]), "PK", "SK").unwrap_err();
        assert!(matches!(err, StorageError::Request(_)));
    }

    #[test]
    fn test_between_matching_is_inclusive() {
        let predicate = SortPredicate::Between("10".into(), "20".into());
        assert!(predicate.matches("10"));
        assert!(predicate.matches("15"));
        assert!(predicate.matches("20"));
        assert!(!predicate.matches("21"));
    }

    #[tokio::test]
    async fn test_query_returns_ascending_sort_order() {
        let backend = MemoryBackend::new("PK", "SK");
        for sk in ["b", "c", "a"] {
            backend.put("t", record("P", sk)).await.unwrap();
        }

        let records = backend
            .query("t", &request("#PK = :PK", &[(":PK", "P")]))
            .await
            .unwrap();
        let sort_keys: Vec<&str> = records
            .iter()
            .map(|r| r["SK"].as_str().unwrap())
            .collect();
        assert_eq!(sort_keys, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_put_overwrites_same_key() {
        let backend = MemoryBackend::new("PK", "SK");
        backend.put("t", record("P", "1")).await.unwrap();
        let mut updated = record("P", "1");
        updated.insert("text".to_string(), json!("y"));
        backend.put("t", updated).await.unwrap();

        let stored = backend
            .get("t", &RecordKey::new("P", "1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored["text"], "y");
    }

    #[tokio::test]
    async fn test_put_requires_key_attributes() {
        let backend = MemoryBackend::new("PK", "SK");
        let mut item = RawRecord::new();
        item.insert("text".to_string(), json!("x"));
        let err = backend.put("t", item).await.unwrap_err();
        assert!(matches!(err, StorageError::Request(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_record_is_noop() {
        let backend = MemoryBackend::new("PK", "SK");
        backend
            .delete("t", &RecordKey::new("P", "missing"))
            .await
            .unwrap();
    }
}
