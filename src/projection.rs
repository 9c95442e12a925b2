//! Response projection.
//!
//! Raw stored records never reach callers directly. Projection strips the
//! two key attributes and re-exposes the record's identity under the
//! configured id field: the persisted local id when the record carries
//! one, otherwise the sort key's raw value (the two differ when an
//! id-prefix namespaces the sort key).

use crate::config::TrellisConfig;
use crate::gateway::RawRecord;

/// Project a raw stored record into its caller-facing shape.
///
/// Deterministic and total over any record containing the configured key
/// attributes. With `include_index` set, the raw key attributes are
/// retained alongside the id field under their original names.
pub fn project(mut record: RawRecord, config: &TrellisConfig) -> RawRecord {
    let partition_value = record.remove(&config.partition_key);
    let sort_value = record.remove(&config.sort_key);

    if !record.contains_key(&config.id_field) {
        if let Some(sort_value) = sort_value.clone() {
            record.insert(config.id_field.clone(), sort_value);
        }
    }

    if config.include_index {
        if let Some(partition_value) = partition_value {
            record.insert(config.partition_key.clone(), partition_value);
        }
        if let Some(sort_value) = sort_value {
            record.insert(config.sort_key.clone(), sort_value);
        }
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn record(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_removes_key_attributes_and_adds_id() {
        let projected = project(
            record(json!({"PK": "myCollection", "SK": "myDocument", "name": "John Doe", "age": 30})),
            &TrellisConfig::new("t"),
        );
        assert_eq!(
            Value::Object(projected),
            json!({"name": "John Doe", "age": 30, "id": "myDocument"})
        );
    }

    #[test]
    fn test_record_without_extra_fields() {
        let projected = project(
            record(json!({"PK": "myCollection", "SK": "myDocument"})),
            &TrellisConfig::new("t"),
        );
        assert_eq!(Value::Object(projected), json!({"id": "myDocument"}));
    }

    #[test]
    fn test_persisted_local_id_wins_over_sort_key() {
        let projected = project(
            record(json!({"PK": "POSTS#1#COMMENTS", "SK": "PUBLISHED#42", "id": "42"})),
            &TrellisConfig::new("t"),
        );
        assert_eq!(projected["id"], "42");
        assert!(!projected.contains_key("SK"));
    }

    #[test]
    fn test_include_index_retains_raw_keys() {
        let config = TrellisConfig::new("t").with_include_index(true);
        let projected = project(
            record(json!({"PK": "P", "SK": "S", "name": "x"})),
            &config,
        );
        assert_eq!(
            Value::Object(projected),
            json!({"name": "x", "id": "S", "PK": "P", "SK": "S"})
        );
    }

    #[test]
    fn test_custom_attribute_names() {
        let config = TrellisConfig::new("t")
            .with_partition_key("customPK")
            .with_sort_key("customSK")
            .with_id_field("customID");
        let projected = project(
            record(json!({"customPK": "P", "customSK": "S", "name": "x"})),
            &config,
        );
        assert_eq!(
            Value::Object(projected),
            json!({"name": "x", "customID": "S"})
        );
    }
}
