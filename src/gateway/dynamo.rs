//! DynamoDB storage backend.
//!
//! Enabled by the `dynamodb` feature. The client inherits HTTP, retry and
//! credential configuration from the ambient SDK config; region, endpoint
//! (e.g. a local emulator) and operation timeout can be overridden here.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use aws_smithy_types::timeout::TimeoutConfig;
use serde_json::Value;

use super::backend::{QueryRequest, RawRecord, RecordKey, StorageBackend};
use super::errors::{StorageError, StorageResult};

/// Connection overrides for the DynamoDB backend.
#[derive(Debug, Clone, Default)]
pub struct DynamoConfig {
    /// AWS region; the SDK default applies when unset.
    pub region: Option<String>,
    /// Endpoint override, e.g. a local DynamoDB emulator.
    pub endpoint: Option<String>,
    /// Operation timeout in milliseconds.
    pub timeout_ms: Option<u64>,
}

/// [`StorageBackend`] implementation over a single DynamoDB table.
#[derive(Clone)]
pub struct DynamoBackend {
    client: Client,
    partition_attribute: String,
    sort_attribute: String,
}

impl std::fmt::Debug for DynamoBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoBackend")
            .field("partition_attribute", &self.partition_attribute)
            .field("sort_attribute", &self.sort_attribute)
            .finish_non_exhaustive()
    }
}

impl DynamoBackend {
    /// Build a backend from the ambient SDK config plus overrides.
    pub fn new(
        sdk_config: &aws_config::SdkConfig,
        config: DynamoConfig,
        partition_attribute: impl Into<String>,
        sort_attribute: impl Into<String>,
    ) -> Self {
        let mut builder = aws_sdk_dynamodb::config::Builder::from(sdk_config);

        if let Some(region) = config.region {
            builder = builder.region(aws_sdk_dynamodb::config::Region::new(region));
        }
        if let Some(endpoint) = config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        if let Some(timeout_ms) = config.timeout_ms {
            let timeout_config = TimeoutConfig::builder()
                .operation_timeout(Duration::from_millis(timeout_ms))
                .build();
            builder = builder.timeout_config(timeout_config);
        }

        Self::from_client(
            Client::from_conf(builder.build()),
            partition_attribute,
            sort_attribute,
        )
    }

    /// Build from a pre-built client, e.g. one shared with other layers or
    /// pointed at a test double.
    pub fn from_client(
        client: Client,
        partition_attribute: impl Into<String>,
        sort_attribute: impl Into<String>,
    ) -> Self {
        Self {
            client,
            partition_attribute: partition_attribute.into(),
            sort_attribute: sort_attribute.into(),
        }
    }

    fn record_to_item(record: &RawRecord) -> HashMap<String, AttributeValue> {
        record
            .iter()
            .map(|(name, value)| (name.clone(), json_to_attribute(value)))
            .collect()
    }

    fn item_to_record(item: &HashMap<String, AttributeValue>) -> RawRecord {
        item.iter()
            .map(|(name, attribute)| (name.clone(), attribute_to_json(attribute)))
            .collect()
    }
}

fn json_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(flag) => AttributeValue::Bool(*flag),
        Value::Number(number) => AttributeValue::N(number.to_string()),
        Value::String(text) => AttributeValue::S(text.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(json_to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(key, item)| (key.clone(), json_to_attribute(item)))
                .collect(),
        ),
    }
}

fn attribute_to_json(attribute: &AttributeValue) -> Value {
    match attribute {
        AttributeValue::S(text) => Value::String(text.clone()),
        AttributeValue::N(number) => number
            .parse::<serde_json::Number>()
            .map(Value::Number)
            .unwrap_or_else(|_| Value::String(number.clone())),
        AttributeValue::Bool(flag) => Value::Bool(*flag),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(items) => Value::Array(items.iter().map(attribute_to_json).collect()),
        AttributeValue::M(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), attribute_to_json(item)))
                .collect(),
        ),
        AttributeValue::Ss(values) => Value::Array(
            values
                .iter()
                .map(|text| Value::String(text.clone()))
                .collect(),
        ),
        AttributeValue::Ns(values) => Value::Array(
            values
                .iter()
                .map(|number| {
                    number
                        .parse::<serde_json::Number>()
                        .map(Value::Number)
                        .unwrap_or_else(|_| Value::String(number.clone()))
                })
                .collect(),
        ),
        _ => Value::Null,
    }
}

#[async_trait]
impl StorageBackend for DynamoBackend {
    async fn put(&self, table: &str, item: RawRecord) -> StorageResult<()> {
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(Self::record_to_item(&item)))
            .send()
            .await
            .map_err(|e| StorageError::transport(format!("DynamoDB PutItem failed: {e}")))?;
        Ok(())
    }

    async fn get(&self, table: &str, key: &RecordKey) -> StorageResult<Option<RawRecord>> {
        let response = self
            .client
            .get_item()
            .table_name(table)
            .key(
                self.partition_attribute.as_str(),
                AttributeValue::S(key.partition_key.clone()),
            )
            .key(
                self.sort_attribute.as_str(),
                AttributeValue::S(key.sort_key.clone()),
            )
            .send()
            .await
            .map_err(|e| StorageError::transport(format!("DynamoDB GetItem failed: {e}")))?;

        Ok(response.item().map(Self::item_to_record))
    }

    async fn delete(&self, table: &str, key: &RecordKey) -> StorageResult<()> {
        self.client
            .delete_item()
            .table_name(table)
            .key(
                self.partition_attribute.as_str(),
                AttributeValue::S(key.partition_key.clone()),
            )
            .key(
                self.sort_attribute.as_str(),
                AttributeValue::S(key.sort_key.clone()),
            )
            .send()
            .await
            .map_err(|e| StorageError::transport(format!("DynamoDB DeleteItem failed: {e}")))?;
        Ok(())
    }

    async fn query(&self, table: &str, request: &QueryRequest) -> StorageResult<Vec<RawRecord>> {
        let values: HashMap<String, AttributeValue> = request
            .expression_attribute_values
            .iter()
            .map(|(placeholder, value)| (placeholder.clone(), AttributeValue::S(value.clone())))
            .collect();

        let response = self
            .client
            .query()
            .table_name(table)
            .key_condition_expression(&request.key_condition_expression)
            .set_expression_attribute_names(Some(request.expression_attribute_names.clone()))
            .set_expression_attribute_values(Some(values))
            .send()
            .await
            .map_err(|e| StorageError::transport(format!("DynamoDB Query failed: {e}")))?;

        Ok(response.items().iter().map(Self::item_to_record).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_round_trips_through_attribute_values() {
        let value = json!({
            "name": "test",
            "count": 3,
            "flag": true,
            "missing": null,
            "tags": ["a", "b"],
            "nested": {"text": "x"}
        });
        let Value::Object(record) = value.clone() else {
            unreachable!()
        };

        let item = DynamoBackend::record_to_item(&record);
        let restored = DynamoBackend::item_to_record(&item);
        assert_eq!(Value::Object(restored), value);
    }

    #[test]
    fn test_unparseable_number_survives_as_string() {
        let attribute = AttributeValue::N("not-a-number".to_string());
        assert_eq!(attribute_to_json(&attribute), json!("not-a-number"));
    }
}
