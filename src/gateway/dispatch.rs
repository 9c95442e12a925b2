//! Hook-wrapped dispatch over the storage boundary.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::backend::{QueryRequest, RawRecord, RecordKey, StorageBackend};
use super::errors::StorageResult;
use crate::config::TrellisConfig;
use crate::filter::SortKeyFilter;
use crate::hooks::{HookPayload, HookRegistry, HookStage};

/// The sole component touching the storage boundary.
///
/// Every operation dispatches its `before` hook with the caller's input,
/// runs against the backend, then dispatches its `after` hook with the raw
/// result. Key attributes are injected into every stored item here, and a
/// caller-supplied filter fragment is merged into the base
/// partition-equality query.
#[derive(Clone)]
pub struct StorageGateway {
    backend: Arc<dyn StorageBackend>,
    config: TrellisConfig,
    hooks: Arc<HookRegistry>,
}

impl StorageGateway {
    pub(crate) fn new(
        backend: Arc<dyn StorageBackend>,
        config: TrellisConfig,
        hooks: Arc<HookRegistry>,
    ) -> Self {
        Self {
            backend,
            config,
            hooks,
        }
    }

    /// Upsert an item. The key attributes derived from the handle's path
    /// overwrite any caller-supplied fields of the same names.
    pub async fn put(
        &self,
        partition_key: &str,
        sort_key: &str,
        mut item: RawRecord,
    ) -> StorageResult<()> {
        self.hooks.dispatch(
            HookStage::PutBefore,
            &HookPayload::Put {
                partition_key,
                sort_key,
                item: &item,
            },
        );

        item.insert(
            self.config.partition_key.clone(),
            Value::String(partition_key.to_string()),
        );
        item.insert(
            self.config.sort_key.clone(),
            Value::String(sort_key.to_string()),
        );
        self.backend.put(&self.config.table, item).await?;

        self.hooks.dispatch(HookStage::PutAfter, &HookPayload::Done);
        Ok(())
    }

    /// Fetch one record; `None` when absent.
    pub async fn get(
        &self,
        partition_key: &str,
        sort_key: &str,
    ) -> StorageResult<Option<RawRecord>> {
        self.hooks.dispatch(
            HookStage::GetBefore,
            &HookPayload::Key {
                partition_key,
                sort_key,
            },
        );

        let key = RecordKey::new(partition_key, sort_key);
        let record = self.backend.get(&self.config.table, &key).await?;

        self.hooks
            .dispatch(HookStage::GetAfter, &HookPayload::Record(record.as_ref()));
        Ok(record)
    }

    /// Remove one record; a no-op when absent.
    pub async fn delete(&self, partition_key: &str, sort_key: &str) -> StorageResult<()> {
        self.hooks.dispatch(
            HookStage::DeleteBefore,
            &HookPayload::Key {
                partition_key,
                sort_key,
            },
        );

        let key = RecordKey::new(partition_key, sort_key);
        self.backend.delete(&self.config.table, &key).await?;

        self.hooks
            .dispatch(HookStage::DeleteAfter, &HookPayload::Done);
        Ok(())
    }

    /// Query a partition, optionally narrowed by a sort-key filter. The
    /// filter fragment's expression and maps merge into the base
    /// partition-equality condition.
    pub async fn query(
        &self,
        partition_key: &str,
        filter: Option<&SortKeyFilter>,
    ) -> StorageResult<Vec<RawRecord>> {
        let condition = filter.map(|f| f.key_condition(&self.config.sort_key));

        self.hooks.dispatch(
            HookStage::QueryBefore,
            &HookPayload::Query {
                partition_key,
                condition: condition.as_ref(),
            },
        );

        let mut expression = "#PK = :PK".to_string();
        let mut names = HashMap::from([("#PK".to_string(), self.config.partition_key.clone())]);
        let mut values = HashMap::from([(":PK".to_string(), partition_key.to_string())]);
        if let Some(condition) = &condition {
            expression.push_str(" and ");
            expression.push_str(&condition.expression);
            names.extend(condition.names.clone());
            values.extend(condition.values.clone());
        }

        let request = QueryRequest {
            key_condition_expression: expression,
            expression_attribute_names: names,
            expression_attribute_values: values,
        };
        let records = self.backend.query(&self.config.table, &request).await?;

        self.hooks
            .dispatch(HookStage::QueryAfter, &HookPayload::Records(&records));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryBackend;
    use serde_json::json;

    fn gateway() -> StorageGateway {
        let config = TrellisConfig::new("t");
        let backend = MemoryBackend::new(config.partition_key.as_str(), config.sort_key.as_str());
        StorageGateway::new(Arc::new(backend), config, Arc::new(HookRegistry::new()))
    }

    fn item(fields: Value) -> RawRecord {
        match fields {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_put_injects_key_attributes_over_caller_fields() {
        let gateway = gateway();
        gateway
            .put(
                "POSTS",
                "1",
                item(json!({"PK": "spoofed", "SK": "spoofed", "text": "x"})),
            )
            .await
            .unwrap();

        let stored = gateway.get("POSTS", "1").await.unwrap().unwrap();
        assert_eq!(stored["PK"], "POSTS");
        assert_eq!(stored["SK"], "1");
        assert_eq!(stored["text"], "x");
    }

    #[tokio::test]
    async fn test_query_merges_filter_into_base_condition() {
        let gateway = gateway();
        for sk in ["PUBLISHED#0", "PUBLISHED#1", "UNPUBLISHED#0"] {
            gateway
                .put("POSTS", sk, item(json!({"text": "x"})))
                .await
                .unwrap();
        }

        let filter = SortKeyFilter::begins_with("PUBLISHED");
        let records = gateway.query("POSTS", Some(&filter)).await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records
            .iter()
            .all(|r| r["SK"].as_str().unwrap().starts_with("PUBLISHED")));
    }

    #[tokio::test]
    async fn test_before_and_after_hooks_fire_around_get() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let hooks = Arc::new(HookRegistry::new());
        let before = Arc::new(AtomicUsize::new(0));
        let after = Arc::new(AtomicUsize::new(0));
        {
            let before = Arc::clone(&before);
            hooks.on(HookStage::GetBefore, move |_| {
                before.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
            let after = Arc::clone(&after);
            hooks.on(HookStage::GetAfter, move |_| {
                after.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }

        let config = TrellisConfig::new("t");
        let backend = MemoryBackend::new(config.partition_key.as_str(), config.sort_key.as_str());
        let gateway = StorageGateway::new(Arc::new(backend), config, hooks);

        gateway.get("POSTS", "1").await.unwrap();
        assert_eq!(before.load(Ordering::SeqCst), 1);
        assert_eq!(after.load(Ordering::SeqCst), 1);
    }
}
