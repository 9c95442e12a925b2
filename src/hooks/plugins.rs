//! Shipped hook plugins: structured operation logging and timing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use super::registry::{HookPayload, HookRegistry, HookStage};
use crate::observe::{Logger, Severity};

/// A bundle of hook subscriptions installed as one unit.
pub trait Plugin {
    fn install(&self, hooks: &HookRegistry);
}

/// Logs every storage operation as a structured line, input on `before`
/// stages and a result summary on `after` stages.
#[derive(Debug, Default)]
pub struct OperationLogger;

impl OperationLogger {
    pub fn new() -> Self {
        Self
    }

    fn describe(payload: &HookPayload<'_>) -> Vec<(&'static str, String)> {
        match payload {
            HookPayload::Put {
                partition_key,
                sort_key,
                item,
            } => vec![
                ("partition_key", (*partition_key).to_string()),
                ("sort_key", (*sort_key).to_string()),
                ("fields", item.len().to_string()),
            ],
            HookPayload::Key {
                partition_key,
                sort_key,
            } => vec![
                ("partition_key", (*partition_key).to_string()),
                ("sort_key", (*sort_key).to_string()),
            ],
            HookPayload::Query {
                partition_key,
                condition,
            } => {
                let mut fields = vec![("partition_key", (*partition_key).to_string())];
                if let Some(condition) = condition {
                    fields.push(("condition", condition.expression.clone()));
                }
                fields
            }
            HookPayload::Record(record) => {
                vec![("found", record.is_some().to_string())]
            }
            HookPayload::Records(records) => vec![("count", records.len().to_string())],
            HookPayload::Done => Vec::new(),
        }
    }
}

impl Plugin for OperationLogger {
    fn install(&self, hooks: &HookRegistry) {
        for stage in HookStage::ALL {
            hooks.on(stage, move |payload| {
                let described = Self::describe(payload);
                let fields: Vec<(&str, &str)> = described
                    .iter()
                    .map(|(key, value)| (*key, value.as_str()))
                    .collect();
                Logger::log(Severity::Info, stage.as_str(), &fields);
                Ok(())
            });
        }
    }
}

/// Measures wall-clock duration per operation and logs it on the `after`
/// stage. Overlapping calls to the same operation on one instance share a
/// slot, so attach a fresh instance per pipeline when that matters.
#[derive(Debug, Default)]
pub struct OperationTimer {
    started: Arc<Mutex<HashMap<&'static str, Instant>>>,
}

impl OperationTimer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for OperationTimer {
    fn install(&self, hooks: &HookRegistry) {
        for stage in HookStage::ALL {
            let started = Arc::clone(&self.started);
            hooks.on(stage, move |_| {
                let mut started = match started.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                if stage.is_before() {
                    started.insert(stage.operation(), Instant::now());
                } else if let Some(begun) = started.remove(stage.operation()) {
                    let elapsed_ms = begun.elapsed().as_millis().to_string();
                    Logger::log(
                        Severity::Info,
                        "operation_timed",
                        &[
                            ("operation", stage.operation()),
                            ("elapsed_ms", &elapsed_ms),
                        ],
                    );
                }
                Ok(())
            });
        }
    }
}
