//! Hook registry and dispatch.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use crate::filter::KeyCondition;
use crate::gateway::RawRecord;
use crate::observe::{Logger, Severity};

/// Lifecycle stages observable through the hook surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookStage {
    PutBefore,
    PutAfter,
    GetBefore,
    GetAfter,
    DeleteBefore,
    DeleteAfter,
    QueryBefore,
    QueryAfter,
}

impl HookStage {
    /// Every stage, in operation order.
    pub const ALL: [HookStage; 8] = [
        HookStage::PutBefore,
        HookStage::PutAfter,
        HookStage::GetBefore,
        HookStage::GetAfter,
        HookStage::DeleteBefore,
        HookStage::DeleteAfter,
        HookStage::QueryBefore,
        HookStage::QueryAfter,
    ];

    /// The `operation:phase` event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HookStage::PutBefore => "put:before",
            HookStage::PutAfter => "put:after",
            HookStage::GetBefore => "get:before",
            HookStage::GetAfter => "get:after",
            HookStage::DeleteBefore => "delete:before",
            HookStage::DeleteAfter => "delete:after",
            HookStage::QueryBefore => "query:before",
            HookStage::QueryAfter => "query:after",
        }
    }

    /// The operation half of the stage name.
    pub fn operation(&self) -> &'static str {
        match self {
            HookStage::PutBefore | HookStage::PutAfter => "put",
            HookStage::GetBefore | HookStage::GetAfter => "get",
            HookStage::DeleteBefore | HookStage::DeleteAfter => "delete",
            HookStage::QueryBefore | HookStage::QueryAfter => "query",
        }
    }

    pub fn is_before(&self) -> bool {
        matches!(
            self,
            HookStage::PutBefore
                | HookStage::GetBefore
                | HookStage::DeleteBefore
                | HookStage::QueryBefore
        )
    }
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a hook observes: the operation's input (before stages) or its raw
/// result (after stages). Borrowed for the duration of the callback.
#[derive(Debug)]
pub enum HookPayload<'a> {
    /// `put:before` input, prior to key-attribute injection.
    Put {
        partition_key: &'a str,
        sort_key: &'a str,
        item: &'a RawRecord,
    },
    /// `get:before` and `delete:before` input.
    Key {
        partition_key: &'a str,
        sort_key: &'a str,
    },
    /// `query:before` input.
    Query {
        partition_key: &'a str,
        condition: Option<&'a KeyCondition>,
    },
    /// `get:after` raw result.
    Record(Option<&'a RawRecord>),
    /// `query:after` raw result.
    Records(&'a [RawRecord]),
    /// `put:after` and `delete:after` completion marker.
    Done,
}

/// Error returned from a hook callback. Isolated at the dispatch boundary
/// and never propagated to the caller of the governing operation.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct HookError(pub String);

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

type HookFn = dyn Fn(&HookPayload<'_>) -> Result<(), HookError> + Send + Sync;

/// Subscription registry for lifecycle hooks.
///
/// Owned by [`Trellis`](crate::Trellis) and shared by reference with the
/// storage gateway at construction.
#[derive(Default)]
pub struct HookRegistry {
    callbacks: RwLock<HashMap<HookStage, Vec<Arc<HookFn>>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a callback to a stage.
    pub fn on<F>(&self, stage: HookStage, callback: F)
    where
        F: Fn(&HookPayload<'_>) -> Result<(), HookError> + Send + Sync + 'static,
    {
        let mut callbacks = match self.callbacks.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        callbacks.entry(stage).or_default().push(Arc::new(callback));
    }

    /// Number of callbacks subscribed to a stage.
    pub fn subscriber_count(&self, stage: HookStage) -> usize {
        let callbacks = match self.callbacks.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        callbacks.get(&stage).map_or(0, Vec::len)
    }

    /// Invoke every callback subscribed to `stage`.
    ///
    /// A callback returning `Err` is logged and swallowed here; the
    /// governing storage operation proceeds regardless.
    pub(crate) fn dispatch(&self, stage: HookStage, payload: &HookPayload<'_>) {
        let subscribed: Vec<Arc<HookFn>> = {
            let callbacks = match self.callbacks.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            match callbacks.get(&stage) {
                Some(list) => list.clone(),
                None => return,
            }
        };

        for callback in subscribed {
            if let Err(error) = (callback.as_ref())(payload) {
                Logger::log_stderr(
                    Severity::Warn,
                    "hook_failed",
                    &[("stage", stage.as_str()), ("error", &error.to_string())],
                );
            }
        }
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry").finish_non_exhaustive()
    }
}
