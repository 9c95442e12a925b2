//! Lifecycle hooks
//!
//! Every storage operation dispatches a `*:before` hook with its input and
//! an `*:after` hook with its raw result. Hooks are side-effecting
//! observers only: they never transform the request or response, and a
//! failing hook never fails the governing operation.
//!
//! The registry is an explicit object owned by the root factory and shared
//! with the storage gateway, never a process-wide singleton.

mod plugins;
mod registry;

pub use plugins::{OperationLogger, OperationTimer, Plugin};
pub use registry::{HookError, HookPayload, HookRegistry, HookStage};
