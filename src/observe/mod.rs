//! Structured logging
//!
//! Used by hook-failure isolation and by the shipped logging plugin. Logs
//! are synchronous, unbuffered JSON lines with deterministic key ordering.

mod logger;

pub use logger::{Logger, Severity};
