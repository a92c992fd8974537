// src/sink.rs

//! The host orchestrator's logging channel (`ctx_logger`).
//!
//! Every drained log record ends up in exactly one of the level-named
//! methods below. [`CtxLogger::log`] is the dispatch table from
//! [`Severity`] to method; implementors only provide the per-level methods.

use std::fmt::Debug;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::types::Severity;

/// Failure reported by a logger sink (e.g. the logging backend is gone).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{severity} sink rejected message: {reason}")]
pub struct SinkError {
    pub severity: Severity,
    pub reason: String,
}

impl SinkError {
    pub fn new(severity: Severity, reason: impl Into<String>) -> Self {
        Self {
            severity,
            reason: reason.into(),
        }
    }
}

pub type SinkResult = Result<(), SinkError>;

/// Logger sink with one method per severity name.
pub trait CtxLogger: Send + Sync + Debug {
    fn debug(&self, msg: &str) -> SinkResult;
    fn info(&self, msg: &str) -> SinkResult;
    fn warning(&self, msg: &str) -> SinkResult;
    fn error(&self, msg: &str) -> SinkResult;
    fn critical(&self, msg: &str) -> SinkResult;

    fn log(&self, severity: Severity, msg: &str) -> SinkResult {
        match severity {
            Severity::Debug => self.debug(msg),
            Severity::Info => self.info(msg),
            Severity::Warning => self.warning(msg),
            Severity::Error => self.error(msg),
            Severity::Critical => self.critical(msg),
        }
    }
}

/// Sink that re-emits every message as a `tracing` event.
///
/// `tracing` has no level above `ERROR`, so `critical` is logged at `ERROR`
/// with `critical = true`.
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    node: Option<String>,
}

impl TracingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag every event with the host node instance it belongs to.
    pub fn for_node(node: impl Into<String>) -> Self {
        Self {
            node: Some(node.into()),
        }
    }

    fn node(&self) -> &str {
        self.node.as_deref().unwrap_or("-")
    }
}

impl CtxLogger for TracingLogger {
    fn debug(&self, msg: &str) -> SinkResult {
        debug!(target: "nodebridge::ctx", node = %self.node(), "{}", msg);
        Ok(())
    }

    fn info(&self, msg: &str) -> SinkResult {
        info!(target: "nodebridge::ctx", node = %self.node(), "{}", msg);
        Ok(())
    }

    fn warning(&self, msg: &str) -> SinkResult {
        warn!(target: "nodebridge::ctx", node = %self.node(), "{}", msg);
        Ok(())
    }

    fn error(&self, msg: &str) -> SinkResult {
        error!(target: "nodebridge::ctx", node = %self.node(), "{}", msg);
        Ok(())
    }

    fn critical(&self, msg: &str) -> SinkResult {
        error!(target: "nodebridge::ctx", node = %self.node(), critical = true, "{}", msg);
        Ok(())
    }
}
