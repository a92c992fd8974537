// src/model/log_record.rs

use std::fmt;

use crate::errors::{BridgeError, Result};
use crate::types::Severity;

/// One line of execution output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: Severity,
    pub message: String,
    pub traceback: Option<String>,
}

impl LogRecord {
    pub fn new(level: Severity, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            traceback: None,
        }
    }

    /// Build a record from the textual level the inner orchestrator stores.
    ///
    /// Unknown levels are rejected here so that forwarding never has to
    /// guess which sink method to call.
    pub fn parse(level: &str, message: impl Into<String>) -> Result<Self> {
        let level = level
            .parse::<Severity>()
            .map_err(|e| BridgeError::Collaborator(anyhow::anyhow!(e)))?;
        Ok(Self::new(level, message))
    }

    pub fn with_traceback(mut self, traceback: impl Into<String>) -> Self {
        let traceback = traceback.into();
        self.traceback = if traceback.is_empty() {
            None
        } else {
            Some(traceback)
        };
        self
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
