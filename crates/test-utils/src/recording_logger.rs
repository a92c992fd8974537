use std::sync::{Arc, Mutex};

use nodebridge::sink::{CtxLogger, SinkError, SinkResult};
use nodebridge::types::Severity;

/// Logger sink that records every call in order.
///
/// Optionally rejects the call with a given (1-based) index, to simulate a
/// logging backend going away.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    calls: Arc<Mutex<Vec<(Severity, String)>>>,
    fail_on_call: Option<usize>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on_call(n: usize) -> Self {
        Self {
            calls: Arc::default(),
            fail_on_call: Some(n),
        }
    }

    pub fn calls(&self) -> Vec<(Severity, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.calls().into_iter().map(|(_, m)| m).collect()
    }

    fn record(&self, severity: Severity, msg: &str) -> SinkResult {
        let mut calls = self.calls.lock().unwrap();
        if self.fail_on_call == Some(calls.len() + 1) {
            return Err(SinkError::new(severity, "logging backend unavailable"));
        }
        calls.push((severity, msg.to_string()));
        Ok(())
    }
}

impl CtxLogger for RecordingLogger {
    fn debug(&self, msg: &str) -> SinkResult {
        self.record(Severity::Debug, msg)
    }

    fn info(&self, msg: &str) -> SinkResult {
        self.record(Severity::Info, msg)
    }

    fn warning(&self, msg: &str) -> SinkResult {
        self.record(Severity::Warning, msg)
    }

    fn error(&self, msg: &str) -> SinkResult {
        self.record(Severity::Error, msg)
    }

    fn critical(&self, msg: &str) -> SinkResult {
        self.record(Severity::Critical, msg)
    }
}
