// src/exec/logs.rs

use anyhow::Result;

use crate::model::LogRecord;

/// Restartable-by-polling view of one execution's log stream.
///
/// Each call to [`drain`](LogIterator::drain) returns every record that has
/// become available since the previous call, in emission order, and must
/// return promptly (an empty batch when nothing is pending). Once the
/// execution is terminal and everything has been drained, further calls
/// return empty batches.
pub trait LogIterator: Send {
    fn drain(&mut self) -> Result<Vec<LogRecord>>;
}
