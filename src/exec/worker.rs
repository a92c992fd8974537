// src/exec/worker.rs

//! The background half of a bridge invocation.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, warn};

use crate::model::ExecutionId;

use super::runner::WorkflowJob;

/// One blocking workflow job running on Tokio's blocking pool.
///
/// The job's own result never reaches the caller of the bridge; it is only
/// logged when the worker is joined.
pub(crate) struct BackgroundWorker {
    execution_id: ExecutionId,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl BackgroundWorker {
    pub(crate) fn spawn(execution_id: ExecutionId, job: WorkflowJob) -> Self {
        debug!(execution_id = %execution_id, "dispatching workflow job");
        let handle = tokio::task::spawn_blocking(job);
        Self {
            execution_id,
            handle,
        }
    }

    /// Wait up to `interval` for the job to finish.
    ///
    /// Returns `true` once the job has been joined. Must not be called again
    /// after it returned `true`.
    pub(crate) async fn join_within(&mut self, interval: Duration) -> bool {
        match timeout(interval, &mut self.handle).await {
            Ok(joined) => {
                self.report(joined);
                true
            }
            Err(_elapsed) => false,
        }
    }

    fn report(&self, joined: Result<anyhow::Result<()>, tokio::task::JoinError>) {
        match joined {
            Ok(Ok(())) => {
                debug!(execution_id = %self.execution_id, "workflow job returned");
            }
            Ok(Err(err)) => {
                warn!(
                    execution_id = %self.execution_id,
                    error = %err,
                    "workflow job returned an error; outcome decided by execution status"
                );
            }
            Err(join_err) if join_err.is_panic() => {
                error!(
                    execution_id = %self.execution_id,
                    "workflow job panicked; outcome decided by execution status"
                );
            }
            Err(join_err) => {
                error!(
                    execution_id = %self.execution_id,
                    error = %join_err,
                    "workflow job did not complete"
                );
            }
        }
    }
}
