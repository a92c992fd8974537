// src/exec/bridge.rs

//! Execution bridge: run one workflow in the background while streaming its
//! log into the host's `ctx_logger`, then turn the terminal status into
//! `Ok(())` or a [`WorkflowError`].
//!
//! One call is one workflow run:
//!
//! ```text
//! Dispatched -> (Polling <-> Draining)* -> BackgroundDone -> FinalDrain
//!            -> Succeeded | Failed
//! ```
//!
//! Polling is a join-with-timeout on the worker, so a finished workflow is
//! noticed immediately instead of after a full interval. The final drain
//! always happens after the join and before the status is read; it picks up
//! records appended while the worker was finishing.

use std::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::env::Environment;
use crate::errors::{Result, WorkflowError};
use crate::model::{ExecutionHandle, ServiceOutputs};
use crate::sink::CtxLogger;
use crate::types::ExecutionStatus;

use super::logs::LogIterator;
use super::runner::{WorkflowRequest, WorkflowRunner};
use super::worker::BackgroundWorker;

pub const INSTALL_WORKFLOW: &str = "install";
pub const UNINSTALL_WORKFLOW: &str = "uninstall";

/// Smallest poll interval the bridge will use.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeOptions {
    /// Upper bound on how long a record can sit in the iterator before it
    /// is forwarded while the workflow is running.
    ///
    /// Values below [`MIN_POLL_INTERVAL`] are raised to it by
    /// [`ExecutionBridge::new`].
    pub poll_interval: Duration,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Dispatched,
    Draining,
    BackgroundDone,
    FinalDrain,
    Succeeded,
    Failed,
}

pub struct ExecutionBridge<'a> {
    env: &'a Environment,
    runner: &'a dyn WorkflowRunner,
    options: BridgeOptions,
}

impl<'a> ExecutionBridge<'a> {
    pub fn new(
        env: &'a Environment,
        runner: &'a dyn WorkflowRunner,
        mut options: BridgeOptions,
    ) -> Self {
        if options.poll_interval < MIN_POLL_INTERVAL {
            warn!(
                requested = ?options.poll_interval,
                minimum = ?MIN_POLL_INTERVAL,
                "poll interval too small; using minimum"
            );
            options.poll_interval = MIN_POLL_INTERVAL;
        }
        Self {
            env,
            runner,
            options,
        }
    }

    /// Options in effect, after clamping.
    pub fn options(&self) -> BridgeOptions {
        self.options
    }

    /// Run `workflow_name` against the environment's service.
    ///
    /// Collaborator errors (missing service, runner, log iterator) and sink
    /// errors are returned as-is. If the sink fails mid-stream the worker is
    /// left running detached; there is no way to cancel it from here.
    pub async fn execute(&self, workflow_name: &str) -> Result<()> {
        let service = self.env.service()?;
        info!(
            workflow = workflow_name,
            service = %service.name,
            service_id = %service.id,
            "starting workflow"
        );

        let request = WorkflowRequest::from_environment(self.env, service, workflow_name);
        let prepared = self.runner.prepare(request)?;
        let execution = prepared.execution.clone();
        let mut logs = self.env.model_storage().log_iterator(execution.id())?;

        let mut worker = BackgroundWorker::spawn(execution.id().clone(), prepared.job);
        self.enter(&execution, Phase::Dispatched);

        let logger = self.env.ctx_logger().as_ref();
        let mut forwarded = 0usize;
        loop {
            forwarded += forward_batch(logs.as_mut(), logger)?;
            if worker.join_within(self.options.poll_interval).await {
                break;
            }
            self.enter(&execution, Phase::Draining);
        }
        self.enter(&execution, Phase::BackgroundDone);

        self.enter(&execution, Phase::FinalDrain);
        forwarded += forward_batch(logs.as_mut(), logger)?;

        self.classify(&execution, forwarded)
    }

    /// Run the `install` workflow and return the service's outputs.
    ///
    /// The service is resolved again afterwards, so outputs published by
    /// the workflow are included.
    pub async fn install(&self) -> Result<ServiceOutputs> {
        self.execute(INSTALL_WORKFLOW).await?;
        let service = self.env.service()?;
        debug!(
            service = %service.name,
            outputs = service.outputs.len(),
            "collected service outputs"
        );
        Ok(service.outputs)
    }

    pub async fn uninstall(&self) -> Result<()> {
        self.execute(UNINSTALL_WORKFLOW).await
    }

    fn classify(&self, execution: &ExecutionHandle, forwarded: usize) -> Result<()> {
        let snapshot = execution.snapshot();
        if snapshot.status == ExecutionStatus::Succeeded {
            self.enter(execution, Phase::Succeeded);
            info!(
                workflow = execution.workflow(),
                execution_id = %execution.id(),
                records = forwarded,
                "workflow succeeded"
            );
            return Ok(());
        }

        self.enter(execution, Phase::Failed);
        if !snapshot.status.is_terminal() {
            warn!(
                workflow = execution.workflow(),
                execution_id = %execution.id(),
                status = %snapshot.status,
                "workflow job finished without a terminal status"
            );
        }

        let err = WorkflowError {
            workflow: execution.workflow().to_string(),
            status: snapshot.status,
            message: snapshot.error,
        };
        warn!(
            execution_id = %execution.id(),
            records = forwarded,
            error = %err,
            "workflow failed"
        );
        Err(err.into())
    }

    fn enter(&self, execution: &ExecutionHandle, phase: Phase) {
        if phase == Phase::Draining {
            trace!(execution_id = %execution.id(), ?phase, "bridge phase");
        } else {
            debug!(execution_id = %execution.id(), ?phase, "bridge phase");
        }
    }
}

/// Forward everything currently available, in order.
///
/// A record with a traceback produces a second call at the same severity.
fn forward_batch(logs: &mut dyn LogIterator, logger: &dyn CtxLogger) -> Result<usize> {
    let batch = logs.drain()?;
    for record in &batch {
        logger.log(record.level, &record.message)?;
        if let Some(traceback) = record.traceback.as_deref().filter(|t| !t.is_empty()) {
            logger.log(record.level, traceback)?;
        }
    }
    if !batch.is_empty() {
        debug!(records = batch.len(), "forwarded log batch");
    }
    Ok(batch.len())
}

/// Convenience wrapper around [`ExecutionBridge::execute`].
pub async fn execute(
    env: &Environment,
    runner: &dyn WorkflowRunner,
    workflow_name: &str,
    options: &BridgeOptions,
) -> Result<()> {
    ExecutionBridge::new(env, runner, *options)
        .execute(workflow_name)
        .await
}
