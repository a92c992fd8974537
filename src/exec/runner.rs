// src/exec/runner.rs

//! Seam to the inner orchestrator's workflow runner.
//!
//! Running a workflow is split in two so the bridge can bind a log iterator
//! to the execution before the long blocking part starts:
//!
//! 1. [`WorkflowRunner::prepare`] creates the execution record and returns
//!    its handle plus the job that will drive it.
//! 2. The bridge runs [`PreparedRun::job`] on a blocking worker.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;

use crate::env::{Environment, ModelStorage, PluginManager, ResourceStorage};
use crate::model::{ExecutionHandle, Service};

/// Everything the runner needs to start a workflow against a service.
#[derive(Debug, Clone)]
pub struct WorkflowRequest {
    pub model_storage: Arc<dyn ModelStorage>,
    pub resource_storage: Arc<dyn ResourceStorage>,
    pub plugin_manager: Arc<dyn PluginManager>,
    pub service: Service,
    pub workflow_name: String,
}

impl WorkflowRequest {
    pub fn from_environment(env: &Environment, service: Service, workflow_name: &str) -> Self {
        Self {
            model_storage: Arc::clone(env.model_storage()),
            resource_storage: Arc::clone(env.resource_storage()),
            plugin_manager: Arc::clone(env.plugin_manager()),
            service,
            workflow_name: workflow_name.to_string(),
        }
    }
}

/// Blocking body of a workflow run. May take seconds to hours.
///
/// Its return value is diagnostic only: the outcome of the workflow is read
/// from the execution's terminal status.
pub type WorkflowJob = Box<dyn FnOnce() -> Result<()> + Send + 'static>;

pub struct PreparedRun {
    pub execution: ExecutionHandle,
    pub job: WorkflowJob,
}

impl PreparedRun {
    pub fn new<F>(execution: ExecutionHandle, job: F) -> Self
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        Self {
            execution,
            job: Box::new(job),
        }
    }
}

impl fmt::Debug for PreparedRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedRun")
            .field("execution", &self.execution)
            .finish_non_exhaustive()
    }
}

pub trait WorkflowRunner: Send + Sync {
    fn prepare(&self, request: WorkflowRequest) -> Result<PreparedRun>;
}
