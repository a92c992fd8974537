// src/exec/mod.rs

//! Workflow execution layer.
//!
//! - [`runner`] is the seam to the inner orchestrator's workflow runner.
//! - [`logs`] is the seam to its per-execution log stream.
//! - [`worker`] runs the blocking workflow job in the background.
//! - [`bridge`] ties them together: dispatch, drain logs into the host's
//!   logger while the job runs, then map the terminal status to a result.

pub mod bridge;
pub mod logs;
pub mod runner;
mod worker;

pub use bridge::{
    execute, BridgeOptions, ExecutionBridge, INSTALL_WORKFLOW, MIN_POLL_INTERVAL,
    UNINSTALL_WORKFLOW,
};
pub use logs::LogIterator;
pub use runner::{PreparedRun, WorkflowJob, WorkflowRequest, WorkflowRunner};
