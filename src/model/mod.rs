// src/model/mod.rs

//! Data model shared between the bridge and its collaborators.
//!
//! - [`execution`]: one run of a workflow and its status cell.
//! - [`log_record`]: one emitted line of execution output.
//! - [`service`]: the resolved service a workflow runs against.

pub mod execution;
pub mod log_record;
pub mod service;

pub use execution::{ExecutionHandle, ExecutionId, ExecutionSnapshot};
pub use log_record::LogRecord;
pub use service::{Service, ServiceOutputs};
