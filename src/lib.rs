// src/lib.rs

//! `nodebridge` lets a host deployment orchestrator drive a workflow engine
//! as one managed service node.
//!
//! The heart of the crate is the [`exec::ExecutionBridge`]: it starts a
//! named workflow (`install`, `uninstall`, ...) on a background worker,
//! streams the engine's execution log into the host's logger while the
//! workflow runs, and reports the terminal status as `Ok(())` or a
//! [`errors::WorkflowError`].
//!
//! Around it:
//! - [`env`] builds the per-invocation [`env::Environment`] (storage handles,
//!   plugin manager, logger sink, tenant working directory).
//! - [`config`] loads `Nodebridge.toml`.
//! - [`sink`] defines the host logger interface.
//! - [`model`] holds executions, log records and services.
//! - [`plugins`] installs the plugins shipped inside a service archive.

pub mod config;
pub mod env;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod model;
pub mod plugins;
pub mod sink;
pub mod types;

pub use env::{Environment, EnvironmentBuilder, HostContext};
pub use errors::{BridgeError, Result, WorkflowError};
pub use exec::{execute, BridgeOptions, ExecutionBridge};
pub use types::{ExecutionStatus, Severity};
