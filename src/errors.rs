// src/errors.rs

//! Crate-wide error types.
//!
//! Collaborator traits (model storage, runner, log iterator) report failures
//! as `anyhow::Error`; those pass through [`BridgeError::Collaborator`]
//! untouched. The only error the bridge itself manufactures is
//! [`WorkflowError`].

use thiserror::Error;

use crate::sink::SinkError;
use crate::types::ExecutionStatus;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("No services exist for service template {0}")]
    MissingService(String),

    #[error(
        "Requested plugins {} are not in the csar `plugins` directory",
        .0.join(", ")
    )]
    MissingPlugins(Vec<String>),

    #[error("Log forwarding failed: {0}")]
    LogForwarding(#[from] SinkError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

/// A workflow reached a terminal status other than `succeeded`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "workflow '{workflow}' ended with status '{status}': {}",
    .message.as_deref().unwrap_or("no error message")
)]
pub struct WorkflowError {
    pub workflow: String,
    pub status: ExecutionStatus,
    pub message: Option<String>,
}

pub type Result<T> = std::result::Result<T, BridgeError>;
