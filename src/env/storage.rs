// src/env/storage.rs

//! Seams to the inner orchestrator's storage and plugin registry.
//!
//! These are implemented outside this crate (or by fakes in tests). The
//! bridge only passes them through to the workflow runner, apart from
//! [`ModelStorage::log_iterator`] which it uses to drain execution logs and
//! [`PluginManager`] which [`crate::plugins`] installs archives through.

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::exec::LogIterator;
use crate::model::{ExecutionId, Service};

/// Model storage: services, service templates and execution logs.
pub trait ModelStorage: Send + Sync + Debug {
    /// Directory the storage keeps its models in.
    fn base_dir(&self) -> &Path;

    /// All services created from the named service template.
    fn list_services(&self, service_template_name: &str) -> Result<Vec<Service>>;

    /// Number of service templates still stored.
    fn service_template_count(&self) -> Result<usize>;

    /// Open a log iterator bound to one execution.
    fn log_iterator(&self, execution_id: &ExecutionId) -> Result<Box<dyn LogIterator>>;
}

/// Resource storage (templates, plugin resources) rooted at a directory.
pub trait ResourceStorage: Send + Sync + Debug {
    fn directory(&self) -> &Path;
}

/// Plugin registry of the inner orchestrator.
pub trait PluginManager: Send + Sync + Debug {
    fn plugins_dir(&self) -> &Path;

    /// Check that a plugin archive can be installed. Fails if it is
    /// malformed or already installed.
    fn validate(&self, plugin_path: &Path) -> Result<()>;

    fn install(&self, plugin_path: &Path) -> Result<()>;
}

/// Filesystem-backed resource storage.
#[derive(Debug, Clone)]
pub struct DirectoryResourceStorage {
    directory: PathBuf,
}

impl DirectoryResourceStorage {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

impl ResourceStorage for DirectoryResourceStorage {
    fn directory(&self) -> &Path {
        &self.directory
    }
}
