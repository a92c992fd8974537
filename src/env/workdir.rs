// src/env/workdir.rs

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::Result;
use crate::fs::FileSystem;

pub const WORKDIR_PREFIX: &str = "aria-";
pub const PLUGINS_DIR: &str = "plugins";
pub const MODELS_DIR: &str = "models";
pub const RESOURCES_DIR: &str = "resources";

/// Per-tenant working directory of the inner orchestrator:
///
/// ```text
/// <plugins_root>/aria-<tenant>/
///     plugins/
///     models/
///     resources/
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workdir {
    root: PathBuf,
}

impl Workdir {
    pub fn for_tenant(plugins_root: impl AsRef<Path>, tenant: &str) -> Self {
        Self {
            root: plugins_root
                .as_ref()
                .join(format!("{WORKDIR_PREFIX}{tenant}")),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn plugins_dir(&self) -> PathBuf {
        self.root.join(PLUGINS_DIR)
    }

    pub fn models_dir(&self) -> PathBuf {
        self.root.join(MODELS_DIR)
    }

    pub fn resources_dir(&self) -> PathBuf {
        self.root.join(RESOURCES_DIR)
    }

    /// Create the root and its subdirectories. Safe to call repeatedly.
    pub fn ensure(&self, fs: &dyn FileSystem) -> Result<()> {
        for dir in [
            self.root.clone(),
            self.plugins_dir(),
            self.models_dir(),
            self.resources_dir(),
        ] {
            fs.create_dir_all(&dir)?;
        }
        debug!(workdir = ?self.root, "working directory ready");
        Ok(())
    }

    /// Delete the whole working directory. A missing directory is not an
    /// error; returns whether anything was removed.
    pub fn remove(&self, fs: &dyn FileSystem) -> Result<bool> {
        let removed = fs.remove_path(&self.root)?;
        if removed {
            info!(workdir = ?self.root, "removed working directory");
        } else {
            debug!(workdir = ?self.root, "working directory already absent");
        }
        Ok(removed)
    }
}
