// src/plugins.rs

//! Installing the plugins a service archive ships with.
//!
//! The archive's `plugins/` directory holds wagon files. The host names the
//! ones it wants; every requested file must be present, and each is
//! validated before it is installed. Anything left over is reported at
//! debug level through the host's logger.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::PluginManager;
use crate::errors::{BridgeError, Result};
use crate::fs::FileSystem;
use crate::sink::CtxLogger;

/// File extension of a packaged plugin.
pub const WAGON_EXTENSION: &str = ".wgn";

/// Name of the plugins directory inside an extracted archive.
pub const ARCHIVE_PLUGINS_DIR: &str = "plugins";

/// Check that every requested plugin is present in `sources_dir`.
///
/// Returns the requested names, deduplicated and sorted.
pub fn prepare_plugins<S: AsRef<str>>(
    fs: &dyn FileSystem,
    sources_dir: &Path,
    requested: &[S],
) -> Result<BTreeSet<String>> {
    let available: BTreeSet<String> = fs.list_dir(sources_dir)?.into_iter().collect();
    let requested: BTreeSet<String> = requested
        .iter()
        .map(|name| name.as_ref().to_string())
        .collect();

    let missing: Vec<String> = requested.difference(&available).cloned().collect();
    if !missing.is_empty() {
        return Err(BridgeError::MissingPlugins(missing));
    }
    Ok(requested)
}

/// Validate and install each requested plugin found in `sources_dir`.
///
/// Nothing is installed if any requested plugin is missing. A validation or
/// install failure stops at that plugin and is returned unchanged.
pub fn install_plugins<S: AsRef<str>>(
    fs: &dyn FileSystem,
    manager: &dyn PluginManager,
    sources_dir: &Path,
    requested: &[S],
) -> Result<Vec<PathBuf>> {
    let prepared = prepare_plugins(fs, sources_dir, requested)?;

    let mut installed = Vec::with_capacity(prepared.len());
    for name in &prepared {
        let plugin_path = sources_dir.join(name);
        manager.validate(&plugin_path)?;
        manager.install(&plugin_path)?;
        debug!(plugin = %name, "plugin installed");
        installed.push(plugin_path);
    }
    info!(count = installed.len(), "plugins installed");
    Ok(installed)
}

/// Report files in `sources_dir` that were not installed.
pub fn log_unused_plugins<S: AsRef<str>>(
    fs: &dyn FileSystem,
    logger: &dyn CtxLogger,
    sources_dir: &Path,
    installed: &[S],
) -> Result<()> {
    let installed: BTreeSet<&str> = installed.iter().map(|name| name.as_ref()).collect();
    for file in fs.list_dir(sources_dir)? {
        if installed.contains(file.as_str()) {
            continue;
        }
        if file.ends_with(WAGON_EXTENSION) {
            logger.debug(&format!(
                "Unused plugin {file} in the csar plugins directory"
            ))?;
        } else {
            logger.debug(&format!(
                "Non-plugin file {file} in the csar plugins directory"
            ))?;
        }
    }
    Ok(())
}
