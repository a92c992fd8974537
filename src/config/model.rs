// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::exec::BridgeOptions;

pub const DEFAULT_POLL_INTERVAL: &str = "100ms";
pub const DEFAULT_PLUGINS_ROOT: &str = "/opt/manager/resources/plugins";
pub const DEFAULT_BLUEPRINTS_ROOT: &str = "/opt/manager/resources/blueprints";

/// Configuration as read from `Nodebridge.toml`, before validation.
///
/// ```toml
/// [bridge]
/// poll_interval = "100ms"
///
/// [paths]
/// plugins_root = "/opt/manager/resources/plugins"
/// blueprints_root = "/opt/manager/resources/blueprints"
/// ```
///
/// Every section and key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub bridge: RawBridgeSection,

    #[serde(default)]
    pub paths: PathsSection,
}

/// `[bridge]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBridgeSection {
    /// How long the bridge waits for the workflow to finish between two
    /// log drains. Tunable; not part of any behavioural contract.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,
}

fn default_poll_interval() -> String {
    DEFAULT_POLL_INTERVAL.to_string()
}

impl Default for RawBridgeSection {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
        }
    }
}

/// `[paths]` section: where the host orchestrator keeps its resources.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathsSection {
    /// Parent of every tenant working directory.
    #[serde(default = "default_plugins_root")]
    pub plugins_root: PathBuf,

    /// Parent of `<tenant>/<blueprint_id>` blueprint directories.
    #[serde(default = "default_blueprints_root")]
    pub blueprints_root: PathBuf,
}

fn default_plugins_root() -> PathBuf {
    PathBuf::from(DEFAULT_PLUGINS_ROOT)
}

fn default_blueprints_root() -> PathBuf {
    PathBuf::from(DEFAULT_BLUEPRINTS_ROOT)
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            plugins_root: default_plugins_root(),
            blueprints_root: default_blueprints_root(),
        }
    }
}

/// Validated `[bridge]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeSection {
    pub poll_interval: Duration,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub bridge: BridgeSection,
    pub paths: PathsSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(bridge: BridgeSection, paths: PathsSection) -> Self {
        Self { bridge, paths }
    }

    pub fn bridge_options(&self) -> BridgeOptions {
        BridgeOptions {
            poll_interval: self.bridge.poll_interval,
        }
    }
}
