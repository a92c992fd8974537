// src/config/validate.rs

use crate::config::duration::parse_duration;
use crate::config::model::{BridgeSection, ConfigFile, PathsSection, RawConfigFile};
use crate::errors::{BridgeError, Result};
use crate::exec::BridgeOptions;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = BridgeError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let bridge = validate_bridge(&raw)?;
        validate_paths(&raw.paths)?;
        Ok(ConfigFile::new_unchecked(bridge, raw.paths))
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        let bridge = BridgeSection {
            poll_interval: BridgeOptions::default().poll_interval,
        };
        ConfigFile::new_unchecked(bridge, PathsSection::default())
    }
}

fn validate_bridge(cfg: &RawConfigFile) -> Result<BridgeSection> {
    let poll_interval = parse_duration(&cfg.bridge.poll_interval).map_err(|e| {
        BridgeError::Config(format!("[bridge].poll_interval: {e}"))
    })?;

    if poll_interval.is_zero() {
        return Err(BridgeError::Config(
            "[bridge].poll_interval must be greater than zero".to_string(),
        ));
    }

    Ok(BridgeSection { poll_interval })
}

fn validate_paths(paths: &PathsSection) -> Result<()> {
    for (key, value) in [
        ("plugins_root", &paths.plugins_root),
        ("blueprints_root", &paths.blueprints_root),
    ] {
        if value.as_os_str().is_empty() {
            return Err(BridgeError::Config(format!(
                "[paths].{key} must not be empty"
            )));
        }
    }
    Ok(())
}
