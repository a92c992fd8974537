// src/config/loader.rs

use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] to get
/// a usable [`ConfigFile`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let config: RawConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Load and validate a config file through the given filesystem.
pub fn load_with_fs(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<ConfigFile> {
    let contents = fs.read_to_string(path.as_ref())?;
    let raw: RawConfigFile = toml::from_str(&contents)?;
    ConfigFile::try_from(raw)
}

/// Load a configuration file from disk and validate it.
///
/// A missing file at the default location is not an error: the built-in
/// defaults are used instead. A missing file at any other path is.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    if path == default_config_path() && !path.exists() {
        return Ok(ConfigFile::default());
    }
    load_with_fs(&RealFileSystem, path)
}

/// `Nodebridge.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Nodebridge.toml")
}
