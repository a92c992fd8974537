// src/config/mod.rs

//! Configuration loading and validation for nodebridge.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate the raw model into a [`ConfigFile`] (`validate.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{load_and_validate, load_from_path, load_with_fs};
pub use model::{BridgeSection, ConfigFile, PathsSection, RawBridgeSection, RawConfigFile};
