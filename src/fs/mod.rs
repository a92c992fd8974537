// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

pub mod mock;

/// Abstract filesystem interface used for working-directory management,
/// plugin preparation and config loading.
pub trait FileSystem: Send + Sync + Debug {
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;

    /// Names of the direct children of a directory, sorted.
    fn list_dir(&self, path: &Path) -> Result<Vec<String>>;

    /// Create `path` and any missing parents. An existing directory is not
    /// an error.
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Remove a file or a whole directory tree.
    ///
    /// Returns `Ok(false)` if nothing existed at `path`.
    fn remove_path(&self, path: &Path) -> Result<bool>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("reading file {:?}", path))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("listing dir {:?}", path))? {
            let entry = entry.with_context(|| format!("listing dir {:?}", path))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).with_context(|| format!("creating dir {:?}", path))
    }

    fn remove_path(&self, path: &Path) -> Result<bool> {
        let res = if path.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };

        match res {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("removing {:?}", path)),
        }
    }
}

/// Remove every path in `paths`, files and directory trees alike.
///
/// Paths that are already gone are skipped.
pub fn cleanup_files<P: AsRef<Path>>(fs: &dyn FileSystem, paths: &[P]) -> Result<()> {
    for path in paths {
        let path = path.as_ref();
        if !fs.remove_path(path)? {
            debug!(path = ?path, "nothing to clean up");
        }
    }
    Ok(())
}
