// src/env/csar.rs

use std::fmt;
use std::path::{Path, PathBuf};

/// Where a service archive is fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsarSource {
    /// Anything with a scheme (`http://`, `file://`, ...), passed on as-is.
    Url(String),
    /// A local file. Relative node properties are resolved against the
    /// blueprint directory.
    Path(PathBuf),
}

impl CsarSource {
    pub fn resolve(csar_path: &str, blueprint_dir: &Path) -> Self {
        if csar_path.contains("://") {
            CsarSource::Url(csar_path.to_string())
        } else {
            CsarSource::Path(blueprint_dir.join(csar_path))
        }
    }
}

impl fmt::Display for CsarSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsarSource::Url(url) => f.write_str(url),
            CsarSource::Path(path) => write!(f, "{}", path.display()),
        }
    }
}
