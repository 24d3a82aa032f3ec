//! Configuration file enumeration

use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use serde_json::Value;

use crate::error::{Error, Result};

/// The canonical configuration file name.
pub const CONFIG_FILE: &str = "causa.yaml";

const CONFIG_PREFIX: &str = "causa.";
const CONFIG_SUFFIX: &str = ".yaml";

/// A parsed configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// The parsed YAML tree.
    pub configuration: Value,
}

impl DiscoveredFile {
    /// Load and parse a configuration file.
    pub fn load(path: PathBuf) -> Result<Self> {
        let text = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let configuration: Value = serde_yaml::from_str(&text).map_err(|e| Error::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(Self {
            path,
            configuration,
        })
    }

    /// Directory containing this file.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("/"))
    }

    /// The value at a dotted path, if present and non-null.
    pub fn get(&self, path: &str) -> Option<&Value> {
        causa_config::lookup(&self.configuration, path).filter(|value| !value.is_null())
    }
}

/// Whether a file name matches `causa.yaml` or `causa.*.yaml`.
pub fn is_configuration_file_name(name: &str) -> bool {
    if name == CONFIG_FILE {
        return true;
    }
    match name
        .strip_prefix(CONFIG_PREFIX)
        .and_then(|rest| rest.strip_suffix(CONFIG_SUFFIX))
    {
        Some(middle) => !middle.is_empty(),
        None => false,
    }
}

/// Configuration files directly inside `dir`, honoring gitignore.
///
/// Files are sorted descending lexicographically by name, so within one
/// directory `causa.yaml` precedes (and is overridden by) any
/// `causa.*.yaml` overlay.
pub fn configuration_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walker = WalkBuilder::new(dir)
        .max_depth(Some(1))
        .follow_links(false)
        .require_git(false)
        .git_global(false)
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // Unreadable entries along the ancestor chain (system
                // directories, permission boundaries) are not fatal.
                tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if is_configuration_file_name(name) {
                files.push(entry.into_path());
            }
        }
    }

    files.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
    Ok(files)
}
