//! Installed module manifests

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Manifest file name inside an installed module directory.
pub const MANIFEST_FILE: &str = "module.json";

/// The manifest an installed module ships with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleManifest {
    /// The module's published name.
    pub name: String,
    /// The installed version.
    pub version: semver::Version,
}

impl ModuleManifest {
    /// Read the manifest of module `name` from its install directory.
    ///
    /// A missing directory or manifest is [`Error::NotFound`]; an
    /// unreadable or invalid manifest is [`Error::Version`], since the
    /// installed version cannot be determined from it.
    pub fn load(name: &str, module_dir: &Path) -> Result<Self> {
        let path = module_dir.join(MANIFEST_FILE);
        if !path.is_file() {
            return Err(Error::NotFound {
                name: name.to_string(),
            });
        }

        let text = fs::read_to_string(&path).map_err(|e| Error::Version {
            name: name.to_string(),
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        serde_json::from_str(&text).map_err(|e| Error::Version {
            name: name.to_string(),
            message: format!("invalid manifest {}: {e}", path.display()),
        })
    }
}
