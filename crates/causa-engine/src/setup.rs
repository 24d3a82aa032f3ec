//! Workspace folder setup
//!
//! Prepares `<root>/.causa` for module installation. The engine writes
//! the declared-modules manifest and keeps the directory out of version
//! control; the installer that populates `modules/` is an external
//! collaborator.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::Result;

/// The engine's folder under the workspace root.
pub const CAUSA_DIR: &str = ".causa";

/// Where installed modules live, relative to [`CAUSA_DIR`].
pub const MODULES_DIR: &str = "modules";

/// The manifest declaring which modules the installer should provide.
pub const SETUP_MANIFEST: &str = "modules.json";

/// Prepares the on-disk engine folder for a workspace.
pub struct FolderSetup {
    root: PathBuf,
}

#[derive(Serialize)]
struct SetupManifest<'a> {
    modules: &'a BTreeMap<String, String>,
}

impl FolderSetup {
    /// Create a setup helper for the given workspace root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<root>/.causa`
    pub fn causa_dir(&self) -> PathBuf {
        self.root.join(CAUSA_DIR)
    }

    /// `<root>/.causa/modules`
    pub fn modules_dir(&self) -> PathBuf {
        self.causa_dir().join(MODULES_DIR)
    }

    /// Create the folder layout and write the declared-modules
    /// manifest. Idempotent; an existing manifest is replaced
    /// atomically.
    pub fn prepare(&self, modules: &BTreeMap<String, String>) -> Result<PathBuf> {
        let causa_dir = self.causa_dir();
        fs::create_dir_all(self.modules_dir())?;
        fs::write(causa_dir.join(".gitignore"), "*\n")?;

        let manifest = serde_json::to_string_pretty(&SetupManifest { modules })?;
        write_atomic(&causa_dir.join(SETUP_MANIFEST), manifest.as_bytes())?;

        debug!(dir = %causa_dir.display(), modules = modules.len(), "prepared module folder");
        Ok(causa_dir)
    }
}

/// Write via temp-then-rename so readers never observe partial content.
fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(temp_name);
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}
