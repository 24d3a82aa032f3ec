//! [`TestWorkspace`] builder for workspace test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory tree with helpers for laying out workspace
/// fixtures.
///
/// # Example
///
/// ```rust,no_run
/// use causa_test_utils::TestWorkspace;
///
/// let workspace = TestWorkspace::new();
/// workspace.write_config("", "causa.yaml", "workspace:\n  name: w\n");
/// workspace.write_config("service", "causa.yaml", "project:\n  name: svc\n");
/// workspace.assert_file_exists("service/causa.yaml");
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("TestWorkspace: failed to create temp dir"),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Resolve a path relative to the workspace root.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write a configuration file into `relative_dir` (created as
    /// needed), returning its path.
    pub fn write_config(&self, relative_dir: &str, file_name: &str, yaml: &str) -> PathBuf {
        let dir = self.path(relative_dir);
        fs::create_dir_all(&dir).expect("TestWorkspace: failed to create directory");
        let path = dir.join(file_name);
        fs::write(&path, yaml).expect("TestWorkspace: failed to write configuration");
        path
    }

    /// Write an arbitrary file (parent directories created as needed).
    pub fn write_file(&self, relative_path: &str, contents: &str) -> PathBuf {
        let path = self.path(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("TestWorkspace: failed to create parent");
        }
        fs::write(&path, contents).expect("TestWorkspace: failed to write file");
        path
    }

    /// Assert that `relative_path` exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, relative_path: &str) {
        let full_path = self.path(relative_path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Read a file back as a string.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read_file(&self, relative_path: &str) -> String {
        let full_path = self.path(relative_path);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }
}
