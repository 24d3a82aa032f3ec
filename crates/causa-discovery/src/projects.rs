//! Project enumeration and external file globs

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSetBuilder};
use ignore::WalkBuilder;
use tracing::debug;

use crate::error::{Error, Result};
use crate::files::{DiscoveredFile, is_configuration_file_name};

/// Directories under `root` whose configuration declares `project.name`.
///
/// The walk honors gitignore and does not follow symlinks. Results are
/// unique and sorted.
pub fn list_project_paths(root: &Path) -> Result<Vec<PathBuf>> {
    let mut projects = BTreeSet::new();

    for entry in workspace_walker(root) {
        let entry = entry.map_err(|e| Error::Walk {
            path: root.to_path_buf(),
            source: e,
        })?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !is_configuration_file_name(name) {
            continue;
        }

        let file = DiscoveredFile::load(entry.into_path())?;
        if file.get("project.name").is_some() {
            projects.insert(file.directory().to_path_buf());
        }
    }

    debug!(root = %root.display(), count = projects.len(), "listed project paths");
    Ok(projects.into_iter().collect())
}

/// Files under `root` matching the given `externalFiles` globs.
///
/// Globs are resolved relative to `root`, honoring gitignore and not
/// following symlinks.
pub fn project_external_paths(root: &Path, globs: &[String]) -> Result<Vec<PathBuf>> {
    if globs.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in globs {
        let glob = Glob::new(pattern).map_err(|e| Error::InvalidGlob {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        builder.add(glob);
    }
    let set = builder.build().map_err(|e| Error::InvalidGlob {
        pattern: globs.join(", "),
        message: e.to_string(),
    })?;

    let mut matches = Vec::new();
    for entry in workspace_walker(root) {
        let entry = entry.map_err(|e| Error::Walk {
            path: root.to_path_buf(),
            source: e,
        })?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or_else(|_| entry.path());
        if set.is_match(relative) {
            matches.push(entry.into_path());
        }
    }

    matches.sort();
    Ok(matches)
}

fn workspace_walker(root: &Path) -> ignore::Walk {
    WalkBuilder::new(root)
        .follow_links(false)
        .require_git(false)
        .git_global(false)
        .build()
}
