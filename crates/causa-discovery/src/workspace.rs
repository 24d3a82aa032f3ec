//! Workspace discovery
//!
//! Walks from the working directory up to the filesystem root collecting
//! configuration files, infers the workspace and project roots, and
//! builds the layered reader (including the optional environment
//! overlay).

use std::path::{Path, PathBuf};

use causa_config::{ConfigurationReader, GetOptions, RawConfiguration};
use tracing::debug;

use crate::error::{Error, Result};
use crate::files::{DiscoveredFile, configuration_files_in};

/// The outcome of workspace discovery.
#[derive(Debug, Clone)]
pub struct WorkspaceConfiguration {
    /// Reader over the ordered file layers plus the environment overlay.
    pub reader: ConfigurationReader,
    /// Directory of the unique file declaring `workspace.name`.
    pub root_path: PathBuf,
    /// Directory of the unique file declaring `project.name`, if any.
    pub project_path: Option<PathBuf>,
}

/// Discover the workspace containing `working_directory`.
///
/// Layer order: files in directories closer to the filesystem root come
/// first, so configuration deeper in the tree overrides its ancestors;
/// within one directory, file names sort descending lexicographically.
/// The optional `environment` overlay is appended last.
pub fn discover_workspace(
    working_directory: &Path,
    environment: Option<&str>,
) -> Result<WorkspaceConfiguration> {
    let start =
        dunce::canonicalize(working_directory).map_err(|e| Error::io(working_directory, e))?;

    let mut per_directory: Vec<Vec<PathBuf>> = Vec::new();
    let mut current = Some(start.as_path());
    while let Some(dir) = current {
        per_directory.push(configuration_files_in(dir)?);
        current = dir.parent();
    }
    per_directory.reverse();

    let paths: Vec<PathBuf> = per_directory.into_iter().flatten().collect();
    if paths.is_empty() {
        return Err(Error::invalid_workspace(format!(
            "no configuration files found from '{}' upward",
            start.display()
        )));
    }

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        debug!(path = %path.display(), "loading workspace configuration file");
        files.push(DiscoveredFile::load(path)?);
    }

    let root_path = unique_declaring_directory(&files, "workspace.name")?.ok_or_else(|| {
        Error::invalid_workspace("no configuration file declares 'workspace.name'")
    })?;
    let project_path = unique_declaring_directory(&files, "project.name")?;

    let layers: Vec<RawConfiguration> = files
        .iter()
        .map(|file| {
            RawConfiguration::file(file.path.display().to_string(), file.configuration.clone())
        })
        .collect();
    let mut reader = ConfigurationReader::new(layers);

    if let Some(environment) = environment {
        let entry = reader
            .require(
                &format!("environments.{environment}"),
                GetOptions::unrendered(),
            )?
            .clone();
        if let Some(overlay) = entry.get("configuration").filter(|v| v.is_object()) {
            debug!(environment, "appending environment configuration overlay");
            reader =
                reader.merged_with([RawConfiguration::environment(environment, overlay.clone())]);
        }
    }

    Ok(WorkspaceConfiguration {
        reader,
        root_path,
        project_path,
    })
}

/// Directory of the unique file whose value at `path` is non-null.
///
/// Zero matches is `None`; more than one is an invalid workspace.
fn unique_declaring_directory(files: &[DiscoveredFile], path: &str) -> Result<Option<PathBuf>> {
    let declaring: Vec<&DiscoveredFile> =
        files.iter().filter(|file| file.get(path).is_some()).collect();
    match declaring.as_slice() {
        [] => Ok(None),
        [only] => Ok(Some(only.directory().to_path_buf())),
        many => Err(Error::invalid_workspace(format!(
            "'{path}' is declared by {} configuration files: {}",
            many.len(),
            many.iter()
                .map(|file| file.path.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}
