//! Workspace configuration discovery.
//!
//! Finds `causa.yaml` / `causa.*.yaml` files from a working directory up
//! to the filesystem root, infers the workspace root (the unique file
//! declaring `workspace.name`) and the project root (the unique file
//! declaring `project.name`), and assembles the ordered layer list the
//! configuration reader merges.

pub mod error;
pub mod files;
pub mod projects;
pub mod schema;
pub mod workspace;

pub use error::{Error, Result};
pub use files::{DiscoveredFile, configuration_files_in, is_configuration_file_name};
pub use projects::{list_project_paths, project_external_paths};
pub use schema::{
    CausaSection, EnvironmentEntry, ProjectSection, SecretsDefaults, WorkspaceSection,
};
pub use workspace::{WorkspaceConfiguration, discover_workspace};
