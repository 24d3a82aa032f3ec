//! Typed views of the reserved configuration sections

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `workspace` section. A non-null `name` marks the workspace root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceSection {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// The `project` section. A non-null `name` marks a project root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectSection {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub project_type: Option<String>,
    pub language: Option<String>,
    /// Globs resolved relative to the workspace root.
    #[serde(rename = "externalFiles", default)]
    pub external_files: Vec<String>,
}

/// Defaults under `causa.secrets`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretsDefaults {
    #[serde(rename = "defaultBackend")]
    pub default_backend: Option<String>,
}

/// The engine's own `causa` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CausaSection {
    /// Module id to version requirement or `file:<path>` spec.
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
    #[serde(default)]
    pub secrets: SecretsDefaults,
}

/// One entry under `environments`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentEntry {
    pub name: Option<String>,
    /// Overlay merged on top of the file layers when the environment is
    /// selected.
    pub configuration: Option<Value>,
}
