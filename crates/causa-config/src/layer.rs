//! Raw configuration layers

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a configuration layer came from.
///
/// The set is open-ended; `File`, `Environment` and `Processor` are the
/// reserved kinds produced by the engine itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceType {
    /// Loaded from a configuration file on disk.
    File,
    /// An `environments.<id>.configuration` overlay.
    Environment,
    /// Partial configuration returned by a processor.
    Processor,
    /// Any other origin an embedder wants to record.
    #[serde(untagged)]
    Other(String),
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Environment => write!(f, "environment"),
            Self::Processor => write!(f, "processor"),
            Self::Other(kind) => write!(f, "{kind}"),
        }
    }
}

/// One layer of raw configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawConfiguration {
    /// The kind of source this layer came from.
    pub source_type: SourceType,

    /// A human-readable identifier of the source: a file path, an
    /// environment id, a processor name.
    pub source: Option<String>,

    /// The configuration tree itself; expected to be a map.
    pub configuration: Value,
}

impl RawConfiguration {
    /// A layer loaded from a configuration file.
    pub fn file(path: impl Into<String>, configuration: Value) -> Self {
        Self {
            source_type: SourceType::File,
            source: Some(path.into()),
            configuration,
        }
    }

    /// An environment overlay layer.
    pub fn environment(id: impl Into<String>, configuration: Value) -> Self {
        Self {
            source_type: SourceType::Environment,
            source: Some(id.into()),
            configuration,
        }
    }

    /// A processor output layer.
    pub fn processor(name: impl Into<String>, configuration: Value) -> Self {
        Self {
            source_type: SourceType::Processor,
            source: Some(name.into()),
            configuration,
        }
    }

    /// A layer with a caller-defined source type.
    pub fn other(
        source_type: impl Into<String>,
        source: Option<String>,
        configuration: Value,
    ) -> Self {
        Self {
            source_type: SourceType::Other(source_type.into()),
            source,
            configuration,
        }
    }
}
