//! Error types for causa-discovery

use std::path::{Path, PathBuf};

/// Result type for causa-discovery operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during workspace discovery
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The set of discovered configuration files does not describe a
    /// valid workspace.
    #[error("invalid workspace configuration files: {message}")]
    InvalidWorkspaceFiles { message: String },

    /// A configuration file is not valid YAML.
    #[error("failed to parse configuration file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// An `externalFiles` glob pattern is malformed.
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// I/O error reading a directory or file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The gitignore-aware walker failed.
    #[error("failed to scan {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },

    /// Configuration reader error (environment overlay lookup).
    #[error(transparent)]
    Config(#[from] causa_config::Error),
}

impl Error {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn invalid_workspace(message: impl Into<String>) -> Self {
        Self::InvalidWorkspaceFiles {
            message: message.into(),
        }
    }
}
