//! Error types for causa-modules

/// Result type for causa-modules operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur loading modules
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The module is not present in the install location.
    #[error("module '{name}' is not installed")]
    NotFound { name: String },

    /// The installed module's version could not be determined.
    #[error("could not determine the installed version of module '{name}': {message}")]
    Version { name: String, message: String },

    /// The installed module does not satisfy the declared requirement.
    #[error("module '{name}' version {actual} does not satisfy the required range '{required}'")]
    Incompatible {
        name: String,
        actual: semver::Version,
        required: semver::VersionReq,
    },

    /// A module loading task failed to run to completion.
    #[error("module loading task failed: {message}")]
    TaskFailed { message: String },

    /// Registration with the function registry failed.
    #[error(transparent)]
    Registry(#[from] causa_registry::Error),
}

impl Error {
    /// Whether this failure is fixed by (re)installing workspace
    /// modules.
    pub fn requires_module_install(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Version { .. } | Self::Incompatible { .. }
        )
    }
}
