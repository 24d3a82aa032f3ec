//! Error types for causa-engine

use std::path::PathBuf;

/// Result type for causa-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the workspace engine
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An operation requiring a project ran outside of one.
    #[error("the working directory '{working_directory}' is not part of a project")]
    NotAProject { working_directory: PathBuf },

    /// An operation requiring an environment ran without one selected.
    #[error("no environment is set on this context")]
    EnvironmentNotSet,

    /// A processor returned something other than a map with a
    /// map-valued `configuration` field.
    #[error("processor '{name}' returned invalid output: expected a map with a map-valued 'configuration' field")]
    InvalidProcessorOutput { name: String },

    /// A secret record is malformed.
    #[error("invalid secret definition{}: {message}", display_secret_id(secret_id))]
    InvalidSecretDefinition {
        message: String,
        secret_id: Option<String>,
    },

    /// No registered secret backend matches the requested one.
    #[error("no secret backend found for '{backend}'")]
    SecretBackendNotFound { backend: String },

    /// Neither the secret record nor the workspace defaults name a
    /// backend.
    #[error("no backend specified for secret '{secret_id}' and no default backend is configured")]
    SecretBackendNotSpecified { secret_id: String },

    /// A backend could not find the requested value. Provided for
    /// backend implementations to signal the condition uniformly.
    #[error("no value found for the requested secret")]
    SecretValueNotFound,

    /// I/O error resolving the working directory or preparing folders.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization error writing engine-owned files.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    // Transparent wrappers for subsystem errors
    #[error(transparent)]
    Config(#[from] causa_config::Error),

    #[error(transparent)]
    Discovery(#[from] causa_discovery::Error),

    #[error(transparent)]
    Modules(#[from] causa_modules::Error),

    #[error(transparent)]
    Registry(#[from] causa_registry::Error),
}

fn display_secret_id(secret_id: &Option<String>) -> String {
    match secret_id {
        Some(id) => format!(" for '{id}'"),
        None => String::new(),
    }
}

impl Error {
    pub fn invalid_secret(message: impl Into<String>, secret_id: Option<String>) -> Self {
        Self::InvalidSecretDefinition {
            message: message.into(),
            secret_id,
        }
    }

    /// Recover engine errors that crossed the fetcher boundary during a
    /// render.
    ///
    /// The injected `secret` fetcher reports failures as boxed errors;
    /// unboxing here hands callers back the original variant instead of
    /// a wrapped fetch error.
    pub(crate) fn from_render(err: causa_config::Error) -> Self {
        match err {
            causa_config::Error::Template(causa_template::Error::Fetch(inner)) => {
                match inner.downcast::<Error>() {
                    Ok(engine_err) => *engine_err,
                    Err(foreign) => Self::Config(causa_config::Error::Template(
                        causa_template::Error::Fetch(foreign),
                    )),
                }
            }
            other => Self::Config(other),
        }
    }
}
