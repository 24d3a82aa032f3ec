//! Error types for causa-config

/// Result type for causa-config operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur reading or rendering configuration
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required path has no value in the merged configuration.
    #[error("no configuration value at '{path}'")]
    ValueNotFound { path: String },

    /// A safe `get` found a template object in the returned subtree.
    #[error("configuration value at '{path}' contains an unrendered template")]
    UnrenderedTemplate { path: String },

    /// A template requested a configuration path that is already being
    /// rendered further up the chain.
    #[error("circular template reference through configuration path '{path}'")]
    CircularReference { path: String },

    /// Template parsing or substitution failed.
    #[error(transparent)]
    Template(causa_template::Error),

    /// The merged configuration does not deserialize into the requested
    /// type.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn value_not_found(path: impl Into<String>) -> Self {
        Self::ValueNotFound { path: path.into() }
    }
}

/// Recover structured configuration errors that crossed the fetcher
/// boundary as boxed errors.
///
/// The `configuration` fetcher reports cycles as a boxed
/// [`Error::CircularReference`]; the renderer wraps fetcher failures in
/// [`causa_template::Error::Fetch`]. Unwrapping here gives callers the
/// original error kind back.
impl From<causa_template::Error> for Error {
    fn from(err: causa_template::Error) -> Self {
        match err {
            causa_template::Error::Fetch(inner) => match inner.downcast::<Error>() {
                Ok(config_err) => *config_err,
                Err(other) => match other.downcast::<causa_template::Error>() {
                    Ok(template_err) => Self::from(*template_err),
                    Err(untouched) => Self::Template(causa_template::Error::Fetch(untouched)),
                },
            },
            other => Self::Template(other),
        }
    }
}
