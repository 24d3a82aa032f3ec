//! Error types for causa-template

/// Result type for causa-template operations
pub type Result<T> = std::result::Result<T, Error>;

/// Opaque error returned by fetcher implementations.
///
/// Fetcher errors are propagated through the renderer unchanged so that
/// callers can downcast to the concrete error type they installed.
pub type FetchError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while rendering templates
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A format string could not be parsed or evaluated.
    #[error("failed to render template '{template}': {reason}")]
    Rendering { template: String, reason: String },

    /// A substitution-pass lookup missed the resolved-data cache.
    ///
    /// The discovery pass records every fetcher invocation before the
    /// barrier runs, so a miss here is a programming error.
    #[error("no resolved data for fetcher '{fetcher}' called with {args}")]
    ReferencedData { fetcher: String, args: String },

    /// A fetcher invocation failed; the underlying error is untouched.
    #[error(transparent)]
    Fetch(FetchError),
}

impl Error {
    pub fn rendering(template: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rendering {
            template: template.into(),
            reason: reason.into(),
        }
    }
}
