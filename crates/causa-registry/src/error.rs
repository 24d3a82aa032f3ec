//! Error types for causa-registry

/// Result type for causa-registry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Opaque error returned by function implementations.
///
/// Implementation errors are propagated unchanged so callers can
/// downcast to the concrete types they registered.
pub type CallError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur registering or dispatching functions
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A structurally different definition is already registered under
    /// the same name.
    #[error("a different function definition is already registered under '{name}'")]
    DefinitionMismatch { name: String },

    /// An implementation could not be materialized or is otherwise
    /// malformed.
    #[error("invalid function: {message}")]
    InvalidFunction { message: String },

    /// No registered implementation supports the current context.
    #[error("no implementation found for function '{name}'")]
    NoImplementationFound { name: String },

    /// More than one registered implementation supports the current
    /// context.
    #[error("expected exactly one implementation for function '{name}', found {count}")]
    TooManyImplementations { name: String, count: usize },

    /// The argument map failed the definition's schema.
    #[error("invalid arguments for function '{name}': {}", messages.join("; "))]
    InvalidArguments { name: String, messages: Vec<String> },

    /// An implementation's call failed; the underlying error is
    /// untouched.
    #[error(transparent)]
    Call(CallError),
}

impl Error {
    pub fn no_implementation(name: impl Into<String>) -> Self {
        Self::NoImplementationFound { name: name.into() }
    }
}
