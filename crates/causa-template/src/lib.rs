//! Two-pass asynchronous template renderer.
//!
//! Configuration trees may embed template objects: maps whose only key is
//! the template marker (`$format` by default) and whose value is a format
//! string with `${ expr }` interpolations. Expressions call named
//! [`Fetcher`]s, which may perform blocking work (file I/O, secret
//! backends). The renderer bridges synchronous template syntax and
//! asynchronous fetchers by rendering twice: a discovery pass collects
//! every fetcher invocation, a barrier resolves all distinct invocations
//! concurrently, and a substitution pass replaces template objects with
//! their rendered values.

pub mod error;
pub mod expr;
pub mod fetcher;
pub mod format;
pub mod object;
pub mod renderer;

pub use error::{Error, FetchError, Result};
pub use expr::Expr;
pub use fetcher::{Fetcher, FetcherSet, fetcher_fn};
pub use format::{FormatString, Part};
pub use object::{DEFAULT_MARKER, contains_template, is_template_object, template_format};
pub use renderer::TemplateRenderer;
