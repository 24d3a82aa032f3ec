//! Layered configuration for workspace engines.
//!
//! Configuration is assembled from ordered layers (files, environment
//! overlays, processor outputs) merged into a single value tree. The
//! [`ConfigurationReader`] exposes safe path-based access that refuses to
//! hand out unrendered template objects, plus rendering entry points that
//! resolve templates through the asynchronous fetcher machinery of
//! `causa-template`.

pub mod config_fetcher;
pub mod error;
pub mod layer;
pub mod merge;
pub mod path;
pub mod reader;

pub use config_fetcher::ConfigurationFetcher;
pub use error::{Error, Result};
pub use layer::{RawConfiguration, SourceType};
pub use merge::{merge_layers, merge_values};
pub use path::{is_path_prefix, lookup};
pub use reader::{ConfigurationReader, GetOptions};
