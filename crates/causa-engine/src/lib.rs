//! The workspace engine facade.
//!
//! A [`WorkspaceContext`] ties the subsystems together: configuration
//! discovery walks the filesystem, the reader merges layers (including
//! the optional environment overlay), modules register function
//! implementations, processors contribute further configuration layers,
//! and templates render against the built-in `configuration` and
//! `secret` fetchers. Contexts are immutable; `clone_with` produces a
//! fresh context with overrides applied.

pub mod context;
pub mod error;
pub mod options;
pub mod secrets;
pub mod services;
pub mod setup;

pub use context::WorkspaceContext;
pub use error::{Error, Result};
pub use options::{ContextOptions, Override, ProcessorInstruction, RenderOptions};
pub use secrets::{SECRET_FETCH, secret_fetch_definition};
pub use services::ServiceCache;
pub use setup::{CAUSA_DIR, FolderSetup, MODULES_DIR, SETUP_MANIFEST};
