//! Module loading for the workspace engine.
//!
//! Workspaces declare modules under `causa.modules` as a mapping from
//! module id to a version requirement (or a `file:<path>` spec). The
//! loader checks each declared requirement against the installed module
//! manifest, instantiates the module through a [`ModuleHost`], and lets
//! it register function implementations through a narrow capability
//! object. All module loads run concurrently.

pub mod error;
pub mod host;
pub mod loader;
pub mod manifest;

pub use error::{Error, Result};
pub use host::{EngineModule, FsModuleHost, ModuleHost, ModuleRegistration};
pub use loader::ModuleLoader;
pub use manifest::{MANIFEST_FILE, ModuleManifest};
