//! Module hosting
//!
//! A [`ModuleHost`] resolves installed module manifests and produces
//! module instances. The filesystem host reads manifests from the
//! workspace install directory and hands out embedder-registered module
//! constructors, which is the closest safe analogue of a dynamic import
//! from an installed package tree.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use causa_registry::ImplementationFactory;

use crate::error::{Error, Result};
use crate::manifest::ModuleManifest;

/// A loadable module: registers function implementations against a
/// context type `C`.
#[async_trait]
pub trait EngineModule<C>: Send + Sync {
    /// Register this module's function implementations.
    ///
    /// The registration scope is the module's only capability; it
    /// forwards to the engine's function registry.
    async fn register(&self, registration: &mut ModuleRegistration<C>) -> Result<()>;
}

/// The narrow capability object handed to a module's `register`.
pub struct ModuleRegistration<C> {
    implementations: Vec<Arc<dyn ImplementationFactory<C>>>,
}

impl<C> Default for ModuleRegistration<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> ModuleRegistration<C> {
    pub fn new() -> Self {
        Self {
            implementations: Vec::new(),
        }
    }

    /// Queue implementation factories for registration with the
    /// function registry.
    pub fn register_function_implementations(
        &mut self,
        factories: impl IntoIterator<Item = Arc<dyn ImplementationFactory<C>>>,
    ) {
        self.implementations.extend(factories);
    }

    /// Consume the scope, yielding everything the module registered.
    pub fn into_implementations(self) -> Vec<Arc<dyn ImplementationFactory<C>>> {
        self.implementations
    }
}

/// Resolves module manifests and instances.
pub trait ModuleHost<C>: Send + Sync {
    /// The installed manifest of module `name`.
    fn manifest(&self, name: &str) -> Result<ModuleManifest>;

    /// Instantiate module `name`.
    fn instantiate(&self, name: &str) -> Result<Arc<dyn EngineModule<C>>>;
}

/// A [`ModuleHost`] over an on-disk install directory.
///
/// Manifests come from `<install_dir>/<name>/module.json`; module code
/// comes from constructors the embedder registered with
/// [`with_module`](Self::with_module).
pub struct FsModuleHost<C> {
    install_dir: PathBuf,
    modules: HashMap<String, Arc<dyn EngineModule<C>>>,
}

impl<C> FsModuleHost<C> {
    /// Create a host over the given install directory.
    pub fn new(install_dir: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
            modules: HashMap::new(),
        }
    }

    /// Register the code for an installed module.
    pub fn with_module(mut self, name: impl Into<String>, module: Arc<dyn EngineModule<C>>) -> Self {
        self.modules.insert(name.into(), module);
        self
    }

    /// The install directory this host reads manifests from.
    pub fn install_dir(&self) -> &PathBuf {
        &self.install_dir
    }
}

impl<C> ModuleHost<C> for FsModuleHost<C> {
    fn manifest(&self, name: &str) -> Result<ModuleManifest> {
        ModuleManifest::load(name, &self.install_dir.join(name))
    }

    fn instantiate(&self, name: &str) -> Result<Arc<dyn EngineModule<C>>> {
        self.modules
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound {
                name: name.to_string(),
            })
    }
}
