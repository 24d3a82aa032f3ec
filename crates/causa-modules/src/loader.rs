//! Concurrent module loading

use std::collections::BTreeMap;
use std::sync::Arc;

use causa_registry::{FunctionRegistry, ImplementationFactory};
use tokio::task::JoinSet;
use tracing::debug;

use crate::error::{Error, Result};
use crate::host::{ModuleHost, ModuleRegistration};

/// Loads the modules a workspace declares and registers their function
/// implementations.
pub struct ModuleLoader<C> {
    host: Arc<dyn ModuleHost<C>>,
}

impl<C: Send + Sync + 'static> ModuleLoader<C> {
    pub fn new(host: Arc<dyn ModuleHost<C>>) -> Self {
        Self { host }
    }

    /// Load every declared module and register its implementations.
    ///
    /// `modules` maps module id to a version requirement; requirements
    /// that parse as semver ranges are checked against the installed
    /// manifest, anything else (such as `file:<path>` specs) skips the
    /// check. Loads run concurrently; the first failure aborts the
    /// whole operation. Registration happens in completion order, so
    /// ordering across unrelated modules is nondeterministic.
    pub async fn load_modules(
        &self,
        modules: &BTreeMap<String, String>,
        registry: &mut FunctionRegistry<C>,
    ) -> Result<()> {
        let mut join_set = JoinSet::new();
        for (name, requirement) in modules {
            let host = Arc::clone(&self.host);
            let name = name.clone();
            let requirement = requirement.clone();
            join_set.spawn(async move {
                let implementations = load_one(host, &name, &requirement).await?;
                Ok::<_, Error>((name, implementations))
            });
        }

        while let Some(joined) = join_set.join_next().await {
            let (name, implementations) = joined.map_err(|e| Error::TaskFailed {
                message: e.to_string(),
            })??;
            debug!(
                module = %name,
                count = implementations.len(),
                "registering module implementations"
            );
            registry.register_implementations(implementations)?;
        }
        Ok(())
    }
}

async fn load_one<C: Send + Sync + 'static>(
    host: Arc<dyn ModuleHost<C>>,
    name: &str,
    requirement: &str,
) -> Result<Vec<Arc<dyn ImplementationFactory<C>>>> {
    match semver::VersionReq::parse(requirement) {
        Ok(required) => {
            let manifest = host.manifest(name)?;
            if !required.matches(&manifest.version) {
                return Err(Error::Incompatible {
                    name: name.to_string(),
                    actual: manifest.version,
                    required,
                });
            }
        }
        Err(_) => {
            debug!(
                module = name,
                requirement, "requirement is not a semver range, skipping version check"
            );
        }
    }

    let module = host.instantiate(name)?;
    let mut registration = ModuleRegistration::new();
    module.register(&mut registration).await?;
    Ok(registration.into_implementations())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::EngineModule;
    use crate::manifest::ModuleManifest;
    use async_trait::async_trait;
    use causa_registry::{CallError, FunctionDefinition, FunctionImplementation, TypedFactory};
    use serde::Deserialize;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Ctx;

    #[derive(Debug, Deserialize)]
    struct Greet {}

    #[async_trait]
    impl FunctionImplementation<Ctx> for Greet {
        fn supports(&self, _context: &Ctx) -> bool {
            true
        }

        async fn call(&self, _context: &Ctx) -> std::result::Result<Value, CallError> {
            Ok(json!("hello"))
        }
    }

    /// A module registering one `greet` implementation under a
    /// configurable operation name.
    struct GreetModule {
        operation: String,
    }

    #[async_trait]
    impl EngineModule<Ctx> for GreetModule {
        async fn register(&self, registration: &mut ModuleRegistration<Ctx>) -> Result<()> {
            registration.register_function_implementations([Arc::new(
                TypedFactory::<Ctx, Greet>::new(FunctionDefinition::new(&self.operation)),
            )
                as Arc<dyn ImplementationFactory<Ctx>>]);
            Ok(())
        }
    }

    /// In-memory host tracking how often manifests are resolved.
    struct MemoryHost {
        manifests: HashMap<String, ModuleManifest>,
        modules: HashMap<String, Arc<dyn EngineModule<Ctx>>>,
        manifest_lookups: AtomicUsize,
    }

    impl MemoryHost {
        fn new() -> Self {
            Self {
                manifests: HashMap::new(),
                modules: HashMap::new(),
                manifest_lookups: AtomicUsize::new(0),
            }
        }

        fn with(mut self, name: &str, version: &str, operation: &str) -> Self {
            self.manifests.insert(
                name.to_string(),
                ModuleManifest {
                    name: name.to_string(),
                    version: semver::Version::parse(version).unwrap(),
                },
            );
            self.modules.insert(
                name.to_string(),
                Arc::new(GreetModule {
                    operation: operation.to_string(),
                }),
            );
            self
        }
    }

    impl ModuleHost<Ctx> for MemoryHost {
        fn manifest(&self, name: &str) -> Result<ModuleManifest> {
            self.manifest_lookups.fetch_add(1, Ordering::SeqCst);
            self.manifests
                .get(name)
                .cloned()
                .ok_or_else(|| Error::NotFound {
                    name: name.to_string(),
                })
        }

        fn instantiate(&self, name: &str) -> Result<Arc<dyn EngineModule<Ctx>>> {
            self.modules
                .get(name)
                .cloned()
                .ok_or_else(|| Error::NotFound {
                    name: name.to_string(),
                })
        }
    }

    fn declared(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_load_compatible_module() {
        let host = Arc::new(MemoryHost::new().with("mod-a", "1.3.0", "greet"));
        let loader = ModuleLoader::new(host as Arc<dyn ModuleHost<Ctx>>);
        let mut registry = FunctionRegistry::new();

        loader
            .load_modules(&declared(&[("mod-a", "^1.0.0")]), &mut registry)
            .await
            .unwrap();
        assert!(registry.contains("greet"));
    }

    #[tokio::test]
    async fn test_incompatible_version_rejected() {
        let host = Arc::new(MemoryHost::new().with("some-mod", "1.3.0", "greet"));
        let loader = ModuleLoader::new(host as Arc<dyn ModuleHost<Ctx>>);
        let mut registry = FunctionRegistry::new();

        let err = loader
            .load_modules(&declared(&[("some-mod", "^2.0.0")]), &mut registry)
            .await
            .unwrap_err();
        match &err {
            Error::Incompatible {
                name,
                actual,
                required,
            } => {
                assert_eq!(name, "some-mod");
                assert_eq!(actual, &semver::Version::new(1, 3, 0));
                assert_eq!(required, &semver::VersionReq::parse("^2.0.0").unwrap());
            }
            other => panic!("expected Incompatible, got {other:?}"),
        }
        assert!(err.requires_module_install());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_missing_module_rejected() {
        let host = Arc::new(MemoryHost::new());
        let loader = ModuleLoader::new(host as Arc<dyn ModuleHost<Ctx>>);
        let mut registry = FunctionRegistry::new();

        let err = loader
            .load_modules(&declared(&[("ghost", "^1.0.0")]), &mut registry)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { name } if name == "ghost"));
    }

    #[tokio::test]
    async fn test_file_spec_skips_version_check() {
        let host = Arc::new(MemoryHost::new().with("local-mod", "0.0.1", "greet"));
        let lookups = Arc::clone(&host);
        let loader = ModuleLoader::new(host as Arc<dyn ModuleHost<Ctx>>);
        let mut registry = FunctionRegistry::new();

        loader
            .load_modules(&declared(&[("local-mod", "file:../local-mod")]), &mut registry)
            .await
            .unwrap();
        assert!(registry.contains("greet"));
        assert_eq!(lookups.manifest_lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_multiple_modules_all_registered() {
        let host = Arc::new(
            MemoryHost::new()
                .with("mod-a", "1.0.0", "op-a")
                .with("mod-b", "2.0.0", "op-b"),
        );
        let loader = ModuleLoader::new(host as Arc<dyn ModuleHost<Ctx>>);
        let mut registry = FunctionRegistry::new();

        loader
            .load_modules(
                &declared(&[("mod-a", "^1.0.0"), ("mod-b", "^2.0.0")]),
                &mut registry,
            )
            .await
            .unwrap();
        assert!(registry.contains("op-a"));
        assert!(registry.contains("op-b"));
        assert_eq!(registry.len(), 2);
    }
}
