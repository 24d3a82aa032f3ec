//! The workspace context
//!
//! A context is assembled once by [`WorkspaceContext::init`] and is
//! immutable afterwards. Processor application and `clone_with` both
//! produce new contexts; the previous one should be treated as
//! moved-from.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use causa_config::{ConfigurationReader, GetOptions, RawConfiguration};
use causa_discovery::{CausaSection, ProjectSection, discover_workspace};
use causa_modules::{ModuleHost, ModuleLoader};
use causa_registry::{
    FunctionDefinition, FunctionImplementation, FunctionRegistry, ImplementationFactory,
};
use causa_template::{DEFAULT_MARKER, Fetcher, FetcherSet, fetcher_fn};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::options::{ContextOptions, Override, ProcessorInstruction, RenderOptions};
use crate::secrets::SecretFetcher;
use crate::services::ServiceCache;
use crate::setup::FolderSetup;

/// Name under which the secret fetcher is injected into renders.
const SECRET_FETCHER: &str = "secret";

/// The public facade over a discovered, configured workspace.
#[derive(Clone)]
pub struct WorkspaceContext {
    working_directory: PathBuf,
    environment: Option<String>,
    root_path: PathBuf,
    project_path: Option<PathBuf>,
    reader: ConfigurationReader,
    registry: Arc<FunctionRegistry<WorkspaceContext>>,
    processors: Vec<ProcessorInstruction>,
    functions: Vec<Arc<dyn ImplementationFactory<WorkspaceContext>>>,
    module_host: Option<Arc<dyn ModuleHost<WorkspaceContext>>>,
    services: ServiceCache,
}

impl std::fmt::Debug for WorkspaceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceContext")
            .field("working_directory", &self.working_directory)
            .field("environment", &self.environment)
            .field("root_path", &self.root_path)
            .field("project_path", &self.project_path)
            .field("processors", &self.processors)
            .finish()
    }
}

impl WorkspaceContext {
    /// Initialize a context from a working directory.
    ///
    /// Discovery collects configuration files up the directory tree,
    /// the optional environment overlay is appended, embedder functions
    /// and workspace modules are registered, and processors run in
    /// order, each contributing a configuration layer.
    pub async fn init(options: ContextOptions) -> Result<Self> {
        let working_directory = match options.working_directory.clone() {
            Some(path) => path,
            None => std::env::current_dir()?,
        };
        let environment = match &options.environment {
            Override::Set(id) => Some(id.clone()),
            Override::Keep | Override::Clear => None,
        };

        let discovered = discover_workspace(&working_directory, environment.as_deref())?;
        let marker = options
            .template_marker
            .clone()
            .unwrap_or_else(|| DEFAULT_MARKER.to_string());
        let reader = ConfigurationReader::with_marker(marker, discovered.reader.layers().to_vec());

        let mut registry = FunctionRegistry::new();
        registry.register_implementations(options.functions.iter().cloned())?;

        if let Some(host) = &options.module_host {
            let causa: CausaSection = section(&reader, "causa")?;
            if !causa.modules.is_empty() {
                debug!(count = causa.modules.len(), "loading workspace modules");
                ModuleLoader::new(Arc::clone(host))
                    .load_modules(&causa.modules, &mut registry)
                    .await?;
            }
        }

        let mut context = Self {
            working_directory,
            environment,
            root_path: discovered.root_path,
            project_path: discovered.project_path,
            reader,
            registry: Arc::new(registry),
            processors: Vec::new(),
            functions: options.functions,
            module_host: options.module_host,
            services: ServiceCache::new(),
        };

        if let Override::Set(instructions) = options.processors {
            for instruction in instructions {
                context = context.apply_processor(instruction).await?;
            }
        }

        Ok(context)
    }

    /// Re-initialize with overrides.
    ///
    /// The current context's processors are prepended to any provided
    /// ones; pass [`Override::Clear`] to drop them instead.
    pub async fn clone_with(&self, options: ContextOptions) -> Result<Self> {
        let working_directory = options
            .working_directory
            .unwrap_or_else(|| self.working_directory.clone());
        let environment = match options.environment {
            Override::Keep => match &self.environment {
                Some(id) => Override::Set(id.clone()),
                None => Override::Clear,
            },
            other => other,
        };
        let processors = match options.processors {
            Override::Keep => self.processors.clone(),
            Override::Clear => Vec::new(),
            Override::Set(additional) => {
                let mut all = self.processors.clone();
                all.extend(additional);
                all
            }
        };
        let mut functions = self.functions.clone();
        functions.extend(options.functions);
        let module_host = options.module_host.or_else(|| self.module_host.clone());
        let template_marker = options
            .template_marker
            .unwrap_or_else(|| self.reader.marker().to_string());

        Self::init(ContextOptions {
            working_directory: Some(working_directory),
            environment,
            processors: Override::Set(processors),
            functions,
            module_host,
            template_marker: Some(template_marker),
        })
        .await
    }

    /// Validate, call and merge one processor instruction.
    async fn apply_processor(mut self, instruction: ProcessorInstruction) -> Result<Self> {
        debug!(processor = %instruction.name, "applying processor");
        self.registry
            .validate_arguments(&instruction.name, &instruction.args)?;
        let output = self
            .registry
            .call(&instruction.name, &instruction.args, &self)
            .await?;

        let configuration = output
            .as_object()
            .and_then(|map| map.get("configuration"))
            .filter(|value| value.is_object())
            .cloned()
            .ok_or_else(|| Error::InvalidProcessorOutput {
                name: instruction.name.clone(),
            })?;

        self.reader = self.reader.merged_with([RawConfiguration::processor(
            instruction.name.clone(),
            configuration,
        )]);
        self.processors.push(instruction);
        self.services = ServiceCache::new();
        Ok(self)
    }

    // --- Identity ---

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    /// The selected environment id, failing when none is set.
    pub fn require_environment(&self) -> Result<&str> {
        self.environment.as_deref().ok_or(Error::EnvironmentNotSet)
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn project_path(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }

    /// The project root, failing when the working directory is not
    /// inside a project.
    pub fn require_project_path(&self) -> Result<&Path> {
        self.project_path.as_deref().ok_or_else(|| Error::NotAProject {
            working_directory: self.working_directory.clone(),
        })
    }

    pub fn reader(&self) -> &ConfigurationReader {
        &self.reader
    }

    pub fn registry(&self) -> &FunctionRegistry<WorkspaceContext> {
        &self.registry
    }

    /// The processor instructions applied to this context, in order.
    pub fn processors(&self) -> &[ProcessorInstruction] {
        &self.processors
    }

    // --- Configuration access ---

    pub fn get(&self, path: Option<&str>, options: GetOptions) -> Result<Option<&Value>> {
        Ok(self.reader.get(path, options)?)
    }

    pub fn require(&self, path: &str, options: GetOptions) -> Result<&Value> {
        Ok(self.reader.require(path, options)?)
    }

    /// Render the value at `path` (or the whole tree), resolving
    /// templates through the built-in `configuration` and `secret`
    /// fetchers.
    pub async fn render(&self, path: Option<&str>, options: RenderOptions) -> Result<Option<Value>> {
        let fetchers = self.fetchers(options);
        self.reader
            .render(&fetchers, path)
            .await
            .map_err(Error::from_render)
    }

    /// Like [`render`](Self::render), but a missing path is an error.
    pub async fn require_rendered(&self, path: &str, options: RenderOptions) -> Result<Value> {
        let fetchers = self.fetchers(options);
        self.reader
            .require_rendered(&fetchers, path)
            .await
            .map_err(Error::from_render)
    }

    /// Deserialize the merged configuration into a typed view.
    pub fn as_config<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(self.reader.as_config()?)
    }

    fn fetchers(&self, options: RenderOptions) -> FetcherSet {
        let secret: Arc<dyn Fetcher> = if options.render_secrets {
            Arc::new(SecretFetcher::new(self.clone()))
        } else {
            fetcher_fn(|_| Box::pin(async { Ok(Some(Value::String(String::new()))) }))
        };
        FetcherSet::new().with(SECRET_FETCHER, secret)
    }

    // --- Function calls ---

    /// Call the single supporting implementation of a definition.
    pub async fn call(
        &self,
        definition: &FunctionDefinition,
        args: &Map<String, Value>,
    ) -> Result<Value> {
        Ok(self.registry.call(definition.name(), args, self).await?)
    }

    /// Call every supporting implementation, in registration order.
    pub async fn call_all(
        &self,
        definition: &FunctionDefinition,
        args: &Map<String, Value>,
    ) -> Result<Vec<Value>> {
        Ok(self.registry.call_all(definition.name(), args, self).await?)
    }

    /// Validate arguments against the registered definition, then call.
    pub async fn call_by_name(&self, name: &str, args: &Map<String, Value>) -> Result<Value> {
        self.registry.validate_arguments(name, args)?;
        Ok(self.registry.call(name, args, self).await?)
    }

    /// Validate an argument map, returning the definition on success.
    pub fn validate_function_arguments(
        &self,
        name: &str,
        args: &Map<String, Value>,
    ) -> Result<&FunctionDefinition> {
        Ok(self.registry.validate_arguments(name, args)?)
    }

    /// All registered definitions, sorted by name.
    pub fn function_definitions(&self) -> Vec<&FunctionDefinition> {
        self.registry.definitions()
    }

    /// The single implementation supporting this context.
    pub fn function_implementation(
        &self,
        definition: &FunctionDefinition,
        args: &Map<String, Value>,
    ) -> Result<Box<dyn FunctionImplementation<WorkspaceContext>>> {
        Ok(self.registry.implementation(definition.name(), args, self)?)
    }

    /// Every implementation supporting this context, in registration
    /// order.
    pub fn function_implementations(
        &self,
        definition: &FunctionDefinition,
        args: &Map<String, Value>,
    ) -> Result<Vec<Box<dyn FunctionImplementation<WorkspaceContext>>>> {
        Ok(self.registry.implementations(definition.name(), args, self)?)
    }

    // --- Projects and services ---

    /// Project directories under the workspace root.
    pub fn list_project_paths(&self) -> Result<Vec<PathBuf>> {
        Ok(causa_discovery::list_project_paths(&self.root_path)?)
    }

    /// Files matched by the project's `externalFiles` globs, resolved
    /// from the workspace root.
    pub fn project_external_paths(&self) -> Result<Vec<PathBuf>> {
        let project: ProjectSection = section(&self.reader, "project")?;
        Ok(causa_discovery::project_external_paths(
            &self.root_path,
            &project.external_files,
        )?)
    }

    /// Return the per-context singleton of type `T`, constructing it on
    /// first use.
    pub fn service<T, F>(&self, init: F) -> Arc<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce(&Self) -> T,
    {
        self.services.get_or_init(|| init(self))
    }

    /// Prepare the `.causa` folder for module installation, writing the
    /// declared-modules manifest the installer consumes.
    pub fn prepare_module_folder(&self) -> Result<PathBuf> {
        let causa: CausaSection = section(&self.reader, "causa")?;
        FolderSetup::new(&self.root_path).prepare(&causa.modules)
    }
}

/// Typed view of one reserved configuration section, defaulting when
/// the section is absent.
fn section<T: DeserializeOwned + Default>(reader: &ConfigurationReader, path: &str) -> Result<T> {
    match reader.get(Some(path), GetOptions::unrendered())? {
        Some(value) => {
            Ok(serde_json::from_value(value.clone()).map_err(causa_config::Error::from)?)
        }
        None => Ok(T::default()),
    }
}
