//! Context initialization options

use std::path::PathBuf;
use std::sync::Arc;

use causa_modules::ModuleHost;
use causa_registry::ImplementationFactory;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::WorkspaceContext;

/// A three-state override for clone semantics: keep the current value,
/// clear it, or set a new one.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Override<T> {
    /// Keep whatever the cloned context has.
    #[default]
    Keep,
    /// Drop the current value.
    Clear,
    /// Use this value.
    Set(T),
}

/// One processor invocation: an operation name and its argument map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorInstruction {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl ProcessorInstruction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Map::new(),
        }
    }

    pub fn with_args(mut self, args: Map<String, Value>) -> Self {
        self.args = args;
        self
    }
}

/// Options for [`WorkspaceContext::init`] and
/// [`WorkspaceContext::clone_with`].
#[derive(Clone, Default)]
pub struct ContextOptions {
    /// Where discovery starts. Defaults to the process working
    /// directory on `init`, and to the cloned context's directory on
    /// `clone_with`.
    pub working_directory: Option<PathBuf>,

    /// Environment overlay selection.
    pub environment: Override<String>,

    /// Processors to run during initialization. On `clone_with`, the
    /// cloned context's processors are prepended unless this is
    /// [`Override::Clear`].
    pub processors: Override<Vec<ProcessorInstruction>>,

    /// Function implementations registered before modules load (the
    /// embedder's built-ins).
    pub functions: Vec<Arc<dyn ImplementationFactory<WorkspaceContext>>>,

    /// Source of workspace modules. Without a host, `causa.modules`
    /// entries are not loaded.
    pub module_host: Option<Arc<dyn ModuleHost<WorkspaceContext>>>,

    /// Template marker override; defaults to `$format`.
    pub template_marker: Option<String>,
}

impl ContextOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(path.into());
        self
    }

    pub fn with_environment(mut self, id: impl Into<String>) -> Self {
        self.environment = Override::Set(id.into());
        self
    }

    pub fn without_environment(mut self) -> Self {
        self.environment = Override::Clear;
        self
    }

    pub fn with_processors(mut self, processors: Vec<ProcessorInstruction>) -> Self {
        self.processors = Override::Set(processors);
        self
    }

    pub fn without_processors(mut self) -> Self {
        self.processors = Override::Clear;
        self
    }

    pub fn with_functions(
        mut self,
        functions: impl IntoIterator<Item = Arc<dyn ImplementationFactory<WorkspaceContext>>>,
    ) -> Self {
        self.functions.extend(functions);
        self
    }

    pub fn with_module_host(mut self, host: Arc<dyn ModuleHost<WorkspaceContext>>) -> Self {
        self.module_host = Some(host);
        self
    }

    pub fn with_template_marker(mut self, marker: impl Into<String>) -> Self {
        self.template_marker = Some(marker.into());
        self
    }
}

/// Options for rendering configuration values.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// When false, the injected `secret` fetcher returns the empty
    /// string instead of resolving.
    pub render_secrets: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            render_secrets: true,
        }
    }
}

impl RenderOptions {
    pub fn without_secrets() -> Self {
        Self {
            render_secrets: false,
        }
    }
}
