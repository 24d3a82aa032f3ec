//! Full-stack missions: a workspace with modules, processors, secrets
//! and templates, exercised through the public context facade.

use std::sync::Arc;

use async_trait::async_trait;
use causa_config::GetOptions;
use causa_engine::{
    CAUSA_DIR, ContextOptions, MODULES_DIR, ProcessorInstruction, RenderOptions, WorkspaceContext,
    secret_fetch_definition,
};
use causa_modules::{EngineModule, FsModuleHost, ModuleHost, ModuleRegistration};
use causa_registry::{
    ArgumentSchema, CallError, FieldSpec, FunctionDefinition, FunctionImplementation,
    ImplementationFactory, TypedFactory,
};
use causa_test_utils::TestWorkspace;
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::{Map, Value, json};

/// Secret backend serving a small fixed store.
#[derive(Debug, Deserialize)]
struct StoreSecretFetch {
    backend: String,
    #[serde(default)]
    configuration: Map<String, Value>,
}

#[async_trait]
impl FunctionImplementation<WorkspaceContext> for StoreSecretFetch {
    fn supports(&self, _context: &WorkspaceContext) -> bool {
        self.backend == "store"
    }

    async fn call(&self, _context: &WorkspaceContext) -> Result<Value, CallError> {
        match self.configuration.get("key").and_then(Value::as_str) {
            Some("db-password") => Ok(json!("swordfish")),
            _ => Err(Box::new(causa_engine::Error::SecretValueNotFound)),
        }
    }
}

/// Processor deriving per-environment deployment configuration.
#[derive(Debug, Deserialize)]
struct TagProcessor {
    prefix: String,
}

#[async_trait]
impl FunctionImplementation<WorkspaceContext> for TagProcessor {
    fn supports(&self, _context: &WorkspaceContext) -> bool {
        true
    }

    async fn call(&self, context: &WorkspaceContext) -> Result<Value, CallError> {
        let environment = context.environment().unwrap_or("none");
        Ok(json!({
            "configuration": {
                "deployment": { "tag": format!("{}-{environment}", self.prefix) },
            },
            "extra": "ignored by the engine",
        }))
    }
}

fn tag_processor_definition() -> FunctionDefinition {
    FunctionDefinition::new("tag")
        .with_schema(ArgumentSchema::empty().field("prefix", FieldSpec::string()))
}

struct MissionModule;

#[async_trait]
impl EngineModule<WorkspaceContext> for MissionModule {
    async fn register(
        &self,
        registration: &mut ModuleRegistration<WorkspaceContext>,
    ) -> causa_modules::Result<()> {
        registration.register_function_implementations(vec![
            Arc::new(TypedFactory::<WorkspaceContext, StoreSecretFetch>::new(
                secret_fetch_definition(),
            )) as Arc<dyn ImplementationFactory<WorkspaceContext>>,
            Arc::new(TypedFactory::<WorkspaceContext, TagProcessor>::new(
                tag_processor_definition(),
            )),
        ]);
        Ok(())
    }
}

fn mission_workspace() -> TestWorkspace {
    let workspace = TestWorkspace::new();
    workspace.write_config(
        "",
        "causa.yaml",
        concat!(
            "workspace:\n",
            "  name: mission\n",
            "causa:\n",
            "  modules:\n",
            "    mission-mod: \"^1.0.0\"\n",
            "  secrets:\n",
            "    defaultBackend: store\n",
            "secrets:\n",
            "  dbPassword:\n",
            "    key: db-password\n",
            "database:\n",
            "  host: localhost\n",
            "  password:\n",
            "    $format: \"${ secret('dbPassword') }\"\n",
            "environments:\n",
            "  dev:\n",
            "    name: Development\n",
            "    configuration:\n",
            "      database:\n",
            "        host: dev.db.internal\n",
        ),
    );
    workspace.write_config(
        "api",
        "causa.yaml",
        concat!(
            "project:\n",
            "  name: api\n",
            "  type: service\n",
            "  language: rust\n",
        ),
    );
    workspace.write_file(
        &format!("{CAUSA_DIR}/{MODULES_DIR}/mission-mod/module.json"),
        r#"{ "name": "mission-mod", "version": "1.2.0" }"#,
    );
    workspace
}

fn mission_host(workspace: &TestWorkspace) -> Arc<dyn ModuleHost<WorkspaceContext>> {
    Arc::new(
        FsModuleHost::new(workspace.path(&format!("{CAUSA_DIR}/{MODULES_DIR}")))
            .with_module("mission-mod", Arc::new(MissionModule)),
    )
}

#[tokio::test]
async fn test_full_workspace_mission() {
    let workspace = mission_workspace();

    let context = WorkspaceContext::init(
        ContextOptions::new()
            .with_working_directory(workspace.path("api"))
            .with_environment("dev")
            .with_module_host(mission_host(&workspace))
            .with_processors(vec![ProcessorInstruction::new("tag").with_args(
                json!({ "prefix": "api" }).as_object().cloned().unwrap(),
            )]),
    )
    .await
    .unwrap();

    // Discovery: roots and environment overlay.
    assert!(context.project_path().is_some());
    assert_eq!(
        context.require("database.host", GetOptions::safe()).unwrap(),
        &json!("dev.db.internal")
    );

    // Processor output merged as a layer, history recorded.
    assert_eq!(
        context
            .require("deployment.tag", GetOptions::safe())
            .unwrap(),
        &json!("api-dev")
    );
    assert_eq!(context.processors().len(), 1);

    // Secrets resolve through the module-registered backend.
    let rendered = context
        .require_rendered("database", RenderOptions::default())
        .await
        .unwrap();
    assert_eq!(
        rendered,
        json!({ "host": "dev.db.internal", "password": "swordfish" })
    );

    // The unrendered tree still carries the template marker.
    let raw = context
        .require("database", GetOptions::unrendered())
        .unwrap();
    assert!(causa_template::contains_template("$format", raw));
}

#[tokio::test]
async fn test_mission_without_environment() {
    let workspace = mission_workspace();

    let context = WorkspaceContext::init(
        ContextOptions::new()
            .with_working_directory(workspace.path("api"))
            .with_module_host(mission_host(&workspace)),
    )
    .await
    .unwrap();

    assert_eq!(
        context.require("database.host", GetOptions::safe()).unwrap(),
        &json!("localhost")
    );
    assert_eq!(context.secret("dbPassword").await.unwrap(), "swordfish");
}

#[tokio::test]
async fn test_clone_switches_environment_and_reruns_processors() {
    let workspace = mission_workspace();

    let context = WorkspaceContext::init(
        ContextOptions::new()
            .with_working_directory(workspace.path("api"))
            .with_environment("dev")
            .with_module_host(mission_host(&workspace))
            .with_processors(vec![ProcessorInstruction::new("tag").with_args(
                json!({ "prefix": "api" }).as_object().cloned().unwrap(),
            )]),
    )
    .await
    .unwrap();

    let cloned = context
        .clone_with(ContextOptions::new().without_environment())
        .await
        .unwrap();

    // The processor reran against the cloned context's environment.
    assert_eq!(
        cloned.require("deployment.tag", GetOptions::safe()).unwrap(),
        &json!("api-none")
    );
    assert_eq!(
        cloned.require("database.host", GetOptions::safe()).unwrap(),
        &json!("localhost")
    );
}

#[tokio::test]
async fn test_workspace_wide_render_resolves_everything() {
    let workspace = mission_workspace();

    let context = WorkspaceContext::init(
        ContextOptions::new()
            .with_working_directory(workspace.path("api"))
            .with_module_host(mission_host(&workspace)),
    )
    .await
    .unwrap();

    let whole = context.render(None, RenderOptions::default()).await.unwrap().unwrap();
    assert_eq!(
        causa_config::lookup(&whole, "database.password"),
        Some(&json!("swordfish"))
    );
    assert!(!causa_template::contains_template("$format", &whole));
}
