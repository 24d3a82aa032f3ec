//! Module loading through the workspace context.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use causa_engine::{CAUSA_DIR, ContextOptions, Error, MODULES_DIR, WorkspaceContext};
use causa_modules::{EngineModule, FsModuleHost, ModuleHost, ModuleRegistration};
use causa_registry::{ImplementationFactory, TypedFactory};
use causa_test_utils::TestWorkspace;

/// A module registering the shared test secret backends.
struct SecretsModule;

#[async_trait]
impl EngineModule<WorkspaceContext> for SecretsModule {
    async fn register(
        &self,
        registration: &mut ModuleRegistration<WorkspaceContext>,
    ) -> causa_modules::Result<()> {
        registration.register_function_implementations(common::secret_backends());
        Ok(())
    }
}

/// A module registering the shared test processors.
struct ProcessorsModule;

#[async_trait]
impl EngineModule<WorkspaceContext> for ProcessorsModule {
    async fn register(
        &self,
        registration: &mut ModuleRegistration<WorkspaceContext>,
    ) -> causa_modules::Result<()> {
        registration.register_function_implementations(vec![Arc::new(TypedFactory::<
            WorkspaceContext,
            common::SetValuesProcessor,
        >::new(
            common::set_values_definition(),
        ))
            as Arc<dyn ImplementationFactory<WorkspaceContext>>]);
        Ok(())
    }
}

fn write_manifest(workspace: &TestWorkspace, name: &str, version: &str) {
    workspace.write_file(
        &format!("{CAUSA_DIR}/{MODULES_DIR}/{name}/module.json"),
        &format!(r#"{{ "name": "{name}", "version": "{version}" }}"#),
    );
}

fn host(workspace: &TestWorkspace) -> Arc<dyn ModuleHost<WorkspaceContext>> {
    Arc::new(
        FsModuleHost::new(workspace.path(&format!("{CAUSA_DIR}/{MODULES_DIR}")))
            .with_module("secrets-mod", Arc::new(SecretsModule))
            .with_module("processors-mod", Arc::new(ProcessorsModule)),
    )
}

#[tokio::test]
async fn test_modules_register_implementations() {
    let workspace = TestWorkspace::new();
    workspace.write_config(
        "",
        "causa.yaml",
        concat!(
            "workspace:\n  name: w\n",
            "causa:\n",
            "  modules:\n",
            "    secrets-mod: \"^1.0.0\"\n",
            "    processors-mod: \"^2.1.0\"\n",
            "secrets:\n  s1:\n    backend: mirror\n    value: from-module\n",
        ),
    );
    write_manifest(&workspace, "secrets-mod", "1.4.2");
    write_manifest(&workspace, "processors-mod", "2.3.0");

    let context = WorkspaceContext::init(
        ContextOptions::new()
            .with_working_directory(workspace.root())
            .with_module_host(host(&workspace)),
    )
    .await
    .unwrap();

    // Implementations from both concurrently-loaded modules are live.
    assert_eq!(context.secret("s1").await.unwrap(), "from-module");
    assert!(context.registry().contains("set-values"));
}

#[tokio::test]
async fn test_incompatible_module_version_rejects_init() {
    let workspace = TestWorkspace::new();
    workspace.write_config(
        "",
        "causa.yaml",
        concat!(
            "workspace:\n  name: w\n",
            "causa:\n  modules:\n    some-mod: \"^2.0.0\"\n",
        ),
    );
    write_manifest(&workspace, "some-mod", "1.3.0");

    let err = WorkspaceContext::init(
        ContextOptions::new()
            .with_working_directory(workspace.root())
            .with_module_host(Arc::new(
                FsModuleHost::new(workspace.path(&format!("{CAUSA_DIR}/{MODULES_DIR}")))
                    .with_module("some-mod", Arc::new(SecretsModule)),
            )),
    )
    .await
    .unwrap_err();

    match &err {
        Error::Modules(module_err) => {
            assert!(module_err.requires_module_install());
            let text = module_err.to_string();
            assert!(text.contains("some-mod"));
            assert!(text.contains("1.3.0"));
            assert!(text.contains("^2.0.0"));
        }
        other => panic!("expected module error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_module_rejects_init() {
    let workspace = TestWorkspace::new();
    workspace.write_config(
        "",
        "causa.yaml",
        concat!(
            "workspace:\n  name: w\n",
            "causa:\n  modules:\n    ghost-mod: \"^1.0.0\"\n",
        ),
    );

    let err = WorkspaceContext::init(
        ContextOptions::new()
            .with_working_directory(workspace.root())
            .with_module_host(host(&workspace)),
    )
    .await
    .unwrap_err();

    match &err {
        Error::Modules(module_err) => {
            assert!(matches!(
                module_err,
                causa_modules::Error::NotFound { name } if name == "ghost-mod"
            ));
            assert!(module_err.requires_module_install());
        }
        other => panic!("expected module error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_file_spec_module_skips_version_check() {
    let workspace = TestWorkspace::new();
    workspace.write_config(
        "",
        "causa.yaml",
        concat!(
            "workspace:\n  name: w\n",
            "causa:\n  modules:\n    processors-mod: \"file:../processors-mod\"\n",
        ),
    );
    // No manifest on disk; the file: spec must not require one.

    let context = WorkspaceContext::init(
        ContextOptions::new()
            .with_working_directory(workspace.root())
            .with_module_host(host(&workspace)),
    )
    .await
    .unwrap();

    assert!(context.registry().contains("set-values"));
}

#[tokio::test]
async fn test_no_host_skips_module_loading() {
    let workspace = TestWorkspace::new();
    workspace.write_config(
        "",
        "causa.yaml",
        concat!(
            "workspace:\n  name: w\n",
            "causa:\n  modules:\n    secrets-mod: \"^1.0.0\"\n",
        ),
    );

    let context = WorkspaceContext::init(
        ContextOptions::new().with_working_directory(workspace.root()),
    )
    .await
    .unwrap();
    assert!(context.registry().is_empty());
}
