//! Cross-crate rendering pipeline properties: merge associativity,
//! render idempotence, fetcher dedup and cycle detection through the
//! whole stack.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use causa_config::{ConfigurationReader, GetOptions, RawConfiguration};
use causa_engine::{ContextOptions, Error, RenderOptions, WorkspaceContext, secret_fetch_definition};
use causa_registry::{CallError, FunctionImplementation, ImplementationFactory, TypedFactory};
use causa_template::{FetcherSet, TemplateRenderer, contains_template, fetcher_fn};
use causa_test_utils::TestWorkspace;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

#[test]
fn test_merge_is_left_associative_across_readers() {
    let l1 = RawConfiguration::file("1", json!({ "a": { "list": [1] }, "x": "one" }));
    let l2 = RawConfiguration::file("2", json!({ "a": { "list": [2] }, "x": "two" }));
    let l3 = RawConfiguration::file("3", json!({ "a": { "other": true } }));

    let chained = ConfigurationReader::empty()
        .merged_with([l1.clone()])
        .merged_with([l2.clone()])
        .merged_with([l3.clone()]);
    let batched = ConfigurationReader::new(vec![l1, l2, l3]);

    assert_eq!(
        chained.get(None, GetOptions::safe()).unwrap(),
        batched.get(None, GetOptions::safe()).unwrap()
    );
    assert_eq!(
        batched.require("a.list", GetOptions::safe()).unwrap(),
        &json!([1, 2])
    );
}

#[tokio::test]
async fn test_render_without_templates_is_identity() {
    let tree = json!({
        "scalar": 1,
        "nested": { "list": [true, null, "x"] },
    });
    let renderer = TemplateRenderer::new();
    let rendered = renderer.render(&tree, &FetcherSet::new()).await.unwrap();
    assert_eq!(rendered, tree);
    assert!(!contains_template("$format", &tree));
}

#[tokio::test]
async fn test_contains_template_iff_render_alters() {
    let fetchers = FetcherSet::new().with(
        "always",
        fetcher_fn(|_| Box::pin(async { Ok(Some(json!("rendered"))) })),
    );
    let renderer = TemplateRenderer::new();

    let with_template = json!({ "a": [{ "$format": "${ always() }" }] });
    assert!(contains_template("$format", &with_template));
    assert_ne!(
        renderer.render(&with_template, &fetchers).await.unwrap(),
        with_template
    );

    let without_template = json!({ "a": [{ "$format_like": "x" }], "b": 2 });
    assert!(!contains_template("$format", &without_template));
    assert_eq!(
        renderer.render(&without_template, &fetchers).await.unwrap(),
        without_template
    );
}

#[tokio::test]
async fn test_duplicate_secret_references_fetch_once() {
    static BACKEND_CALLS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug, serde::Deserialize)]
    struct CountingSecretFetch {
        backend: String,
    }

    #[async_trait::async_trait]
    impl FunctionImplementation<WorkspaceContext> for CountingSecretFetch {
        fn supports(&self, _context: &WorkspaceContext) -> bool {
            self.backend == "counting"
        }

        async fn call(&self, _context: &WorkspaceContext) -> Result<Value, CallError> {
            BACKEND_CALLS.fetch_add(1, Ordering::SeqCst);
            Ok(json!("token"))
        }
    }

    let workspace = TestWorkspace::new();
    workspace.write_config(
        "",
        "causa.yaml",
        concat!(
            "workspace:\n  name: w\n",
            "causa:\n  secrets:\n    defaultBackend: counting\n",
            "secrets:\n  apiToken:\n    k: v\n",
            "first:\n  $format: \"${ secret('apiToken') }\"\n",
            "second:\n  $format: \"${ secret('apiToken') }\"\n",
        ),
    );

    let context = WorkspaceContext::init(
        ContextOptions::new()
            .with_working_directory(workspace.root())
            .with_functions(vec![Arc::new(TypedFactory::<
                WorkspaceContext,
                CountingSecretFetch,
            >::new(secret_fetch_definition()))
                as Arc<dyn ImplementationFactory<WorkspaceContext>>]),
    )
    .await
    .unwrap();

    let rendered = context
        .render(None, RenderOptions::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(causa_config::lookup(&rendered, "first"), Some(&json!("token")));
    assert_eq!(causa_config::lookup(&rendered, "second"), Some(&json!("token")));
    assert_eq!(BACKEND_CALLS.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_circular_reference_detected_through_engine() {
    let workspace = TestWorkspace::new();
    workspace.write_config(
        "",
        "causa.yaml",
        concat!(
            "workspace:\n  name: w\n",
            "x:\n  $format: \"${ configuration('y') }\"\n",
            "y:\n  $format: \"${ configuration('x') }\"\n",
        ),
    );

    let context = WorkspaceContext::init(
        ContextOptions::new().with_working_directory(workspace.root()),
    )
    .await
    .unwrap();

    let err = context
        .require_rendered("x", RenderOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Config(causa_config::Error::CircularReference { .. })
    ));
}

#[tokio::test]
async fn test_undefined_template_survives_render_round_trips() {
    let workspace = TestWorkspace::new();
    workspace.write_config(
        "",
        "causa.yaml",
        concat!(
            "workspace:\n  name: w\n",
            "maybe:\n  $format: \"${ configuration('absent') }\"\n",
        ),
    );

    let context = WorkspaceContext::init(
        ContextOptions::new().with_working_directory(workspace.root()),
    )
    .await
    .unwrap();

    let once = context
        .require_rendered("maybe", RenderOptions::default())
        .await
        .unwrap();
    assert_eq!(once, json!({ "$format": "${ configuration('absent') }" }));
}
