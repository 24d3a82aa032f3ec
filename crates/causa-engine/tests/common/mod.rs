//! Shared fixtures for causa-engine integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use causa_engine::{WorkspaceContext, secret_fetch_definition};
use causa_registry::{
    ArgumentSchema, CallError, FieldSpec, FunctionDefinition, FunctionImplementation,
    ImplementationFactory, TypedFactory,
};
use serde::Deserialize;
use serde_json::{Map, Value, json};

/// A secret backend answering for `backend == "default"` with a fixed
/// value.
#[derive(Debug, Deserialize)]
pub struct OkSecretFetch {
    pub backend: String,
    #[serde(default)]
    #[allow(dead_code)]
    pub configuration: Map<String, Value>,
}

#[async_trait]
impl FunctionImplementation<WorkspaceContext> for OkSecretFetch {
    fn supports(&self, _context: &WorkspaceContext) -> bool {
        self.backend == "default"
    }

    async fn call(&self, _context: &WorkspaceContext) -> Result<Value, CallError> {
        Ok(json!("OK"))
    }
}

/// A secret backend answering for `backend == "mirror"` with the
/// record's `value` field.
#[derive(Debug, Deserialize)]
pub struct MirrorSecretFetch {
    pub backend: String,
    #[serde(default)]
    pub configuration: Map<String, Value>,
}

#[async_trait]
impl FunctionImplementation<WorkspaceContext> for MirrorSecretFetch {
    fn supports(&self, _context: &WorkspaceContext) -> bool {
        self.backend == "mirror"
    }

    async fn call(&self, _context: &WorkspaceContext) -> Result<Value, CallError> {
        match self.configuration.get("value") {
            Some(value) => Ok(value.clone()),
            None => Err(Box::new(causa_engine::Error::SecretValueNotFound)),
        }
    }
}

/// Factories for the secret backends above.
pub fn secret_backends() -> Vec<Arc<dyn ImplementationFactory<WorkspaceContext>>> {
    vec![
        Arc::new(TypedFactory::<WorkspaceContext, OkSecretFetch>::new(
            secret_fetch_definition(),
        )),
        Arc::new(TypedFactory::<WorkspaceContext, MirrorSecretFetch>::new(
            secret_fetch_definition(),
        )),
    ]
}

/// A processor contributing its `values` argument as configuration.
#[derive(Debug, Deserialize)]
pub struct SetValuesProcessor {
    #[serde(default)]
    pub values: Map<String, Value>,
}

#[async_trait]
impl FunctionImplementation<WorkspaceContext> for SetValuesProcessor {
    fn supports(&self, _context: &WorkspaceContext) -> bool {
        true
    }

    async fn call(&self, _context: &WorkspaceContext) -> Result<Value, CallError> {
        Ok(json!({ "configuration": Value::Object(self.values.clone()) }))
    }
}

pub fn set_values_definition() -> FunctionDefinition {
    FunctionDefinition::new("set-values")
        .with_schema(ArgumentSchema::empty().field("values", FieldSpec::object().optional()))
}

/// A processor whose output is not a valid processor result.
#[derive(Debug, Deserialize)]
pub struct BadProcessor {}

#[async_trait]
impl FunctionImplementation<WorkspaceContext> for BadProcessor {
    fn supports(&self, _context: &WorkspaceContext) -> bool {
        true
    }

    async fn call(&self, _context: &WorkspaceContext) -> Result<Value, CallError> {
        Ok(json!("not a processor result"))
    }
}

pub fn bad_processor_definition() -> FunctionDefinition {
    FunctionDefinition::new("bad-processor")
}

/// Factories for the processors above.
pub fn processors() -> Vec<Arc<dyn ImplementationFactory<WorkspaceContext>>> {
    vec![
        Arc::new(TypedFactory::<WorkspaceContext, SetValuesProcessor>::new(
            set_values_definition(),
        )),
        Arc::new(TypedFactory::<WorkspaceContext, BadProcessor>::new(
            bad_processor_definition(),
        )),
    ]
}
