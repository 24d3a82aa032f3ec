//! Secret resolution
//!
//! Secrets are declared under `secrets.<id>` as a map carrying an
//! optional `backend` and backend-specific fields. Resolution dispatches
//! the `secret-fetch` operation; backend implementations select
//! themselves by matching the `backend` argument in `supports`.

use async_trait::async_trait;
use causa_config::GetOptions;
use causa_registry::{ArgumentSchema, FieldSpec, FunctionDefinition, ReturnHint};
use causa_template::{FetchError, Fetcher};
use serde_json::{Map, Value};
use tracing::debug;

use crate::context::WorkspaceContext;
use crate::error::{Error, Result};

/// Name of the operation secret backends implement.
pub const SECRET_FETCH: &str = "secret-fetch";

/// The definition every secret backend registers against.
pub fn secret_fetch_definition() -> FunctionDefinition {
    FunctionDefinition::new(SECRET_FETCH)
        .with_schema(
            ArgumentSchema::empty()
                .field("backend", FieldSpec::string())
                .field("configuration", FieldSpec::object()),
        )
        .with_return(ReturnHint::String)
}

impl WorkspaceContext {
    /// Resolve the secret declared under `secrets.<id>`.
    ///
    /// The backend is the record's `backend` field, falling back to
    /// `causa.secrets.defaultBackend`. The record (minus `backend`) is
    /// passed to the selected implementation as its configuration.
    pub async fn secret(&self, id: &str) -> Result<String> {
        let record = self
            .reader()
            .require(&format!("secrets.{id}"), GetOptions::safe())?
            .clone();
        let record = match record {
            Value::Object(map) => map,
            _ => {
                return Err(Error::invalid_secret(
                    "Expected an object.",
                    Some(id.to_string()),
                ));
            }
        };

        let backend = match record.get("backend").and_then(Value::as_str) {
            Some(backend) => backend.to_string(),
            None => self
                .reader()
                .get(Some("causa.secrets.defaultBackend"), GetOptions::safe())?
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| Error::SecretBackendNotSpecified {
                    secret_id: id.to_string(),
                })?,
        };

        let mut configuration = record;
        configuration.remove("backend");

        let mut args = Map::new();
        args.insert("backend".to_string(), Value::String(backend.clone()));
        args.insert("configuration".to_string(), Value::Object(configuration));

        debug!(secret = id, backend = %backend, "fetching secret");
        let value = self
            .registry()
            .call(SECRET_FETCH, &args, self)
            .await
            .map_err(|err| translate_backend_error(err, id, &backend))?;

        match value {
            Value::String(secret) => Ok(secret),
            _ => Err(Error::invalid_secret(
                "Expected the backend to return a string.",
                Some(id.to_string()),
            )),
        }
    }
}

/// Targeted re-wrapping of backend dispatch failures.
///
/// A missing implementation means the backend id is unknown; an
/// implementation's own `InvalidSecretDefinition` gets the secret id
/// filled in. Everything else propagates unchanged.
fn translate_backend_error(err: causa_registry::Error, id: &str, backend: &str) -> Error {
    match err {
        causa_registry::Error::NoImplementationFound { .. } => Error::SecretBackendNotFound {
            backend: backend.to_string(),
        },
        causa_registry::Error::Call(inner) => match inner.downcast::<Error>() {
            Ok(engine_err) => match *engine_err {
                Error::InvalidSecretDefinition { message, .. } => Error::InvalidSecretDefinition {
                    message,
                    secret_id: Some(id.to_string()),
                },
                other => other,
            },
            Err(foreign) => Error::Registry(causa_registry::Error::Call(foreign)),
        },
        other => Error::Registry(other),
    }
}

/// The `secret(id)` fetcher injected into configuration renders.
pub(crate) struct SecretFetcher {
    context: WorkspaceContext,
}

impl SecretFetcher {
    pub(crate) fn new(context: WorkspaceContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Fetcher for SecretFetcher {
    async fn fetch(&self, args: &[Value]) -> std::result::Result<Option<Value>, FetchError> {
        let id = args
            .first()
            .and_then(Value::as_str)
            .ok_or("secret() requires a string id argument")?;
        let secret = self
            .context
            .secret(id)
            .await
            .map_err(|e| Box::new(e) as FetchError)?;
        Ok(Some(Value::String(secret)))
    }
}
