//! Implementation traits and typed factories

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::definition::FunctionDefinition;
use crate::error::{CallError, Error, Result};

/// A materialized function implementation.
///
/// Instances are constructed per invocation from the caller's argument
/// map, so `supports` may inspect arguments (via its own fields) as well
/// as the context. `supports` must be free of side effects.
#[async_trait]
pub trait FunctionImplementation<C>: std::fmt::Debug + Send + Sync {
    /// Whether this implementation handles the given context.
    fn supports(&self, context: &C) -> bool;

    /// Execute the operation.
    async fn call(&self, context: &C) -> std::result::Result<Value, CallError>;
}

/// Materializes implementations of one definition.
///
/// The factory is the compile-time association between a concrete
/// implementation type and its definition, replacing the prototype walk
/// a dynamic language would perform.
pub trait ImplementationFactory<C>: Send + Sync {
    /// The definition this factory's implementations realize.
    fn definition(&self) -> &FunctionDefinition;

    /// Construct an implementation from a raw argument map.
    ///
    /// Field population follows `serde` rules; extra keys are ignored
    /// here — whitelist semantics are the validator bridge's job.
    fn materialize(&self, args: &Map<String, Value>) -> Result<Box<dyn FunctionImplementation<C>>>;
}

/// An [`ImplementationFactory`] for any `Deserialize`-able
/// implementation type.
pub struct TypedFactory<C, T> {
    definition: FunctionDefinition,
    _impl: PhantomData<fn() -> T>,
    _context: PhantomData<fn(&C)>,
}

impl<C, T> TypedFactory<C, T>
where
    T: FunctionImplementation<C> + DeserializeOwned + 'static,
{
    pub fn new(definition: FunctionDefinition) -> Self {
        Self {
            definition,
            _impl: PhantomData,
            _context: PhantomData,
        }
    }
}

impl<C, T> ImplementationFactory<C> for TypedFactory<C, T>
where
    T: FunctionImplementation<C> + DeserializeOwned + 'static,
{
    fn definition(&self) -> &FunctionDefinition {
        &self.definition
    }

    fn materialize(&self, args: &Map<String, Value>) -> Result<Box<dyn FunctionImplementation<C>>> {
        let implementation: T =
            serde_json::from_value(Value::Object(args.clone())).map_err(|e| {
                Error::InvalidFunction {
                    message: format!(
                        "arguments for '{}' did not materialize: {e}",
                        self.definition.name()
                    ),
                }
            })?;
        Ok(Box::new(implementation))
    }
}
