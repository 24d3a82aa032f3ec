//! The function registry

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::definition::FunctionDefinition;
use crate::error::{Error, Result};
use crate::implementation::{FunctionImplementation, ImplementationFactory};
use crate::validate::validate_map;

/// A definition together with its registered implementations, in
/// registration order.
pub struct RegisteredFunction<C> {
    definition: FunctionDefinition,
    implementations: Vec<Arc<dyn ImplementationFactory<C>>>,
}

impl<C> RegisteredFunction<C> {
    pub fn definition(&self) -> &FunctionDefinition {
        &self.definition
    }

    pub fn implementations(&self) -> &[Arc<dyn ImplementationFactory<C>>] {
        &self.implementations
    }
}

/// Maps operation names to definitions and implementations.
///
/// The registry is append-only while modules load and read-only
/// afterwards; selection between implementations happens per call via
/// `supports`, not at registration time.
pub struct FunctionRegistry<C> {
    functions: HashMap<String, RegisteredFunction<C>>,
}

impl<C> Default for FunctionRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> FunctionRegistry<C> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Register an implementation factory under its definition.
    ///
    /// The first registration under a name stores the definition; later
    /// registrations must carry a structurally equal definition.
    pub fn register(
        &mut self,
        definition: FunctionDefinition,
        factory: Arc<dyn ImplementationFactory<C>>,
    ) -> Result<()> {
        match self.functions.get_mut(definition.name()) {
            Some(entry) => {
                if entry.definition != definition {
                    return Err(Error::DefinitionMismatch {
                        name: definition.name().to_string(),
                    });
                }
                entry.implementations.push(factory);
            }
            None => {
                self.functions.insert(
                    definition.name().to_string(),
                    RegisteredFunction {
                        definition,
                        implementations: vec![factory],
                    },
                );
            }
        }
        Ok(())
    }

    /// Register several factories, each under its own definition.
    pub fn register_implementations(
        &mut self,
        factories: impl IntoIterator<Item = Arc<dyn ImplementationFactory<C>>>,
    ) -> Result<()> {
        for factory in factories {
            let definition = factory.definition().clone();
            self.register(definition, factory)?;
        }
        Ok(())
    }

    /// All registered definitions, sorted by name.
    pub fn definitions(&self) -> Vec<&FunctionDefinition> {
        let mut definitions: Vec<&FunctionDefinition> = self
            .functions
            .values()
            .map(RegisteredFunction::definition)
            .collect();
        definitions.sort_by(|a, b| a.name().cmp(b.name()));
        definitions
    }

    /// Look up a definition by name.
    pub fn definition(&self, name: &str) -> Option<&FunctionDefinition> {
        self.functions.get(name).map(RegisteredFunction::definition)
    }

    /// Whether an operation is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether no operation is registered.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Materialize every implementation of `name` with `args` and keep
    /// those supporting `context`, in registration order.
    pub fn implementations(
        &self,
        name: &str,
        args: &Map<String, Value>,
        context: &C,
    ) -> Result<Vec<Box<dyn FunctionImplementation<C>>>> {
        let entry = self
            .functions
            .get(name)
            .ok_or_else(|| Error::no_implementation(name))?;

        let mut supporting = Vec::new();
        for factory in &entry.implementations {
            let implementation = factory.materialize(args)?;
            if implementation.supports(context) {
                supporting.push(implementation);
            }
        }
        Ok(supporting)
    }

    /// Select the single supporting implementation of `name`.
    pub fn implementation(
        &self,
        name: &str,
        args: &Map<String, Value>,
        context: &C,
    ) -> Result<Box<dyn FunctionImplementation<C>>> {
        let mut supporting = self.implementations(name, args, context)?;
        match supporting.len() {
            0 => Err(Error::no_implementation(name)),
            1 => Ok(supporting.pop().expect("length checked")),
            count => Err(Error::TooManyImplementations {
                name: name.to_string(),
                count,
            }),
        }
    }

    /// Select and call the single supporting implementation.
    pub async fn call(
        &self,
        name: &str,
        args: &Map<String, Value>,
        context: &C,
    ) -> Result<Value> {
        let implementation = self.implementation(name, args, context)?;
        implementation.call(context).await.map_err(Error::Call)
    }

    /// Call every supporting implementation in registration order.
    pub async fn call_all(
        &self,
        name: &str,
        args: &Map<String, Value>,
        context: &C,
    ) -> Result<Vec<Value>> {
        let implementations = self.implementations(name, args, context)?;
        let mut results = Vec::with_capacity(implementations.len());
        for implementation in implementations {
            results.push(implementation.call(context).await.map_err(Error::Call)?);
        }
        Ok(results)
    }

    /// Validate an argument map against a registered definition's
    /// schema.
    ///
    /// Returns the definition on success so callers can chain into a
    /// call.
    pub fn validate_arguments(
        &self,
        name: &str,
        args: &Map<String, Value>,
    ) -> Result<&FunctionDefinition> {
        let entry = self
            .functions
            .get(name)
            .ok_or_else(|| Error::no_implementation(name))?;

        validate_map(entry.definition.schema(), args).map_err(|messages| {
            Error::InvalidArguments {
                name: name.to_string(),
                messages,
            }
        })?;
        Ok(&entry.definition)
    }
}
