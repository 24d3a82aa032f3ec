//! Function definitions

use crate::schema::ArgumentSchema;

/// A coarse description of what a function returns.
///
/// Definitions advertise their return shape so callers can reason about
/// outputs without materializing an implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnHint {
    /// Any value.
    #[default]
    Value,
    /// A string.
    String,
    /// A map.
    Map,
    /// A list.
    List,
    /// Nothing meaningful; callers ignore the result.
    Unit,
}

/// An abstract operation: a unique name, an argument schema and a return
/// hint. Definitions carry no runtime state.
///
/// Uniqueness within a registry is by name; registering a structurally
/// different definition under an existing name is rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    name: String,
    schema: ArgumentSchema,
    returns: ReturnHint,
}

impl FunctionDefinition {
    /// A definition with an empty schema (validates only empty
    /// arguments) returning any value.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: ArgumentSchema::empty(),
            returns: ReturnHint::default(),
        }
    }

    /// Attach an argument schema.
    pub fn with_schema(mut self, schema: ArgumentSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Declare the return shape.
    pub fn with_return(mut self, returns: ReturnHint) -> Self {
        self.returns = returns;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &ArgumentSchema {
        &self.schema
    }

    pub fn returns(&self) -> ReturnHint {
        self.returns
    }
}
