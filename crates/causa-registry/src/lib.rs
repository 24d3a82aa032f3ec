//! Function registry with predicate-based dispatch.
//!
//! An abstract operation is a [`FunctionDefinition`]: a name, an
//! argument schema and a return hint. Concrete behavior comes from
//! implementations registered against the definition; each invocation
//! materializes an implementation from the caller's argument map and
//! asks it whether it `supports` the current context. Dispatch selects
//! the single supporting implementation.
//!
//! The registry is generic over the context type `C` so it can dispatch
//! against whatever context the embedding engine composes.

pub mod definition;
pub mod error;
pub mod implementation;
pub mod registry;
pub mod schema;
pub mod validate;

pub use definition::{FunctionDefinition, ReturnHint};
pub use error::{CallError, Error, Result};
pub use implementation::{FunctionImplementation, ImplementationFactory, TypedFactory};
pub use registry::{FunctionRegistry, RegisteredFunction};
pub use schema::{ArgumentSchema, Constraint, FieldSpec};
pub use validate::{EMPTY_OBJECT_MESSAGE, validate_map};
