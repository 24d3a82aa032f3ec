//! The validator bridge
//!
//! Interprets an [`ArgumentSchema`] against a raw argument map,
//! producing either success or the full list of human-readable failure
//! messages. Whitelist semantics: keys not declared by the schema are
//! rejected.

use serde_json::{Map, Value};
use validator::ValidateEmail;

use crate::schema::{ArgumentSchema, Constraint, FieldSpec};

/// The fixed failure message of the empty schema.
pub const EMPTY_OBJECT_MESSAGE: &str = "Expected the object to validate to be empty.";

/// Validate an argument map against a schema.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_map(
    schema: &ArgumentSchema,
    args: &Map<String, Value>,
) -> std::result::Result<(), Vec<String>> {
    if schema.is_empty() {
        if args.is_empty() {
            return Ok(());
        }
        return Err(vec![EMPTY_OBJECT_MESSAGE.to_string()]);
    }

    let mut messages = Vec::new();

    for key in args.keys() {
        if schema.get(key).is_none() {
            messages.push(format!("property '{key}' should not exist"));
        }
    }

    for (name, spec) in schema.fields() {
        validate_field(name, spec, args.get(name), &mut messages);
    }

    if messages.is_empty() {
        Ok(())
    } else {
        Err(messages)
    }
}

fn validate_field(name: &str, spec: &FieldSpec, value: Option<&Value>, messages: &mut Vec<String>) {
    match value {
        None => {
            if !spec.allows_missing() {
                messages.push(format!("property '{name}' is required"));
            }
        }
        Some(Value::Null) if spec.allows_null() => {}
        Some(value) => {
            for constraint in spec.constraints() {
                if let Err(message) = check_constraint(constraint, name, value) {
                    messages.push(message);
                }
            }
        }
    }
}

fn check_constraint(
    constraint: &Constraint,
    name: &str,
    value: &Value,
) -> std::result::Result<(), String> {
    match constraint {
        Constraint::String => {
            if value.is_string() {
                Ok(())
            } else {
                Err(format!("property '{name}' must be a string"))
            }
        }
        Constraint::Email => match value.as_str() {
            Some(text) if text.validate_email() => Ok(()),
            _ => Err(format!("property '{name}' must be a valid email address")),
        },
        Constraint::Object => {
            if value.is_object() {
                Ok(())
            } else {
                Err(format!("property '{name}' must be an object"))
            }
        }
        Constraint::Custom { check, .. } => {
            check(value).map_err(|reason| format!("property '{name}' {reason}"))
        }
    }
}
