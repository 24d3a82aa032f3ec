//! Declarative argument schemas
//!
//! A definition declares, per argument field, the constraints its value
//! must satisfy and whether the field may be absent or null. Schemas are
//! data: the validator bridge interprets them against raw argument maps.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

/// A validation function for [`Constraint::Custom`].
pub type CustomCheck = Arc<dyn Fn(&Value) -> std::result::Result<(), String> + Send + Sync>;

/// A single field constraint.
#[derive(Clone)]
pub enum Constraint {
    /// The value must be a string.
    String,
    /// The value must be a string holding a syntactically valid email
    /// address.
    Email,
    /// The value must be a map.
    Object,
    /// A caller-supplied check. Equality compares the name only, so two
    /// schemas using the same named check compare equal.
    Custom { name: String, check: CustomCheck },
}

impl std::fmt::Debug for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => write!(f, "String"),
            Self::Email => write!(f, "Email"),
            Self::Object => write!(f, "Object"),
            Self::Custom { name, .. } => write!(f, "Custom({name})"),
        }
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String, Self::String) => true,
            (Self::Email, Self::Email) => true,
            (Self::Object, Self::Object) => true,
            (Self::Custom { name: a, .. }, Self::Custom { name: b, .. }) => a == b,
            _ => false,
        }
    }
}

/// Constraints and presence rules for one declared field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldSpec {
    constraints: Vec<Constraint>,
    allow_missing: bool,
    allow_null: bool,
}

impl FieldSpec {
    /// A required field with no value constraints.
    pub fn any() -> Self {
        Self::default()
    }

    /// A required string field.
    pub fn string() -> Self {
        Self {
            constraints: vec![Constraint::String],
            ..Self::default()
        }
    }

    /// A required email field.
    pub fn email() -> Self {
        Self {
            constraints: vec![Constraint::Email],
            ..Self::default()
        }
    }

    /// A required map field.
    pub fn object() -> Self {
        Self {
            constraints: vec![Constraint::Object],
            ..Self::default()
        }
    }

    /// A field validated by a named custom check.
    pub fn custom(
        name: impl Into<String>,
        check: impl Fn(&Value) -> std::result::Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            constraints: vec![Constraint::Custom {
                name: name.into(),
                check: Arc::new(check),
            }],
            ..Self::default()
        }
    }

    /// Add another constraint to this field.
    pub fn and(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Skip validation when the field is absent.
    pub fn optional(mut self) -> Self {
        self.allow_missing = true;
        self
    }

    /// Skip validation when the value is null.
    pub fn nullable(mut self) -> Self {
        self.allow_null = true;
        self
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn allows_missing(&self) -> bool {
        self.allow_missing
    }

    pub fn allows_null(&self) -> bool {
        self.allow_null
    }
}

/// The declared argument fields of a function definition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArgumentSchema {
    fields: BTreeMap<String, FieldSpec>,
}

impl ArgumentSchema {
    /// A schema declaring no fields; it validates only the empty map.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder-style field declaration.
    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.insert(name.into(), spec);
        self
    }

    /// Look up a declared field.
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Iterate declared fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Whether the schema declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
