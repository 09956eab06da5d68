//! # Compiled Model Schemas
//!
//! A [`ModelSchema`] is the compiled, immutable form of one declared model:
//! an ordered list of [`FieldSpec`]s. Declaration order is significant;
//! the validator reports errors in this order.
//!
//! Models reference each other by name through [`NestedRef`] rather than by
//! pointer, which keeps the tree serializable and allows recursive models
//! (a `TreeNode` with a `children: TreeNode[]` field) without cycles in
//! ownership.

use serde::{Deserialize, Serialize};

use crate::constraint::ConstraintSpec;
use crate::error::SchemaError;

/// The compiled schema of one named model.
///
/// # Invariants
///
/// - Field names are unique within the schema (checked by [`ModelSchema::new`]).
/// - The schema is never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSchema {
    name: String,
    fields: Vec<FieldSpec>,
}

impl ModelSchema {
    /// Build a schema, rejecting duplicate field names.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateField`] for the first repeated name.
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Result<Self, SchemaError> {
        let name = name.into();
        let mut seen = std::collections::HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    model: name,
                    field: field.name.clone(),
                });
            }
        }
        Ok(Self { name, fields })
    }

    /// The model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// One field of a model: its name, constraints, and optional nested model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name; one segment of a dotted path.
    pub name: String,
    /// Constraints in declaration order.
    pub constraints: Vec<ConstraintSpec>,
    /// Model the field's value is validated against, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<NestedRef>,
}

impl FieldSpec {
    /// A field with no constraints and no nested model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraints: Vec::new(),
            nested: None,
        }
    }

    /// Append a constraint.
    pub fn with_constraint(mut self, constraint: ConstraintSpec) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Validate the value against another model.
    pub fn with_nested(mut self, nested: NestedRef) -> Self {
        self.nested = Some(nested);
        self
    }

    /// Whether the field carries a [`ConstraintSpec::Required`].
    pub fn is_required(&self) -> bool {
        self.constraints.iter().any(ConstraintSpec::is_required)
    }
}

/// Reference from a field to the model its value is validated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedRef {
    /// Referenced model name.
    pub model: String,
    /// The field holds a list; each element is validated separately.
    #[serde(default)]
    pub many: bool,
}

impl NestedRef {
    /// Reference to a single nested object.
    pub fn one(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            many: false,
        }
    }

    /// Reference to a list of nested objects.
    pub fn many(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            many: true,
        }
    }
}
