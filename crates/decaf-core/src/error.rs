//! # Schema Compilation Errors
//!
//! Defines [`SchemaError`], the single error type for malformed or
//! self-inconsistent model definitions. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Every variant names the model and, where one exists, the field that
//!   triggered it, so an operator can locate the offending declaration.
//! - A `SchemaError` is fatal to the definition that produced it. Nothing
//!   downstream validates against a definition that failed to compile.
//! - Failures of *data* against a schema are never errors; they are
//!   [`ValidationReport`](crate::ValidationReport) values.

use thiserror::Error;

/// Error raised while compiling a model definition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// The definition text is not well-formed notation.
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        /// 1-based line of the offending token.
        line: usize,
        /// 1-based column of the offending token.
        column: usize,
        /// What the parser expected or found.
        message: String,
    },

    /// A field carries a decorator that is neither built in nor registered.
    #[error("unknown constraint '@{decorator}' on {model}.{field}")]
    UnknownConstraint {
        /// Model declaring the field.
        model: String,
        /// Field carrying the decorator.
        field: String,
        /// Decorator name as written.
        decorator: String,
    },

    /// A constraint was declared without a parameter it requires.
    #[error("constraint '@{constraint}' on {model}.{field} requires {expected}")]
    MissingParameter {
        /// Model declaring the field.
        model: String,
        /// Field carrying the constraint.
        field: String,
        /// Decorator name.
        constraint: String,
        /// Description of the missing parameter.
        expected: String,
    },

    /// A constraint parameter is present but unusable.
    #[error("invalid parameter for '@{constraint}' on {model}.{field}: {reason}")]
    InvalidParameter {
        /// Model declaring the field.
        model: String,
        /// Field carrying the constraint.
        field: String,
        /// Decorator name.
        constraint: String,
        /// Why the parameter was rejected.
        reason: String,
    },

    /// A field type names a model that is not declared anywhere.
    #[error("field {model}.{field} references undeclared model '{reference}'")]
    UnknownModel {
        /// Model declaring the field.
        model: String,
        /// Field whose type is unresolved.
        field: String,
        /// The unresolved model name.
        reference: String,
    },

    /// Two fields of one model share a name.
    #[error("duplicate field '{field}' in model {model}")]
    DuplicateField {
        /// Model declaring the fields.
        model: String,
        /// The colliding field name.
        field: String,
    },

    /// One definition text declares the same model twice.
    #[error("model {model} is declared more than once")]
    DuplicateModel {
        /// The colliding model name.
        model: String,
    },

    /// A model name is already registered with a different structure.
    #[error("model {model} is already registered with a different definition")]
    ConflictingModel {
        /// The conflicting model name.
        model: String,
    },

    /// A custom constraint name collides with a built-in decorator or
    /// constraint kind.
    #[error("constraint name '{name}' is reserved by a built-in constraint")]
    ReservedConstraint {
        /// The rejected name.
        name: String,
    },

    /// A lookup named a model that has not been compiled.
    #[error("model {model} has not been compiled")]
    NotCompiled {
        /// The requested model name.
        model: String,
    },
}
