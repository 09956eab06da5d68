//! Error types for the validation engine.

use decaf_core::SchemaError;
use thiserror::Error;

/// Operational failure of the engine.
///
/// A data object that violates its schema is not an `EngineError`; that
/// outcome is a [`ValidationReport`](decaf_core::ValidationReport).
#[derive(Error, Debug)]
pub enum EngineError {
    /// A definition failed to compile.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Validation was requested against a model that was never compiled.
    #[error("model '{model}' is not compiled")]
    UnknownModel {
        /// Requested model name.
        model: String,
    },

    /// A custom constraint name collides with a built-in decorator or kind.
    #[error("constraint name '{name}' is reserved by a built-in constraint")]
    ReservedConstraint {
        /// The rejected name.
        name: String,
    },

    /// A constraint evaluator is already registered under this kind name.
    #[error("constraint kind '{name}' is already registered")]
    DuplicateConstraint {
        /// Kind name that was registered twice.
        name: String,
    },
}
