//! # decaf-core — Foundational Types for the Decaf Validator
//!
//! This crate defines the data model shared by every other crate in the
//! workspace: the compiled schema tree, the constraint vocabulary, field
//! paths, and the validation report. It carries no validation behavior;
//! constraint semantics live in `decaf-engine`, schema compilation in
//! `decaf-schema`.
//!
//! ## Key Design Principles
//!
//! 1. **Schemas are data.** A [`ModelSchema`] is an ordered list of
//!    [`FieldSpec`]s, each holding declarative [`ConstraintSpec`]s. Nothing
//!    in the tree is executable, so schemas serialize, compare structurally,
//!    and can be shared across threads without locking.
//!
//! 2. **Composition over inheritance.** A field that holds a structured value
//!    references another model by name ([`NestedRef`]). The validator
//!    resolves and recurses explicitly.
//!
//! 3. **Reports are values.** A [`ValidationReport`] is valid iff it has no
//!    errors; the invariant holds by construction.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `decaf-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod constraint;
pub mod digest;
pub mod error;
pub mod model;
pub mod path;
pub mod report;

// Re-export primary types for ergonomic imports.
pub use constraint::{
    ConstraintArg, ConstraintSpec, DateFormat, PatternKind, RegexPattern, TYPE_KIND,
};
pub use digest::SchemaFingerprint;
pub use error::SchemaError;
pub use model::{FieldSpec, ModelSchema, NestedRef};
pub use path::FieldPath;
pub use report::{FieldError, ValidationReport};
