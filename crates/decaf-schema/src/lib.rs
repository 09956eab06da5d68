//! # decaf-schema — Model Registry & Exception Filter
//!
//! Turns annotated model definitions into compiled [`ModelSchema`] trees
//! and derives per-request views of them.
//!
//! ## Model Registry (`registry`)
//!
//! [`ModelRegistry::compile`] accepts definition text in the annotated-model
//! notation:
//!
//! ```text
//! @model()
//! export class CategoryModel extends Model {
//!   @required()
//!   name!: string;
//!
//!   @required()
//!   @minlength(5)
//!   description!: string;
//! }
//! ```
//!
//! The text is tokenized (`lexer`), parsed into declarations (`parser`), and
//! lowered into schemas (`compiler`). Compiled schemas are cached by model
//! name and the whole text by its SHA-256 fingerprint, so compilation is
//! idempotent and repeated calls are cheap.
//!
//! ## Exception Filter (`filter`)
//!
//! [`ExceptionSet::parse`] reads a comma-separated list of dotted paths.
//! [`EffectiveSchema`] is a borrowed view of a registered model that skips
//! those paths, leaving the shared schema untouched.
//!
//! ## Crate Policy
//!
//! - Depends only on `decaf-core` internally.
//! - Compilation is pure: identical text yields structurally equal schemas.
//! - Any malformed or inconsistent definition fails with a
//!   [`SchemaError`](decaf_core::SchemaError); nothing is partially registered.

mod compiler;
pub mod filter;
mod lexer;
mod parser;
pub mod registry;

pub use compiler::is_reserved_kind;
pub use filter::{EffectiveSchema, ExceptionSet};
pub use registry::{CompiledDefinition, ModelRegistry};

pub use decaf_core::ModelSchema;
