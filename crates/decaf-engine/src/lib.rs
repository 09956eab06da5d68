//! # decaf-engine — Validation Engine
//!
//! Checks JSON data against compiled model schemas and hands the outcome
//! back to the host in the form it asked for.
//!
//! ## Pipeline
//!
//! ```text
//! ModelRegistry ──filter──▶ EffectiveSchema ──Validator──▶ ValidationReport ──route──▶ RoutedOutcome
//!                              (exceptions)      │
//!                                                ▼
//!                                        ConstraintCatalog
//! ```
//!
//! - [`ConstraintCatalog`] maps constraint kind names to evaluators. The
//!   built-in kinds are always present; hosts add their own by name.
//! - [`Validator`] walks an [`EffectiveSchema`](decaf_schema::EffectiveSchema)
//!   depth-first and never stops early: every failing constraint on every
//!   visible field is reported.
//! - [`ValidationContext`] gives constraints such as `EqualsPath` read
//!   access to the root object and the chain of enclosing objects.
//! - [`route`] turns a report into a passthrough, a raised
//!   [`AggregateValidationError`], or annotated data, depending on the
//!   host's failure policy.
//! - [`Engine`] bundles registry, catalog and routing behind a single
//!   [`Engine::run`] call per data item.
//!
//! ## Crate Policy
//!
//! - Validation is pure and synchronous. No I/O, no global state.
//! - Data failures are values ([`ValidationReport`](decaf_core::ValidationReport)),
//!   never `Err`. Only operational problems surface as [`EngineError`].

pub mod aggregate;
pub mod catalog;
pub mod context;
pub mod engine;
pub mod error;
pub mod router;
pub mod validator;

pub use aggregate::{aggregate, ErrorAggregator};
pub use catalog::{ConstraintCatalog, ConstraintEvaluator, Outcome};
pub use context::{deep_equal, ResolutionError, ValidationContext};
pub use engine::{Engine, ValidationRequest};
pub use error::EngineError;
pub use router::{route, AggregateValidationError, ErrorContext, HostItem, PairedItem, RoutedOutcome};
pub use validator::{Validator, TYPE_KIND};
