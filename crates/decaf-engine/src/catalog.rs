//! # Constraint Catalog
//!
//! Maps constraint kind names to the logic that evaluates them.
//!
//! The catalog is the single dispatch point between a declarative
//! [`ConstraintSpec`] and behavior: the validator looks up
//! [`ConstraintSpec::kind`] and calls the registered
//! [`ConstraintEvaluator`]. Built-in kinds are registered by
//! [`ConstraintCatalog::builtin`]; hosts add their own kinds by name
//! without touching the built-ins.
//!
//! ## Built-in Semantics
//!
//! | Kind         | Fails when                                                   |
//! |--------------|--------------------------------------------------------------|
//! | `Required`   | value is missing, `null`, or `""`                            |
//! | `MinLength`  | character/element count is below the bound, or no length    |
//! | `MaxLength`  | character/element count is above the bound, or no length    |
//! | `Min`        | value is not a number, or is below the bound                 |
//! | `Max`        | value is not a number, or is above the bound                 |
//! | `Pattern`    | value is not a string in the format                          |
//! | `EqualsPath` | the path does not resolve, or its value differs              |
//!
//! Length checks pass vacuously on absent values; the validator never
//! sends absent values to anything but `Required`, so this only matters
//! to hosts calling the catalog directly.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use decaf_core::{ConstraintArg, ConstraintSpec, PatternKind};
use decaf_schema::is_reserved_kind;
use regex::Regex;
use serde_json::Value;

use crate::context::{deep_equal, ValidationContext};
use crate::error::EngineError;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("email pattern compiles")
});

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:https?|ftp)://[^\s/$.?#][^\s]*$").expect("url pattern compiles")
});

const PASSWORD_MIN_CHARS: usize = 8;

/// Result of evaluating one constraint against one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The value satisfies the constraint.
    Pass,
    /// The value violates the constraint; the message says how.
    Fail(String),
}

impl Outcome {
    /// A failure with the given message.
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }

    /// Returns true for [`Outcome::Pass`].
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    fn check(ok: bool, message: impl FnOnce() -> String) -> Self {
        if ok {
            Self::Pass
        } else {
            Self::Fail(message())
        }
    }
}

/// Evaluation logic for one constraint kind.
///
/// Implementations must be pure: the outcome depends only on the
/// constraint parameters, the value, and the context.
pub trait ConstraintEvaluator: Send + Sync {
    /// Evaluate `constraint` against `value`, the field's own value.
    fn evaluate(
        &self,
        constraint: &ConstraintSpec,
        value: &Value,
        ctx: &ValidationContext<'_>,
    ) -> Outcome;
}

/// Returns true if `value` counts as absent: `null` or the empty string.
///
/// A missing key is presented to evaluators as `null`.
pub fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Short JSON type name for messages.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatched(constraint: &ConstraintSpec) -> Outcome {
    Outcome::fail(format!(
        "evaluator cannot handle constraint of kind '{}'",
        constraint.kind()
    ))
}

struct RequiredCheck;

impl ConstraintEvaluator for RequiredCheck {
    fn evaluate(&self, _: &ConstraintSpec, value: &Value, _: &ValidationContext<'_>) -> Outcome {
        Outcome::check(!is_absent(value), || "value is required".to_string())
    }
}

struct LengthCheck;

impl ConstraintEvaluator for LengthCheck {
    fn evaluate(&self, constraint: &ConstraintSpec, value: &Value, _: &ValidationContext<'_>) -> Outcome {
        if is_absent(value) {
            return Outcome::Pass;
        }
        let len = match value {
            Value::String(s) => s.chars().count(),
            Value::Array(items) => items.len(),
            other => {
                return Outcome::fail(format!("expected a string or list, found {}", type_name(other)))
            }
        };
        match *constraint {
            ConstraintSpec::MinLength(min) => {
                Outcome::check(len >= min, || format!("length {len} is below the minimum of {min}"))
            }
            ConstraintSpec::MaxLength(max) => {
                Outcome::check(len <= max, || format!("length {len} exceeds the maximum of {max}"))
            }
            _ => mismatched(constraint),
        }
    }
}

struct BoundCheck;

impl ConstraintEvaluator for BoundCheck {
    fn evaluate(&self, constraint: &ConstraintSpec, value: &Value, _: &ValidationContext<'_>) -> Outcome {
        let Some(n) = value.as_f64() else {
            return Outcome::fail(format!("expected a number, found {}", type_name(value)));
        };
        match *constraint {
            ConstraintSpec::Min(min) => Outcome::check(n >= min, || format!("{n} is less than {min}")),
            ConstraintSpec::Max(max) => {
                Outcome::check(n <= max, || format!("{n} is greater than {max}"))
            }
            _ => mismatched(constraint),
        }
    }
}

struct PatternCheck;

impl ConstraintEvaluator for PatternCheck {
    fn evaluate(&self, constraint: &ConstraintSpec, value: &Value, _: &ValidationContext<'_>) -> Outcome {
        let ConstraintSpec::Pattern(kind) = constraint else {
            return mismatched(constraint);
        };
        let Some(s) = value.as_str() else {
            return Outcome::fail(format!("expected {}, found {}", kind.describe(), type_name(value)));
        };
        let ok = match kind {
            PatternKind::Email => EMAIL_RE.is_match(s),
            PatternKind::Url => URL_RE.is_match(s),
            PatternKind::Date(format) => format.matches(s),
            PatternKind::Password => is_strong_password(s),
            PatternKind::Regex(re) => re.is_match(s),
        };
        Outcome::check(ok, || format!("{s:?} is not {}", kind.describe()))
    }
}

fn is_strong_password(s: &str) -> bool {
    s.chars().count() >= PASSWORD_MIN_CHARS
        && !s.chars().any(char::is_whitespace)
        && s.chars().any(|c| c.is_lowercase())
        && s.chars().any(|c| c.is_uppercase())
        && s.chars().any(|c| c.is_ascii_digit())
        && s.chars().any(|c| !c.is_alphanumeric())
}

struct EqualsCheck;

impl ConstraintEvaluator for EqualsCheck {
    fn evaluate(&self, constraint: &ConstraintSpec, value: &Value, ctx: &ValidationContext<'_>) -> Outcome {
        let ConstraintSpec::EqualsPath(path) = constraint else {
            return mismatched(constraint);
        };
        match ctx.resolve(path) {
            Ok(other) => Outcome::check(deep_equal(value, other), || {
                format!("value does not equal the value at '{path}'")
            }),
            Err(e) => Outcome::fail(e.to_string()),
        }
    }
}

/// Adapter turning a closure over custom arguments into an evaluator.
struct FnEvaluator<F>(F);

impl<F> ConstraintEvaluator for FnEvaluator<F>
where
    F: Fn(&[ConstraintArg], &Value, &ValidationContext<'_>) -> Outcome + Send + Sync,
{
    fn evaluate(&self, constraint: &ConstraintSpec, value: &Value, ctx: &ValidationContext<'_>) -> Outcome {
        let args = match constraint {
            ConstraintSpec::Custom { args, .. } => args.as_slice(),
            _ => &[],
        };
        (self.0)(args, value, ctx)
    }
}

/// Registry of constraint evaluators keyed by kind name.
pub struct ConstraintCatalog {
    evaluators: BTreeMap<String, Box<dyn ConstraintEvaluator>>,
}

impl ConstraintCatalog {
    /// A catalog holding exactly the built-in kinds.
    pub fn builtin() -> Self {
        let mut evaluators: BTreeMap<String, Box<dyn ConstraintEvaluator>> = BTreeMap::new();
        evaluators.insert("Required".into(), Box::new(RequiredCheck));
        evaluators.insert("MinLength".into(), Box::new(LengthCheck));
        evaluators.insert("MaxLength".into(), Box::new(LengthCheck));
        evaluators.insert("Min".into(), Box::new(BoundCheck));
        evaluators.insert("Max".into(), Box::new(BoundCheck));
        evaluators.insert("Pattern".into(), Box::new(PatternCheck));
        evaluators.insert("EqualsPath".into(), Box::new(EqualsCheck));
        Self { evaluators }
    }

    /// Register an evaluator for a new kind.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ReservedConstraint`] if the name belongs to a
    /// built-in decorator or kind (`min`, `Min`, `Type`), and
    /// [`EngineError::DuplicateConstraint`] if it is already registered.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        evaluator: impl ConstraintEvaluator + 'static,
    ) -> Result<(), EngineError> {
        let name = name.into();
        if is_reserved_kind(&name) {
            return Err(EngineError::ReservedConstraint { name });
        }
        if self.evaluators.contains_key(&name) {
            return Err(EngineError::DuplicateConstraint { name });
        }
        tracing::debug!(kind = %name, "registered constraint evaluator");
        self.evaluators.insert(name, Box::new(evaluator));
        Ok(())
    }

    /// Register a closure over the constraint's declared arguments.
    ///
    /// # Errors
    ///
    /// Same as [`ConstraintCatalog::register`].
    pub fn register_fn<F>(&mut self, name: impl Into<String>, f: F) -> Result<(), EngineError>
    where
        F: Fn(&[ConstraintArg], &Value, &ValidationContext<'_>) -> Outcome + Send + Sync + 'static,
    {
        self.register(name, FnEvaluator(f))
    }

    /// Returns true if an evaluator is registered for `kind`.
    pub fn contains(&self, kind: &str) -> bool {
        self.evaluators.contains_key(kind)
    }

    /// Registered kind names, sorted.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.evaluators.keys().map(String::as_str)
    }

    /// Evaluate one constraint. Unregistered kinds fail instead of panicking.
    pub fn evaluate(
        &self,
        constraint: &ConstraintSpec,
        value: &Value,
        ctx: &ValidationContext<'_>,
    ) -> Outcome {
        match self.evaluators.get(constraint.kind()) {
            Some(evaluator) => evaluator.evaluate(constraint, value, ctx),
            None => Outcome::fail(format!(
                "no evaluator registered for constraint '{}'",
                constraint.kind()
            )),
        }
    }
}

impl Default for ConstraintCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for ConstraintCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintCatalog")
            .field("kinds", &self.evaluators.keys().collect::<Vec<_>>())
            .finish()
    }
}
