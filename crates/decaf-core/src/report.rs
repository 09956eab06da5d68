//! # Validation Reports
//!
//! [`FieldError`] records one failed constraint on one field;
//! [`ValidationReport`] is the ordered result of one validation call.
//! A report is valid iff it holds no errors, and the type makes it
//! impossible to construct one that says otherwise.

use std::fmt;

use serde::Serialize;

use crate::path::FieldPath;

/// A single constraint failure on a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    /// Dotted path of the failing field, from the root data object.
    pub path: FieldPath,
    /// Kind name of the failing constraint (`Required`, `Pattern`, ...).
    pub constraint_kind: String,
    /// Human-readable description of the failure.
    pub message: String,
}

impl FieldError {
    /// Create a field error.
    pub fn new(
        path: FieldPath,
        constraint_kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path,
            constraint_kind: constraint_kind.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {} [{}]: {}", self.path, self.constraint_kind, self.message)
    }
}

/// The outcome of validating one data object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    valid: bool,
    errors: Vec<FieldError>,
}

impl ValidationReport {
    /// A report with no errors.
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// A report holding `errors` in the given order.
    pub fn from_errors(errors: Vec<FieldError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Returns true if no constraint failed.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// All failures, in schema declaration order.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Returns the number of failures.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if there are no failures.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Failures recorded at exactly `path`.
    pub fn errors_at<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a FieldError> {
        self.errors.iter().filter(move |e| e.path.as_str() == path)
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            return f.write_str("valid");
        }
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}
