//! # Validation Context & Cross-Field Resolution
//!
//! A [`ValidationContext`] is the read-only view of the data a constraint
//! may consult besides its own field value: the root object and the chain
//! of objects enclosing the field being checked.
//!
//! ## Path Syntax
//!
//! - `user.passwordRepeat` resolves from the root object.
//! - `lines.0.sku` indexes arrays with numeric segments.
//! - `../total` climbs out of the object holding the field before
//!   descending; each leading `../` goes up one more level.

use serde_json::Value;
use thiserror::Error;

/// A path that could not be followed through the data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// A segment named no key or index at its position.
    #[error("path '{path}' does not resolve: no value at '{segment}'")]
    Missing {
        /// The full path being resolved.
        path: String,
        /// First segment that could not be followed.
        segment: String,
    },

    /// The path climbs above the root object.
    #[error("path '{path}' climbs {levels} level(s) above the root")]
    AboveRoot {
        /// The full path being resolved.
        path: String,
        /// Levels of `../` beyond the root.
        levels: usize,
    },
}

/// Where in the data a constraint is being evaluated.
#[derive(Debug, Clone)]
pub struct ValidationContext<'a> {
    /// Enclosing objects, from the root (first) to the object holding the
    /// current field (last). Never empty.
    chain: Vec<&'a Value>,
}

impl<'a> ValidationContext<'a> {
    /// A context positioned at the root object.
    pub fn new(root: &'a Value) -> Self {
        Self { chain: vec![root] }
    }

    /// The top-level data object.
    pub fn root(&self) -> &'a Value {
        self.chain[0]
    }

    /// The object holding the field being validated.
    pub fn current(&self) -> &'a Value {
        self.chain[self.chain.len() - 1]
    }

    /// Nesting depth; zero at the root.
    pub fn depth(&self) -> usize {
        self.chain.len() - 1
    }

    /// A context one level deeper, positioned inside `object`.
    pub fn descend(&self, object: &'a Value) -> Self {
        let mut chain = self.chain.clone();
        chain.push(object);
        Self { chain }
    }

    /// Resolve a dotted path against the data.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError`] if a segment names nothing or the path
    /// climbs above the root.
    pub fn resolve(&self, path: &str) -> Result<&'a Value, ResolutionError> {
        let mut rest = path;
        let mut up = 0usize;
        while let Some(stripped) = rest.strip_prefix("../") {
            rest = stripped;
            up += 1;
        }

        let mut value = if up == 0 {
            self.root()
        } else if up <= self.depth() {
            self.chain[self.depth() - up]
        } else {
            return Err(ResolutionError::AboveRoot {
                path: path.to_string(),
                levels: up - self.depth(),
            });
        };

        for segment in rest.split('.').filter(|s| !s.is_empty()) {
            let next = match value {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            value = next.ok_or_else(|| ResolutionError::Missing {
                path: path.to_string(),
                segment: segment.to_string(),
            })?;
        }
        Ok(value)
    }
}

/// Structural equality of two JSON values, comparing numbers by value.
///
/// `1`, `1.0` and `1e0` are equal; object key order is irrelevant.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| deep_equal(x, y)))
        }
        _ => a == b,
    }
}
