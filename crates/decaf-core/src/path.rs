//! # Field Paths
//!
//! Dotted paths identifying a field inside a data object, e.g.
//! `category.description` or `items.2.name`. The root object has the
//! empty path.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A dotted path from the root data object to a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    /// The path of the root object.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Wrap an already dotted path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns true for the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The path of a named child field.
    pub fn child(&self, segment: &str) -> Self {
        if self.is_root() {
            Self(segment.to_string())
        } else {
            Self(format!("{}.{segment}", self.0))
        }
    }

    /// The path of an element of a sequence held at this path.
    pub fn index(&self, index: usize) -> Self {
        self.child(&index.to_string())
    }

    /// Iterate the dotted segments. The root path has none.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.').filter(|s| !s.is_empty())
    }

    /// Returns true if `self` equals `other` or lies beneath it.
    pub fn starts_with(&self, other: &FieldPath) -> bool {
        other.is_root()
            || self.0 == other.0
            || (self.0.starts_with(&other.0) && self.0[other.0.len()..].starts_with('.'))
    }

    /// The dotted string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("(root)")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}
