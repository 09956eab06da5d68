//! # Exception Filter
//!
//! Per-request exclusion of fields from validation.
//!
//! An [`ExceptionSet`] holds dotted schema paths (`website`,
//! `category.description`). [`EffectiveSchema`] is a read-only view of a
//! registered model that hides every field whose full path is in the set.
//! Hiding a nested field hides its whole subtree, since the walk never
//! descends into it. The shared schema is not touched, so one compiled
//! model serves many requests with different exception sets.
//!
//! Paths name schema positions, not data positions: list elements carry
//! no index, so `lines.sku` excludes `sku` in every element of `lines`.

use std::collections::BTreeSet;

use decaf_core::{FieldPath, FieldSpec, ModelSchema, SchemaError};

use crate::registry::ModelRegistry;

/// Dotted field paths to skip for one validation request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionSet(BTreeSet<String>);

impl ExceptionSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated list such as `"website, category.description"`.
    ///
    /// Whitespace around entries is trimmed and empty entries are dropped,
    /// so the empty string yields the empty set.
    pub fn parse(list: &str) -> Self {
        Self(
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Returns true if `path` is excluded.
    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    /// Returns the number of excluded paths.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing is excluded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Excluded paths, sorted.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ExceptionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// A registered model seen through an [`ExceptionSet`].
#[derive(Debug, Clone, Copy)]
pub struct EffectiveSchema<'a> {
    registry: &'a ModelRegistry,
    root: &'a ModelSchema,
    exceptions: &'a ExceptionSet,
}

/// Build the effective view of `model` for one request.
///
/// Exception paths that name no field of the model tree are ignored and
/// logged at debug level.
///
/// # Errors
///
/// Returns [`SchemaError::NotCompiled`] if `model` is not registered.
pub fn filter<'a>(
    registry: &'a ModelRegistry,
    model: &str,
    exceptions: &'a ExceptionSet,
) -> Result<EffectiveSchema<'a>, SchemaError> {
    let root = registry.require(model)?;
    let view = EffectiveSchema {
        registry,
        root: root.as_ref(),
        exceptions,
    };
    for path in view.unmatched_exceptions() {
        tracing::debug!(model, path, "exception path matches no field");
    }
    Ok(view)
}

impl<'a> EffectiveSchema<'a> {
    /// The model being validated.
    pub fn root(&self) -> &'a ModelSchema {
        self.root
    }

    /// Resolve a nested model reference.
    pub fn model(&self, name: &str) -> Option<&'a ModelSchema> {
        self.registry.get(name).map(|schema| schema.as_ref())
    }

    /// The exception set this view applies.
    pub fn exceptions(&self) -> &'a ExceptionSet {
        self.exceptions
    }

    /// Returns true if the field at `schema_path` is hidden.
    pub fn is_excluded(&self, schema_path: &FieldPath) -> bool {
        self.exceptions.contains(schema_path.as_str())
    }

    /// The visible fields of `model`, paired with their schema paths.
    ///
    /// `prefix` is the schema path of the object holding the fields; the
    /// root model uses [`FieldPath::root`].
    pub fn fields<'s>(
        &'s self,
        model: &'a ModelSchema,
        prefix: &'s FieldPath,
    ) -> impl Iterator<Item = (FieldPath, &'a FieldSpec)> + 's {
        model.fields().iter().filter_map(move |field| {
            let path = prefix.child(&field.name);
            (!self.is_excluded(&path)).then_some((path, field))
        })
    }

    /// Exception paths that do not name a field reachable from the root.
    pub fn unmatched_exceptions(&self) -> Vec<&'a str> {
        self.exceptions
            .iter()
            .filter(|path| !self.resolves(path))
            .collect()
    }

    fn resolves(&self, path: &str) -> bool {
        let mut model = self.root;
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            let Some(field) = model.field(segment) else {
                return false;
            };
            if segments.peek().is_none() {
                return true;
            }
            let Some(nested) = field.nested.as_ref().and_then(|n| self.model(&n.model)) else {
                return false;
            };
            model = nested;
        }
        false
    }
}
