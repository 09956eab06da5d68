//! # Validator
//!
//! Depth-first walk of a data object against an [`EffectiveSchema`].
//!
//! ## Walk Rules
//!
//! For each visible field, in declaration order:
//!
//! 1. The value is read from the enclosing object. A missing key reads as
//!    `null`.
//! 2. If the value is absent (`null` or `""`), only `Required` runs. The
//!    field yields at most one error and nested recursion is skipped.
//! 3. Otherwise every constraint runs, and every failure is recorded.
//! 4. A field with a nested model recurses into its value. A list field
//!    recurses into each element, reporting paths such as `lines.2.sku`.
//!
//! A nested value of the wrong JSON type yields a single `Type` error on
//! that field instead of a recursion. The walk never stops early.

use decaf_core::{ConstraintSpec, FieldError, FieldPath, ModelSchema, NestedRef, ValidationReport};
use decaf_schema::EffectiveSchema;
use serde_json::Value;

use crate::aggregate::ErrorAggregator;
use crate::catalog::{is_absent, type_name, ConstraintCatalog, Outcome};
use crate::context::ValidationContext;

pub use decaf_core::TYPE_KIND;

static NULL: Value = Value::Null;

/// Validates data against effective schemas using a constraint catalog.
///
/// A `Validator` holds no per-call state and can be shared across threads.
#[derive(Debug, Default)]
pub struct Validator {
    catalog: ConstraintCatalog,
}

/// Paths of the object being walked: in the schema (no indices) and in
/// the data (with list indices).
struct Position<'p> {
    schema: &'p FieldPath,
    data: &'p FieldPath,
}

impl Validator {
    /// A validator dispatching through `catalog`.
    pub fn new(catalog: ConstraintCatalog) -> Self {
        Self { catalog }
    }

    /// The constraint catalog.
    pub fn catalog(&self) -> &ConstraintCatalog {
        &self.catalog
    }

    /// Mutable access for registering custom constraint kinds.
    pub fn catalog_mut(&mut self) -> &mut ConstraintCatalog {
        &mut self.catalog
    }

    /// Validate `data` against `schema`.
    ///
    /// Always returns a complete report; data problems are never errors.
    pub fn validate(&self, schema: &EffectiveSchema<'_>, data: &Value) -> ValidationReport {
        let mut out = ErrorAggregator::new();
        let root = FieldPath::root();

        if data.is_object() {
            let ctx = ValidationContext::new(data);
            let at = Position {
                schema: &root,
                data: &root,
            };
            self.walk_object(schema, schema.root(), data, &at, &ctx, &mut out);
        } else {
            out.push(FieldError::new(
                root,
                TYPE_KIND,
                format!(
                    "expected a {} object, found {}",
                    schema.root().name(),
                    type_name(data)
                ),
            ));
        }

        let report = out.finish();
        tracing::debug!(
            model = schema.root().name(),
            valid = report.is_valid(),
            errors = report.len(),
            "validation finished"
        );
        report
    }

    fn walk_object<'s, 'd>(
        &self,
        schema: &EffectiveSchema<'s>,
        model: &'s ModelSchema,
        object: &'d Value,
        at: &Position<'_>,
        ctx: &ValidationContext<'d>,
        out: &mut ErrorAggregator,
    ) {
        for (schema_path, field) in schema.fields(model, at.schema) {
            let data_path = at.data.child(&field.name);
            let value = object.get(&field.name).unwrap_or(&NULL);

            if is_absent(value) {
                if let Some(required) = field.constraints.iter().find(|c| c.is_required()) {
                    self.check(required, value, &data_path, ctx, out);
                }
                continue;
            }

            for constraint in &field.constraints {
                self.check(constraint, value, &data_path, ctx, out);
            }

            if let Some(nested) = &field.nested {
                let at = Position {
                    schema: &schema_path,
                    data: &data_path,
                };
                self.walk_nested(schema, nested, value, &at, ctx, out);
            }
        }
    }

    fn walk_nested<'s, 'd>(
        &self,
        schema: &EffectiveSchema<'s>,
        nested: &NestedRef,
        value: &'d Value,
        at: &Position<'_>,
        ctx: &ValidationContext<'d>,
        out: &mut ErrorAggregator,
    ) {
        let Some(model) = schema.model(&nested.model) else {
            out.push(FieldError::new(
                at.data.clone(),
                TYPE_KIND,
                format!("model '{}' is not registered", nested.model),
            ));
            return;
        };

        if !nested.many {
            self.walk_member(schema, model, value, at, ctx, out);
            return;
        }

        let Value::Array(items) = value else {
            out.push(FieldError::new(
                at.data.clone(),
                TYPE_KIND,
                format!("expected a list of {}, found {}", model.name(), type_name(value)),
            ));
            return;
        };
        for (i, item) in items.iter().enumerate() {
            let item_path = at.data.index(i);
            let at = Position {
                schema: at.schema,
                data: &item_path,
            };
            self.walk_member(schema, model, item, &at, ctx, out);
        }
    }

    fn walk_member<'s, 'd>(
        &self,
        schema: &EffectiveSchema<'s>,
        model: &'s ModelSchema,
        value: &'d Value,
        at: &Position<'_>,
        ctx: &ValidationContext<'d>,
        out: &mut ErrorAggregator,
    ) {
        if value.is_object() {
            self.walk_object(schema, model, value, at, &ctx.descend(value), out);
        } else {
            out.push(FieldError::new(
                at.data.clone(),
                TYPE_KIND,
                format!("expected a {} object, found {}", model.name(), type_name(value)),
            ));
        }
    }

    fn check(
        &self,
        constraint: &ConstraintSpec,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext<'_>,
        out: &mut ErrorAggregator,
    ) {
        let outcome = self.catalog.evaluate(constraint, value, ctx);
        tracing::trace!(%path, kind = constraint.kind(), pass = outcome.is_pass(), "evaluated constraint");
        if let Outcome::Fail(message) = outcome {
            out.push(FieldError::new(path.clone(), constraint.kind(), message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decaf_schema::{filter::filter, ExceptionSet, ModelRegistry};
    use serde_json::json;

    const MODELS: &str = r#"
        class CategoryModel {
          @required() name!: string;
          @required() @minlength(5) description!: string;
        }
        class Line {
          @required() sku!: string;
          @min(1) qty!: number;
          @eq("../currency") currency?: string;
        }
        class Order {
          @required() currency!: string;
          category?: CategoryModel;
          lines!: Line[];
        }
    "#;

    fn run(model: &str, exceptions: &str, data: Value) -> ValidationReport {
        let mut registry = ModelRegistry::new();
        registry.compile(MODELS).unwrap();
        let exceptions = ExceptionSet::parse(exceptions);
        let view = filter(&registry, model, &exceptions).unwrap();
        Validator::default().validate(&view, &data)
    }

    fn paths(report: &ValidationReport) -> Vec<(String, String)> {
        report
            .errors()
            .iter()
            .map(|e| (e.path.as_str().to_string(), e.constraint_kind.clone()))
            .collect()
    }

    fn pair(path: &str, kind: &str) -> (String, String) {
        (path.to_string(), kind.to_string())
    }

    #[test]
    fn test_nested_error_path() {
        let report = run("CategoryModel", "", json!({"name": "Books"}));
        assert_eq!(paths(&report), vec![pair("description", "Required")]);

        let report = run(
            "Order",
            "",
            json!({"currency": "EUR", "category": {"name": "Books"}, "lines": []}),
        );
        assert_eq!(paths(&report), vec![pair("category.description", "Required")]);
    }

    #[test]
    fn test_absent_value_runs_only_required() {
        let report = run("CategoryModel", "", json!({"name": "", "description": null}));
        assert_eq!(
            paths(&report),
            vec![pair("name", "Required"), pair("description", "Required")]
        );
    }

    #[test]
    fn test_absent_optional_nested_is_silent() {
        let report = run("Order", "", json!({"currency": "EUR", "lines": []}));
        assert!(report.is_valid(), "{report}");
    }

    #[test]
    fn test_list_elements_indexed_and_ancestor_paths() {
        let data = json!({
            "currency": "EUR",
            "lines": [
                {"sku": "A", "qty": 2, "currency": "EUR"},
                {"sku": "", "qty": 0, "currency": "USD"},
                "oops"
            ]
        });
        let report = run("Order", "", data);
        assert_eq!(
            paths(&report),
            vec![
                pair("lines.1.sku", "Required"),
                pair("lines.1.qty", "Min"),
                pair("lines.1.currency", "EqualsPath"),
                pair("lines.2", TYPE_KIND),
            ]
        );
    }

    #[test]
    fn test_exceptions_apply_to_every_element() {
        let data = json!({
            "currency": "EUR",
            "lines": [{"qty": 0}, {"qty": 0}]
        });
        let report = run("Order", "lines.sku,lines.qty", data);
        assert!(report.is_valid(), "{report}");
    }

    #[test]
    fn test_type_errors() {
        let report = run("Order", "", json!({"currency": "EUR", "lines": {"sku": "A"}}));
        assert_eq!(paths(&report), vec![pair("lines", TYPE_KIND)]);

        let report = run("Order", "", json!({"currency": "EUR", "category": "Books", "lines": []}));
        assert_eq!(paths(&report), vec![pair("category", TYPE_KIND)]);

        let report = run("Order", "", json!(["not", "an", "object"]));
        assert_eq!(paths(&report), vec![pair("", TYPE_KIND)]);
        assert!(report.errors()[0].path.is_root());
    }

    #[test]
    fn test_data_is_not_modified() {
        let data = json!({"currency": "EUR", "lines": [{"sku": "", "qty": 0}]});
        let before = data.clone();
        let _ = run("Order", "", data.clone());
        assert_eq!(data, before);
    }
}
