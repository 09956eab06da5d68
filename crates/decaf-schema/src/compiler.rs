//! Lowering of parsed declarations into [`ModelSchema`]s.
//!
//! Assigns meaning to decorators through a fixed table, checks their
//! parameters, and resolves field types to nested-model references.

use std::collections::{BTreeSet, HashSet};

use decaf_core::constraint::is_builtin_kind;
use decaf_core::{
    ConstraintArg, ConstraintSpec, DateFormat, FieldSpec, ModelSchema, NestedRef, PatternKind,
    RegexPattern, SchemaError, TYPE_KIND,
};

use crate::parser::{Decorator, Definition, FieldDecl, ModelDecl};

/// Type names that never refer to a model.
const PRIMITIVE_TYPES: [&str; 10] = [
    "string", "number", "boolean", "Date", "any", "unknown", "object", "bigint", "String",
    "Number",
];

/// Field decorators with built-in meaning.
const DECORATORS: [&str; 11] = [
    "required", "min", "max", "minlength", "maxlength", "email", "url", "password", "date",
    "pattern", "eq",
];

/// Returns true if `name` cannot be used as a custom constraint kind: it is
/// a built-in decorator, a built-in kind name, or the `Type` kind.
pub fn is_reserved_kind(name: &str) -> bool {
    DECORATORS.contains(&name) || is_builtin_kind(name) || name == TYPE_KIND
}

/// Compile every model of a definition.
///
/// `is_registered` answers whether a model name outside this definition is
/// already known; `custom_kinds` lists decorator names accepted as
/// [`ConstraintSpec::Custom`].
pub(crate) fn compile_definition(
    definition: &Definition,
    is_registered: impl Fn(&str) -> bool,
    custom_kinds: &BTreeSet<String>,
) -> Result<Vec<ModelSchema>, SchemaError> {
    let mut declared = HashSet::new();
    for model in &definition.models {
        if !declared.insert(model.name.as_str()) {
            return Err(SchemaError::DuplicateModel {
                model: model.name.clone(),
            });
        }
    }

    let known = |name: &str| declared.contains(name) || is_registered(name);

    definition
        .models
        .iter()
        .map(|model| compile_model(model, &known, custom_kinds))
        .collect()
}

fn compile_model(
    model: &ModelDecl,
    known: &impl Fn(&str) -> bool,
    custom_kinds: &BTreeSet<String>,
) -> Result<ModelSchema, SchemaError> {
    let fields = model
        .fields
        .iter()
        .map(|field| compile_field(&model.name, field, known, custom_kinds))
        .collect::<Result<Vec<_>, _>>()?;
    ModelSchema::new(model.name.clone(), fields)
}

fn compile_field(
    model: &str,
    field: &FieldDecl,
    known: &impl Fn(&str) -> bool,
    custom_kinds: &BTreeSet<String>,
) -> Result<FieldSpec, SchemaError> {
    let mut spec = FieldSpec::new(field.name.clone());

    for decorator in &field.decorators {
        let ctx = DecoratorContext {
            model,
            field: &field.name,
            decorator,
        };
        spec = spec.with_constraint(ctx.lower(custom_kinds)?);
    }

    if !PRIMITIVE_TYPES.contains(&field.type_name.as_str()) {
        if !known(&field.type_name) {
            return Err(SchemaError::UnknownModel {
                model: model.to_string(),
                field: field.name.clone(),
                reference: field.type_name.clone(),
            });
        }
        spec = spec.with_nested(NestedRef {
            model: field.type_name.clone(),
            many: field.many,
        });
    }

    Ok(spec)
}

struct DecoratorContext<'a> {
    model: &'a str,
    field: &'a str,
    decorator: &'a Decorator,
}

impl DecoratorContext<'_> {
    fn lower(&self, custom_kinds: &BTreeSet<String>) -> Result<ConstraintSpec, SchemaError> {
        let spec = match self.decorator.name.as_str() {
            "required" => {
                self.no_args()?;
                ConstraintSpec::Required
            }
            "min" => ConstraintSpec::Min(self.number()?),
            "max" => ConstraintSpec::Max(self.number()?),
            "minlength" => ConstraintSpec::MinLength(self.length()?),
            "maxlength" => ConstraintSpec::MaxLength(self.length()?),
            "email" => {
                self.no_args()?;
                ConstraintSpec::Pattern(PatternKind::Email)
            }
            "url" => {
                self.no_args()?;
                ConstraintSpec::Pattern(PatternKind::Url)
            }
            "password" => {
                self.no_args()?;
                ConstraintSpec::Pattern(PatternKind::Password)
            }
            "date" => {
                let format = self.text("a date format string")?;
                let format = DateFormat::parse(format).map_err(|reason| self.invalid(reason))?;
                ConstraintSpec::Pattern(PatternKind::Date(format))
            }
            "pattern" => {
                let source = self.text("a regular expression string")?;
                let regex = RegexPattern::new(source).map_err(|e| self.invalid(e.to_string()))?;
                ConstraintSpec::Pattern(PatternKind::Regex(regex))
            }
            "eq" => {
                let path = self.text("a field path string")?;
                if path.trim().is_empty() {
                    return Err(self.invalid("field path is empty"));
                }
                ConstraintSpec::EqualsPath(path.to_string())
            }
            name if custom_kinds.contains(name) => ConstraintSpec::Custom {
                name: name.to_string(),
                args: self.decorator.args.clone(),
            },
            other => {
                return Err(SchemaError::UnknownConstraint {
                    model: self.model.to_string(),
                    field: self.field.to_string(),
                    decorator: other.to_string(),
                })
            }
        };
        Ok(spec)
    }

    fn missing(&self, expected: &str) -> SchemaError {
        SchemaError::MissingParameter {
            model: self.model.to_string(),
            field: self.field.to_string(),
            constraint: self.decorator.name.clone(),
            expected: expected.to_string(),
        }
    }

    fn invalid(&self, reason: impl Into<String>) -> SchemaError {
        SchemaError::InvalidParameter {
            model: self.model.to_string(),
            field: self.field.to_string(),
            constraint: self.decorator.name.clone(),
            reason: reason.into(),
        }
    }

    fn no_args(&self) -> Result<(), SchemaError> {
        if self.decorator.args.is_empty() {
            Ok(())
        } else {
            Err(self.invalid("takes no arguments"))
        }
    }

    fn single(&self, expected: &str) -> Result<&ConstraintArg, SchemaError> {
        match self.decorator.args.as_slice() {
            [] => Err(self.missing(expected)),
            [arg] => Ok(arg),
            _ => Err(self.invalid(format!("expected exactly one argument: {expected}"))),
        }
    }

    fn number(&self) -> Result<f64, SchemaError> {
        let arg = self.single("a numeric bound")?;
        arg.as_f64()
            .ok_or_else(|| self.invalid(format!("expected a number, found {arg}")))
    }

    fn length(&self) -> Result<usize, SchemaError> {
        let n = self.single("a length")?;
        match n.as_f64() {
            Some(n) if n >= 0.0 && n.fract() == 0.0 => Ok(n as usize),
            _ => Err(self.invalid(format!("expected a non-negative integer, found {n}"))),
        }
    }

    fn text(&self, expected: &str) -> Result<&str, SchemaError> {
        let arg = self.single(expected)?;
        arg.as_str()
            .ok_or_else(|| self.invalid(format!("expected {expected}, found {arg}")))
    }
}
