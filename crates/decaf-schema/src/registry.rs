//! # Model Registry
//!
//! Compiles annotated model definitions and owns the resulting schemas.
//!
//! ## Caching
//!
//! Schemas are stored by model name as `Arc<ModelSchema>`; callers receive
//! shared handles and never a mutable view. Each compiled definition text
//! is remembered by its [`SchemaFingerprint`], so compiling the same text
//! again returns the cached [`CompiledDefinition`] without re-parsing.
//!
//! ## Consistency
//!
//! Compilation is all-or-nothing. A definition that fails any check
//! registers none of its models. Redeclaring a registered model with an
//! identical structure is accepted; redeclaring it differently is a
//! [`SchemaError::ConflictingModel`].

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;

use decaf_core::{ModelSchema, SchemaError, SchemaFingerprint};

use crate::compiler::{compile_definition, is_reserved_kind};
use crate::lexer::tokenize;
use crate::parser::parse;

/// The result of compiling one definition text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledDefinition {
    /// Fingerprint of the definition text.
    pub fingerprint: SchemaFingerprint,
    /// Models declared by the text, in declaration order.
    pub models: Vec<String>,
}

/// Registry of compiled model schemas, keyed by model name.
///
/// ## Thread Safety
///
/// `ModelRegistry` is `Send + Sync`. Compilation needs `&mut self`; once a
/// host has compiled its definitions the registry can be shared by
/// reference across any number of concurrent validations.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, Arc<ModelSchema>>,
    definitions: HashMap<SchemaFingerprint, CompiledDefinition>,
    custom_kinds: BTreeSet<String>,
}

impl ModelRegistry {
    /// Create an empty registry that accepts only built-in decorators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `@name(...)` decorators as custom constraints of kind `name`.
    ///
    /// # Errors
    ///
    /// Same as [`ModelRegistry::allow_custom_constraint`].
    pub fn with_custom_constraints<I, S>(mut self, names: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.allow_custom_constraint(name)?;
        }
        Ok(self)
    }

    /// Accept `@name(...)` decorators as custom constraints of kind `name`.
    ///
    /// Definitions compiled earlier are not revisited, but the text cache
    /// is cleared so a previously rejected text can compile now.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::ReservedConstraint`] if `name` is a built-in
    /// decorator (`min`), a built-in kind (`Required`), or `Type`.
    pub fn allow_custom_constraint(&mut self, name: impl Into<String>) -> Result<(), SchemaError> {
        let name = name.into();
        if is_reserved_kind(&name) {
            return Err(SchemaError::ReservedConstraint { name });
        }
        if self.custom_kinds.insert(name) {
            self.definitions.clear();
        }
        Ok(())
    }

    /// Custom constraint kinds accepted by the compiler.
    pub fn custom_constraints(&self) -> impl Iterator<Item = &str> {
        self.custom_kinds.iter().map(String::as_str)
    }

    /// Compile a definition text and register every model it declares.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the text is malformed, a decorator is
    /// unknown or has bad parameters, a nested type names an undeclared
    /// model, a model or field name is duplicated, or a model conflicts
    /// with one already registered.
    pub fn compile(&mut self, text: &str) -> Result<CompiledDefinition, SchemaError> {
        let fingerprint = SchemaFingerprint::of(text);
        if let Some(cached) = self.definitions.get(&fingerprint) {
            tracing::debug!(%fingerprint, models = ?cached.models, "definition served from cache");
            return Ok(cached.clone());
        }

        let tokens = tokenize(text)?;
        let definition = parse(&tokens)?;
        let schemas = compile_definition(
            &definition,
            |name| self.models.contains_key(name),
            &self.custom_kinds,
        )?;

        for schema in &schemas {
            if let Some(existing) = self.models.get(schema.name()) {
                if existing.as_ref() != schema {
                    return Err(SchemaError::ConflictingModel {
                        model: schema.name().to_string(),
                    });
                }
            }
        }

        let models: Vec<String> = schemas.iter().map(|s| s.name().to_string()).collect();
        for schema in schemas {
            self.models
                .entry(schema.name().to_string())
                .or_insert_with(|| Arc::new(schema));
        }

        let compiled = CompiledDefinition {
            fingerprint,
            models,
        };
        tracing::debug!(%fingerprint, models = ?compiled.models, "compiled model definition");
        self.definitions.insert(fingerprint, compiled.clone());
        Ok(compiled)
    }

    /// Look up a compiled schema by model name.
    pub fn get(&self, name: &str) -> Option<&Arc<ModelSchema>> {
        self.models.get(name)
    }

    /// Look up a compiled schema, failing if it was never compiled.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NotCompiled`] for unknown names.
    pub fn require(&self, name: &str) -> Result<&Arc<ModelSchema>, SchemaError> {
        self.get(name).ok_or_else(|| SchemaError::NotCompiled {
            model: name.to_string(),
        })
    }

    /// Returns true if a model of that name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Names of all registered models, sorted alphabetically.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// All registered schemas, sorted by model name.
    pub fn schemas(&self) -> impl Iterator<Item = &Arc<ModelSchema>> {
        self.models.values()
    }

    /// Returns the number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns true if no model is registered.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATEGORY: &str = r#"
        @model()
        export class CategoryModel extends Model {
          @required()
          name!: string;

          @required()
          @minlength(5)
          description!: string;
        }
    "#;

    #[test]
    fn test_compile_registers_models() {
        let mut registry = ModelRegistry::new();
        let compiled = registry.compile(CATEGORY).unwrap();
        assert_eq!(compiled.models, vec!["CategoryModel".to_string()]);
        assert_eq!(compiled.fingerprint, SchemaFingerprint::of(CATEGORY));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("CategoryModel"));
        assert_eq!(registry.require("CategoryModel").unwrap().fields().len(), 2);
    }

    #[test]
    fn test_recompile_is_cached_and_shares_schema() {
        let mut registry = ModelRegistry::new();
        let first = registry.compile(CATEGORY).unwrap();
        let handle = Arc::clone(registry.get("CategoryModel").unwrap());
        let second = registry.compile(CATEGORY).unwrap();
        assert_eq!(first, second);
        assert!(Arc::ptr_eq(&handle, registry.get("CategoryModel").unwrap()));
    }

    #[test]
    fn test_identical_redeclaration_in_new_text_accepted() {
        let mut registry = ModelRegistry::new();
        registry.compile(CATEGORY).unwrap();
        let reformatted = CATEGORY.replace("        ", "    ");
        registry.compile(&reformatted).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_conflicting_redeclaration_rejected() {
        let mut registry = ModelRegistry::new();
        registry.compile(CATEGORY).unwrap();
        let err = registry
            .compile("class CategoryModel { @required() name!: string; }")
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::ConflictingModel {
                model: "CategoryModel".into()
            }
        );
        assert_eq!(registry.require("CategoryModel").unwrap().fields().len(), 2);
    }

    #[test]
    fn test_references_previously_registered_models() {
        let mut registry = ModelRegistry::new();
        registry.compile(CATEGORY).unwrap();
        registry
            .compile("class Product { category?: CategoryModel; }")
            .unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["CategoryModel", "Product"]);
    }

    #[test]
    fn test_failed_definition_registers_nothing() {
        let mut registry = ModelRegistry::new();
        let err = registry
            .compile("class A { name!: string; } class B { user!: UserModel; }")
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownModel { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_custom_constraint_enables_decorator() {
        let text = "class A { @slug() handle!: string; }";
        let mut registry = ModelRegistry::new();
        assert!(registry.compile(text).is_err());
        registry.allow_custom_constraint("slug").unwrap();
        registry.compile(text).unwrap();
        assert_eq!(registry.custom_constraints().collect::<Vec<_>>(), vec!["slug"]);
    }

    #[test]
    fn test_custom_constraint_cannot_shadow_builtins() {
        let mut registry = ModelRegistry::new();
        for name in ["min", "required", "Required", "EqualsPath", "Type"] {
            assert_eq!(
                registry.allow_custom_constraint(name).unwrap_err(),
                SchemaError::ReservedConstraint { name: name.into() }
            );
        }
        assert_eq!(registry.custom_constraints().count(), 0);
        assert!(ModelRegistry::new()
            .with_custom_constraints(["slug", "min"])
            .is_err());
    }

    #[test]
    fn test_require_unknown() {
        let registry = ModelRegistry::new();
        assert_eq!(
            registry.require("Missing").unwrap_err(),
            SchemaError::NotCompiled {
                model: "Missing".into()
            }
        );
    }
}
