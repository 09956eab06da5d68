//! # Engine
//!
//! One-stop entry point for hosts: compile definitions once, then validate
//! and route any number of data items.
//!
//! [`Engine::run`] performs the whole per-item pipeline:
//!
//! 1. compile the request's definition text, if any (cached by fingerprint);
//! 2. derive the effective schema for the request's exceptions;
//! 3. validate the item;
//! 4. route the report according to the failure policy.

use decaf_schema::filter::filter;
use decaf_schema::{CompiledDefinition, ExceptionSet, ModelRegistry};
use serde_json::Value;

use decaf_core::{ConstraintArg, ValidationReport};

use crate::catalog::{ConstraintCatalog, ConstraintEvaluator, Outcome};
use crate::context::ValidationContext;
use crate::error::EngineError;
use crate::router::{route, RoutedOutcome};
use crate::validator::Validator;

/// Everything a host supplies to validate one data item.
#[derive(Debug, Clone)]
pub struct ValidationRequest<'a> {
    /// Definition text to compile before validating. `None` validates
    /// against models compiled earlier.
    pub schema: Option<&'a str>,
    /// Name of the model the data must satisfy.
    pub model: &'a str,
    /// Comma-separated dotted paths to skip.
    pub exceptions: &'a str,
    /// The data item.
    pub data: Value,
    /// Raise on failure instead of annotating the data.
    pub throw_on_fail: bool,
}

/// Model registry plus validator.
#[derive(Debug, Default)]
pub struct Engine {
    registry: ModelRegistry,
    validator: Validator,
}

impl Engine {
    /// An engine with an empty registry and the built-in constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine dispatching through a prepared catalog.
    ///
    /// Custom kinds already in the catalog are accepted by the compiler.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Schema`] if a custom kind uses a reserved
    /// name.
    pub fn with_catalog(catalog: ConstraintCatalog) -> Result<Self, EngineError> {
        let custom: Vec<String> = catalog
            .kinds()
            .filter(|kind| !decaf_core::constraint::is_builtin_kind(kind))
            .map(str::to_string)
            .collect();
        Ok(Self {
            registry: ModelRegistry::new().with_custom_constraints(custom)?,
            validator: Validator::new(catalog),
        })
    }

    /// The model registry.
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Mutable access to the model registry.
    pub fn registry_mut(&mut self) -> &mut ModelRegistry {
        &mut self.registry
    }

    /// The validator.
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Register a custom constraint kind with both the compiler and the
    /// catalog.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ReservedConstraint`] if the kind name belongs
    /// to a built-in constraint, and [`EngineError::DuplicateConstraint`] if
    /// it is already registered.
    pub fn register_constraint(
        &mut self,
        name: impl Into<String>,
        evaluator: impl ConstraintEvaluator + 'static,
    ) -> Result<(), EngineError> {
        let name = name.into();
        self.validator.catalog_mut().register(name.clone(), evaluator)?;
        self.registry.allow_custom_constraint(name)?;
        Ok(())
    }

    /// Closure form of [`Engine::register_constraint`].
    ///
    /// # Errors
    ///
    /// Same as [`Engine::register_constraint`].
    pub fn register_constraint_fn<F>(&mut self, name: impl Into<String>, f: F) -> Result<(), EngineError>
    where
        F: Fn(&[ConstraintArg], &Value, &ValidationContext<'_>) -> Outcome + Send + Sync + 'static,
    {
        let name = name.into();
        self.validator.catalog_mut().register_fn(name.clone(), f)?;
        self.registry.allow_custom_constraint(name)?;
        Ok(())
    }

    /// Compile a definition text into the registry.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Schema`] if the text does not compile.
    pub fn compile(&mut self, text: &str) -> Result<CompiledDefinition, EngineError> {
        Ok(self.registry.compile(text)?)
    }

    /// Validate one data item against a compiled model.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownModel`] if `model` was never compiled.
    pub fn validate(
        &self,
        model: &str,
        exceptions: &ExceptionSet,
        data: &Value,
    ) -> Result<ValidationReport, EngineError> {
        if !self.registry.contains(model) {
            return Err(EngineError::UnknownModel {
                model: model.to_string(),
            });
        }
        let view = filter(&self.registry, model, exceptions)?;
        Ok(self.validator.validate(&view, data))
    }

    /// Compile (if needed), validate, and route one data item.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] for definition or lookup problems. Data
    /// failures are never errors here; they come back as
    /// [`RoutedOutcome::Raised`] or [`RoutedOutcome::Annotated`].
    pub fn run(&mut self, request: ValidationRequest<'_>) -> Result<RoutedOutcome, EngineError> {
        if let Some(text) = request.schema {
            self.compile(text)?;
        }
        let exceptions = ExceptionSet::parse(request.exceptions);
        let report = self.validate(request.model, &exceptions, &request.data)?;
        Ok(route(request.data, report, request.throw_on_fail))
    }
}
