//! # Compile Subcommand
//!
//! Compiles a model definition file and prints the compiled schemas.
//!
//! Output is a single JSON document:
//!
//! ```json
//! {
//!   "fingerprint": "sha256:…",
//!   "declared": ["CategoryModel", "ForAngularModel"],
//!   "models": [ { "name": "CategoryModel", "fields": [ … ] } ]
//! }
//! ```
//!
//! `models` lists every registered schema sorted by name.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use decaf_core::ModelSchema;
use decaf_engine::Engine;
use decaf_schema::CompiledDefinition;

use crate::config::CliConfig;

/// Arguments for the `decaf compile` subcommand.
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Model definition file. Defaults to `schema` from the config file.
    #[arg(value_name = "SCHEMA")]
    pub schema: Option<PathBuf>,
}

#[derive(Serialize)]
struct CompileOutput<'a> {
    fingerprint: String,
    declared: &'a [String],
    models: Vec<&'a ModelSchema>,
}

/// Build an engine that accepts the custom constraint names from `config`.
pub(crate) fn engine_for(config: &CliConfig) -> Result<Engine> {
    let mut engine = Engine::new();
    for name in &config.custom_constraints {
        engine
            .registry_mut()
            .allow_custom_constraint(name.clone())
            .context("invalid `custom_constraints` in the config file")?;
    }
    Ok(engine)
}

/// Read the definition file and compile it into `engine`.
pub(crate) fn compile_file(engine: &mut Engine, path: &Path) -> Result<CompiledDefinition> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read model definition {}", path.display()))?;
    let compiled = engine
        .compile(&text)
        .with_context(|| format!("failed to compile {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        fingerprint = %compiled.fingerprint,
        models = compiled.models.len(),
        "compiled model definition"
    );
    Ok(compiled)
}

/// Execute the compile subcommand.
///
/// Returns exit code 0; any failure is an operational error.
pub fn run_compile(args: &CompileArgs, config: &CliConfig, out: &mut impl Write) -> Result<u8> {
    let path = args
        .schema
        .clone()
        .or_else(|| config.schema.clone())
        .context("no model definition given: pass SCHEMA or set `schema` in the config file")?;

    let mut engine = engine_for(config)?;
    let compiled = compile_file(&mut engine, &path)?;

    let output = CompileOutput {
        fingerprint: compiled.fingerprint.to_string(),
        declared: &compiled.models,
        models: engine.registry().schemas().map(|s| s.as_ref()).collect(),
    };
    serde_json::to_writer_pretty(&mut *out, &output).context("failed to write output")?;
    writeln!(out)?;
    Ok(crate::EXIT_OK)
}
