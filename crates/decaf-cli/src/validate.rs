//! # Validate Subcommand
//!
//! Validates JSON items against a compiled model.
//!
//! The data file (or stdin) holds one JSON value. An array is a batch and
//! each element is validated independently; anything else is a single
//! item at index 0.
//!
//! ## Failure Policy
//!
//! By default the first failing item stops the run: its error, carrying
//! the item index and the full report, is printed as `{"error": …}` and
//! the exit code is 1. With `--continue-on-fail` (or `throw_on_fail:
//! false` in the config file) every item is routed and printed as an
//! array of `{json}` / `{json, error, pairedItem}` items; the exit code is
//! 1 if any item failed.

use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{json, Value};

use decaf_engine::{HostItem, ValidationRequest};

use crate::compile::{compile_file, engine_for};
use crate::config::CliConfig;

/// Arguments for the `decaf validate` subcommand.
#[derive(Args, Debug, Default)]
pub struct ValidateArgs {
    /// Model definition file. Defaults to `schema` from the config file.
    #[arg(value_name = "SCHEMA")]
    pub schema: Option<PathBuf>,

    /// Name of the model the data must satisfy.
    #[arg(long)]
    pub model: Option<String>,

    /// JSON data file. Reads stdin when omitted.
    #[arg(long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Comma-separated dotted field paths to skip (e.g. `website,category.description`).
    #[arg(long, value_name = "LIST")]
    pub exceptions: Option<String>,

    /// Annotate failing items and keep going instead of stopping at the first.
    #[arg(long)]
    pub continue_on_fail: bool,
}

/// Execute the validate subcommand.
///
/// `stdin` is read only when no data file is given. Returns exit code 0
/// when every item is valid and 1 otherwise.
pub fn run_validate(
    args: &ValidateArgs,
    config: &CliConfig,
    stdin: impl Read,
    out: &mut impl Write,
) -> Result<u8> {
    let schema = args
        .schema
        .clone()
        .or_else(|| config.schema.clone())
        .context("no model definition given: pass SCHEMA or set `schema` in the config file")?;
    let model = args
        .model
        .as_deref()
        .or(config.model.as_deref())
        .context("no model given: pass --model or set `model` in the config file")?;
    let exceptions = args
        .exceptions
        .as_deref()
        .or(config.exceptions.as_deref())
        .unwrap_or("");
    let throw_on_fail = config.throw_on_fail && !args.continue_on_fail;

    let mut engine = engine_for(config)?;
    compile_file(&mut engine, &schema)?;
    if !engine.registry().contains(model) {
        anyhow::bail!("model '{model}' is not declared in {}", schema.display());
    }

    let items = read_items(args.data.as_ref(), stdin)?;
    tracing::info!(model, items = items.len(), throw_on_fail, "validating");

    let mut routed: Vec<HostItem> = Vec::with_capacity(items.len());
    let mut failed = 0usize;

    for (index, data) in items.into_iter().enumerate() {
        let outcome = engine.run(ValidationRequest {
            schema: None,
            model,
            exceptions,
            data,
            throw_on_fail,
        })?;
        if !outcome.is_valid() {
            failed += 1;
        }
        match outcome.into_host_item(index) {
            Ok(item) => routed.push(item),
            Err(error) => {
                tracing::error!(item = index, "{error}");
                serde_json::to_writer_pretty(&mut *out, &json!({ "error": error }))
                    .context("failed to write output")?;
                writeln!(out)?;
                return Ok(crate::EXIT_INVALID);
            }
        }
    }

    serde_json::to_writer_pretty(&mut *out, &routed).context("failed to write output")?;
    writeln!(out)?;

    if failed > 0 {
        tracing::warn!(failed, total = routed.len(), "validation failed");
        Ok(crate::EXIT_INVALID)
    } else {
        Ok(crate::EXIT_OK)
    }
}

/// Read the batch from `path`, or from `stdin` when no path is given.
fn read_items(path: Option<&PathBuf>, mut stdin: impl Read) -> Result<Vec<Value>> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read data file {}", path.display()))?,
        None => {
            let mut text = String::new();
            stdin
                .read_to_string(&mut text)
                .context("failed to read data from stdin")?;
            text
        }
    };
    let value: Value = serde_json::from_str(&text).context("data is not valid JSON")?;
    Ok(match value {
        Value::Array(items) => items,
        single => vec![single],
    })
}
