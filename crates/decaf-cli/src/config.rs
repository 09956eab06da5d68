//! # Configuration File
//!
//! Optional `decaf.yaml` holding defaults for the command-line flags.
//!
//! ```yaml
//! schema: models/for_angular.model.ts
//! model: ForAngularModel
//! exceptions: website, category.description
//! throw_on_fail: false
//! custom_constraints: [slug]
//! ```
//!
//! The file is taken from `--config` or, failing that, from `decaf.yaml`
//! in the working directory. A relative `schema` path is relative to the
//! file. Flags given on the command line win over file values.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "decaf.yaml";

/// Defaults read from the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Model definition file.
    #[serde(default)]
    pub schema: Option<PathBuf>,
    /// Model validated by `decaf validate`.
    #[serde(default)]
    pub model: Option<String>,
    /// Comma-separated dotted paths to skip.
    #[serde(default)]
    pub exceptions: Option<String>,
    /// Stop at the first failing item.
    #[serde(default = "default_throw_on_fail")]
    pub throw_on_fail: bool,
    /// Decorator names accepted as custom constraints.
    #[serde(default)]
    pub custom_constraints: Vec<String>,
}

fn default_throw_on_fail() -> bool {
    true
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            schema: None,
            model: None,
            exceptions: None,
            throw_on_fail: default_throw_on_fail(),
            custom_constraints: Vec::new(),
        }
    }
}

impl CliConfig {
    /// Parse a configuration document. Relative paths stay as written.
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("invalid configuration")
    }

    /// Load the configuration for a run.
    ///
    /// An `explicit` path must exist. Without one, `decaf.yaml` in `cwd`
    /// is used if present, otherwise all defaults apply.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        let path = match explicit {
            Some(path) => crate::resolve_path(path, cwd),
            None => {
                let candidate = cwd.join(DEFAULT_CONFIG_FILE);
                if !candidate.is_file() {
                    tracing::debug!("no configuration file, using defaults");
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut config = Self::from_yaml(&text)
            .with_context(|| format!("in config file {}", path.display()))?;

        if let Some(dir) = path.parent() {
            config.schema = config
                .schema
                .take()
                .map(|schema| crate::resolve_path(&schema, dir));
        }
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}
