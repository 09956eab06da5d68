//! # decaf CLI entry point
//!
//! Parses command-line arguments, loads the configuration file, and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use decaf_cli::compile::{run_compile, CompileArgs};
use decaf_cli::config::CliConfig;
use decaf_cli::validate::{run_validate, ValidateArgs};
use decaf_cli::EXIT_ERROR;

/// Decaf model validator.
///
/// Compiles annotated model definitions and validates JSON data against
/// them. Results are printed to stdout as JSON; logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "decaf", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file. Defaults to ./decaf.yaml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a model definition file and print the compiled schemas.
    Compile(CompileArgs),

    /// Validate JSON items against a compiled model.
    Validate(ValidateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::debug!("decaf CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = match CliConfig::load(cli.config.as_deref(), &cwd) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = match cli.command {
        Commands::Compile(args) => run_compile(&args, &config, &mut out),
        Commands::Validate(args) => run_validate(&args, &config, std::io::stdin().lock(), &mut out),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
