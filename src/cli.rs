// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use tracing::warn;

use crate::config::default_workflow_path;
use crate::types::FieldValues;

/// Command-line arguments for `flowrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "flowrun",
    version,
    about = "Run a dataflow workflow of shell-command tasks.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the workflow file (TOML).
    #[arg(long, value_name = "PATH", default_value_os_t = default_workflow_path())]
    pub workflow: PathBuf,

    /// Workflow input as NAME=VALUE. VALUE is parsed as JSON, falling back
    /// to a plain string. Repeat for each declared input.
    #[arg(long = "input", short = 'i', value_name = "NAME=VALUE", value_parser = parse_input)]
    pub inputs: Vec<(String, serde_json::Value)>,

    /// Default timeout for each task, in seconds (tasks may override it).
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FLOWRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the execution plan, but don't run any task.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Parse a `NAME=VALUE` pair.
pub fn parse_input(s: &str) -> Result<(String, serde_json::Value), String> {
    let (name, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid input '{s}' (expected NAME=VALUE)"))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("invalid input '{s}' (empty NAME)"));
    }

    let value = serde_json::from_str(raw)
        .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
    Ok((name.to_string(), value))
}

/// Turn repeated `--input` pairs into workflow inputs. Later occurrences of
/// the same name win.
pub fn collect_inputs(pairs: &[(String, serde_json::Value)]) -> FieldValues {
    let mut inputs = FieldValues::new();
    for (name, value) in pairs {
        if inputs.insert(name.clone(), value.clone()).is_some() {
            warn!(input = %name, "input given more than once; using the last value");
        }
    }
    inputs
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
