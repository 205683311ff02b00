//! Command-line argument parsing for the `nerium` binary.
//!
//! Uses clap to parse the `run` and `tables` subcommands.

use crate::db::QueryParams;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value as JsonValue;
use std::path::PathBuf;

/// Output format for `run`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain array of rows.
    #[default]
    Default,
    /// Rows wrapped with an error flag and request metadata.
    Affix,
    /// Named result payload (`name`, `data`, `metadata`, `params`).
    Schema,
}

/// Run SQL query files against environment-configured backends.
#[derive(Parser, Debug)]
#[command(name = "nerium")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Dotenv file with `<CODE>_BACKEND` entries (default: nearest .env, then /dotenv/.env)
    #[arg(long, value_name = "PATH", env = "NERIUM_ENV_FILE", global = true)]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a query file and print the formatted result as JSON
    Run {
        /// Query file named `<name>.<backend>.<ext>`
        #[arg(value_name = "QUERY_FILE")]
        query_file: PathBuf,

        /// Bound parameter for a `:name` placeholder (repeatable)
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
        params: Vec<(String, JsonValue)>,

        /// Request query string reported in the result metadata (e.g. "year=2024&region=west")
        #[arg(short = 'q', long, value_name = "QUERY_STRING", default_value = "")]
        query_string: String,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Default)]
        format: OutputFormat,
    },

    /// List the tables of the backend a query file points at
    Tables {
        /// Query file named `<name>.<backend>.<ext>`
        #[arg(value_name = "QUERY_FILE")]
        query_file: PathBuf,
    },
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Collects `--param` pairs into query parameters. Later values win.
pub fn to_query_params(params: &[(String, JsonValue)]) -> QueryParams {
    params.iter().cloned().collect()
}

/// Parses `KEY=VALUE`. Numbers, booleans and `null` keep their JSON type;
/// anything else is a string.
pub fn parse_param(s: &str) -> Result<(String, JsonValue), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid parameter: '{s}'. Expected KEY=VALUE"))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Invalid parameter: '{s}'. Key is empty"));
    }

    let value = match serde_json::from_str::<JsonValue>(raw) {
        Ok(v @ (JsonValue::Number(_) | JsonValue::Bool(_) | JsonValue::Null)) => v,
        _ => JsonValue::String(raw.to_string()),
    };

    Ok((key.to_string(), value))
}
