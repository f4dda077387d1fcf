//! Offline reporting over captured Axonius API payloads.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{Map, Value};

use axonapi_core::{
    find_adapter, init_logger_with_level, parse_adapters_json, parse_fields_json, report,
};

/// Output format choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Pretty-printed JSON.
    Json,
    /// CSV rows, list cells joined one per line.
    Csv,
}

/// Which settings schema `check-config` validates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scope {
    /// Connection settings.
    Cnx,
    /// Adapter-specific settings.
    Settings,
    /// Advanced (AdapterBase) settings.
    Adv,
}

#[derive(Debug, Parser)]
#[command(
    name = "axonapi-report",
    version,
    about = "Normalize and validate captured Axonius API payloads",
    long_about = None
)]
struct Cli {
    /// Log level (overridden by RUST_LOG).
    #[arg(long, global = true, env = "AXONAPI_LOG_LEVEL", default_value = "info")]
    log_level: log::LevelFilter,

    /// Output format.
    #[arg(long, global = true, env = "AXONAPI_FORMAT", value_enum, default_value = "json")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Normalized adapter records.
    Adapters {
        /// Adapter status payload (JSON).
        #[arg(long)]
        input: PathBuf,
        /// Only adapters that are not healthy or have broken connections.
        #[arg(long)]
        only_bad: bool,
    },
    /// Connections of every adapter.
    Cnx {
        /// Adapter status payload (JSON).
        #[arg(long)]
        input: PathBuf,
        /// Limit to one adapter (display or raw name).
        #[arg(long)]
        adapter: Option<String>,
    },
    /// Field catalog.
    Fields {
        /// Field schema payload (JSON).
        #[arg(long)]
        input: PathBuf,
        /// Limit to one adapter short name (or `generic`).
        #[arg(long)]
        adapter: Option<String>,
    },
    /// Validate a candidate config against an adapter's schema.
    CheckConfig {
        /// Adapter status payload (JSON).
        #[arg(long)]
        input: PathBuf,
        /// Adapter display or raw name.
        #[arg(long)]
        adapter: String,
        /// Node name or id.
        #[arg(long)]
        node: String,
        /// Candidate config (JSON object).
        #[arg(long)]
        config: PathBuf,
        /// Schema to validate against.
        #[arg(long, value_enum, default_value = "cnx")]
        scope: Scope,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger_with_level(cli.log_level);

    let stdout = io::stdout();
    let out = stdout.lock();
    run(cli, out)
}

fn run<W: Write>(cli: Cli, mut out: W) -> Result<()> {
    match cli.command {
        Commands::Adapters { input, only_bad } => {
            let mut adapters = parse_adapters_json(&read_json(&input)?)
                .with_context(|| format!("normalizing adapters from {}", input.display()))?;
            if only_bad {
                adapters.retain(|a| a.status != Some(true) || a.cnx_count_bad > 0);
            }
            match cli.format {
                OutputFormat::Json => write_json(&mut out, &adapters),
                OutputFormat::Csv => Ok(report::write_adapters(out, &adapters)?),
            }
        }
        Commands::Cnx { input, adapter } => {
            let adapters = parse_adapters_json(&read_json(&input)?)
                .with_context(|| format!("normalizing adapters from {}", input.display()))?;
            let cnx: Vec<_> = adapters
                .iter()
                .filter(|a| {
                    adapter
                        .as_deref()
                        .map_or(true, |wanted| a.name == wanted || a.name_raw == wanted)
                })
                .flat_map(|a| a.cnx.iter())
                .collect();
            match cli.format {
                OutputFormat::Json => write_json(&mut out, &cnx),
                OutputFormat::Csv => Ok(report::write_connections(out, cnx)?),
            }
        }
        Commands::Fields { input, adapter } => {
            let catalog = parse_fields_json(&read_json(&input)?)
                .with_context(|| format!("normalizing fields from {}", input.display()))?;
            match (cli.format, adapter.as_deref()) {
                (OutputFormat::Json, Some(name)) => write_json(&mut out, catalog.adapter(name)?),
                (OutputFormat::Json, None) => write_json(&mut out, &catalog),
                (OutputFormat::Csv, filter) => Ok(report::write_fields(out, &catalog, filter)?),
            }
        }
        Commands::CheckConfig {
            input,
            adapter,
            node,
            config,
            scope,
        } => {
            let adapters = parse_adapters_json(&read_json(&input)?)
                .with_context(|| format!("normalizing adapters from {}", input.display()))?;
            let record = find_adapter(&adapters, &adapter, &node)?;
            let raw: Map<String, Value> = serde_json::from_value(read_json(&config)?)
                .with_context(|| format!("{} must hold a JSON object", config.display()))?;

            let resolved = match scope {
                Scope::Cnx => record.check_cnx_config(&raw, None),
                Scope::Settings => record.check_settings(&raw, false, None),
                Scope::Adv => record.check_settings(&raw, true, None),
            }?;

            match cli.format {
                OutputFormat::Json => write_json(&mut out, &resolved),
                OutputFormat::Csv => Ok(report::write_resolved(out, &resolved)?),
            }
        }
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {} as JSON", path.display()))
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
