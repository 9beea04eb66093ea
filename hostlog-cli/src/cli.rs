//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// hostlog -- host log ingestion and visibility scoring.
///
/// Use `hostlog <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "hostlog", version, about, long_about = None)]
pub struct Cli {
    /// Path to the hostlog.toml configuration file.
    ///
    /// A missing file falls back to built-in defaults (except for `config validate`).
    #[arg(short, long, default_value = "hostlog.toml", global = true)]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every host identity with stored logs.
    Hosts,

    /// Show stored log entries.
    Logs(LogsArgs),

    /// Show visibility scores.
    Scores(ScoresArgs),

    /// Show how often each raw field name was seen for a host.
    Fields(FieldsArgs),

    /// Manage per-host field mappings.
    Mapping(MappingArgs),

    /// Import JSON-lines field bags once (file or stdin).
    Ingest(IngestArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- logs ----

/// Show stored log entries, newest first.
#[derive(Args, Debug)]
pub struct LogsArgs {
    /// Restrict to these host identities (repeatable).
    #[arg(long = "host")]
    pub hosts: Vec<String>,

    /// Page number (100 entries per page, negative values mean 0).
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub page: i64,

    /// Show the N most recent entries across all hosts instead of a page.
    #[arg(long, conflicts_with_all = ["hosts", "page"])]
    pub recent: Option<usize>,
}

// ---- scores ----

/// Show visibility scores.
#[derive(Args, Debug)]
pub struct ScoresArgs {
    /// Only show the N highest scores.
    #[arg(long)]
    pub top: Option<usize>,

    /// Show the score breakdown for one host.
    #[arg(long, conflicts_with = "top")]
    pub host: Option<String>,
}

// ---- fields ----

/// Show field-name frequencies for a host.
#[derive(Args, Debug)]
pub struct FieldsArgs {
    /// Host identity (bare address).
    pub host: String,
}

// ---- mapping ----

/// Manage per-host field mappings.
#[derive(Args, Debug)]
pub struct MappingArgs {
    #[command(subcommand)]
    pub action: MappingAction,
}

#[derive(Subcommand, Debug)]
pub enum MappingAction {
    /// Show the effective mapping for a host (defaults when none is stored).
    Show {
        /// Host identity.
        host: String,
    },
    /// List every stored mapping.
    List,
    /// Create or replace the mapping for a host.
    ///
    /// Omitted fields use the default field names.
    Set {
        /// Host identity.
        host: String,
        /// Field holding the reported hostname.
        #[arg(long)]
        hostname_field: Option<String>,
        /// Field holding the message content.
        #[arg(long)]
        content_field: Option<String>,
        /// Field holding the syslog priority.
        #[arg(long)]
        priority_field: Option<String>,
        /// Field holding the event timestamp.
        #[arg(long)]
        timestamp_field: Option<String>,
    },
    /// Delete the mapping for a host.
    Delete {
        /// Host identity.
        host: String,
    },
}

// ---- ingest ----

/// Import JSON-lines field bags once.
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Input file (default: stdin).
    pub file: Option<PathBuf>,
}

// ---- config ----

/// Manage hostlog configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, storage, ingest, scoring, metrics).
        #[arg(long)]
        section: Option<String>,
    },
}
