//! CLI argument definitions for hostlog-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// hostlog ingestion daemon.
///
/// Reads JSON-lines field bags produced by an upstream syslog listener,
/// stores them as normalized log entries and periodically reports the
/// most visible hosts.
#[derive(Parser, Debug)]
#[command(name = "hostlog-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to hostlog.toml configuration file.
    #[arg(short, long, default_value = "/etc/hostlog/hostlog.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// JSON-lines input: a file path, or `-` for stdin.
    #[arg(short, long, default_value = "-")]
    pub input: String,

    /// Validate configuration file and exit without starting the daemon.
    #[arg(long)]
    pub validate: bool,
}
