use clap::Parser;
use tracing_subscriber::EnvFilter;

use hostlog_cli::cli::Cli;
use hostlog_cli::commands;
use hostlog_cli::error::CliError;
use hostlog_cli::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // stdout carries command output; diagnostics go to stderr
    let filter = match &cli.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let writer = OutputWriter::new(cli.output);
    if let Err(e) = commands::dispatch(cli, &writer).await {
        report_error(&e);
        std::process::exit(e.exit_code());
    }
}

fn report_error(err: &CliError) {
    use colored::Colorize;

    eprintln!("{} {}", "error:".red().bold(), err);
}
