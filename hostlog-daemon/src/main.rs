use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use hostlog_core::config::HostlogConfig;
use hostlog_daemon::cli::DaemonCli;
use hostlog_daemon::logging::init_tracing;
use hostlog_daemon::orchestrator::{InputSource, Orchestrator};

/// Grace period for blocking tasks once the main loop has returned.
/// A pending stdin read cannot be cancelled and would otherwise hold the process.
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run(cli));
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);
    result
}

async fn run(cli: DaemonCli) -> Result<()> {
    let mut config = HostlogConfig::load(&cli.config).await.map_err(|e| {
        anyhow::anyhow!("failed to load config {}: {}", cli.config.display(), e)
    })?;

    // CLI flags take precedence over file and environment
    if let Some(level) = cli.log_level {
        config.general.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.general.log_format = format;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

    if cli.validate {
        println!("configuration OK: {}", cli.config.display());
        return Ok(());
    }

    init_tracing(&config.general)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "hostlog-daemon starting"
    );

    let mut orchestrator = Orchestrator::build_from_config(config).await?;
    let summary = orchestrator.run(InputSource::from_arg(&cli.input)).await?;

    tracing::info!(
        stored = summary.stored,
        skipped = summary.decode_errors + summary.store_errors,
        "hostlog-daemon shut down"
    );
    Ok(())
}
