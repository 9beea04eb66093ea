//! Command handlers -- one module per subcommand

pub mod config;
pub mod fields;
pub mod hosts;
pub mod ingest;
pub mod logs;
pub mod mapping;
pub mod scores;

use std::path::Path;
use std::sync::Arc;

use hostlog_core::config::HostlogConfig;
use hostlog_pipeline::{IngestPipeline, IngestPipelineBuilder, PipelineConfig};
use hostlog_storage::SqliteStore;
use hostlog_visibility::{ScoreWeights, VisibilityScorer};

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

/// Run the parsed command line.
pub async fn dispatch(cli: Cli, writer: &OutputWriter) -> Result<(), CliError> {
    let path = cli.config;
    match cli.command {
        Commands::Hosts => hosts::execute(&load_config(&path).await?, writer).await,
        Commands::Logs(args) => logs::execute(args, &load_config(&path).await?, writer).await,
        Commands::Scores(args) => scores::execute(args, &load_config(&path).await?, writer).await,
        Commands::Fields(args) => fields::execute(args, &load_config(&path).await?, writer).await,
        Commands::Mapping(args) => {
            mapping::execute(args, &load_config(&path).await?, writer).await
        }
        Commands::Ingest(args) => ingest::execute(args, &load_config(&path).await?, writer).await,
        // reports on the file itself, so it loads it on its own terms
        Commands::Config(args) => config::execute(args, &path, writer).await,
    }
}

/// Load the effective configuration; a missing file means defaults.
pub async fn load_config(path: &Path) -> Result<HostlogConfig, CliError> {
    HostlogConfig::load_or_default(path)
        .await
        .map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)))
}

/// Open the SQLite store on the blocking pool.
pub async fn open_store(config: &HostlogConfig) -> Result<Arc<SqliteStore>, CliError> {
    let storage = config.storage.clone();
    let store = tokio::task::spawn_blocking(move || SqliteStore::open(&storage))
        .await
        .map_err(|e| CliError::Command(format!("store open task failed: {e}")))??;
    Ok(Arc::new(store))
}

/// Build an ingest pipeline over the configured store.
///
/// Callers must `shutdown()` the pipeline so pending frequency updates are written.
pub async fn open_pipeline(config: &HostlogConfig) -> Result<IngestPipeline, CliError> {
    let store = open_store(config).await?;
    Ok(IngestPipelineBuilder::new()
        .config(PipelineConfig::from_core(&config.ingest))
        .stores(store)
        .build()?)
}

/// Build a scorer over the configured store.
pub async fn open_scorer(config: &HostlogConfig) -> Result<VisibilityScorer, CliError> {
    let store = open_store(config).await?;
    Ok(VisibilityScorer::new(
        store,
        ScoreWeights::from_core(&config.scoring),
    ))
}
