//! Daemon orchestration -- assembly, background tasks, and lifecycle management.
//!
//! The [`Orchestrator`] is the central coordinator of `hostlog-daemon`.
//! It validates configuration, opens the SQLite store, builds the ingest
//! pipeline and the visibility scorer, and runs the main loop.
//!
//! # Tasks
//!
//! 1. Input reader (JSON lines -> `IngestPipeline::ingest`)
//! 2. Visibility reporter (top hosts every `scoring.report_interval_secs`)
//! 3. Uptime updater (only with metrics enabled)
//!
//! # Shutdown
//!
//! Triggered by `SIGTERM`/`SIGINT` or by the input reaching EOF. The
//! shutdown broadcast stops every task, then the pipeline drains the
//! pending field-frequency updates.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::io::{AsyncBufRead, BufReader};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use hostlog_core::config::HostlogConfig;
use hostlog_core::types::HostScore;
use hostlog_pipeline::{
    IngestError, IngestPipeline, IngestPipelineBuilder, PipelineConfig, ReadSummary,
};
use hostlog_storage::SqliteStore;
use hostlog_visibility::{ScoreWeights, VisibilityScorer, top_hosts};

use crate::metrics_server;

/// Where the daemon reads JSON-lines field bags from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Standard input (`-`).
    Stdin,
    /// A regular file, read to EOF.
    File(PathBuf),
}

impl InputSource {
    /// Parse the `--input` argument.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    async fn open(&self) -> Result<Box<dyn AsyncBufRead + Unpin + Send>> {
        match self {
            Self::Stdin => Ok(Box::new(BufReader::new(tokio::io::stdin()))),
            Self::File(path) => {
                let file = tokio::fs::File::open(path).await.map_err(|e| {
                    anyhow::anyhow!("failed to open input {}: {}", path.display(), e)
                })?;
                Ok(Box::new(BufReader::new(file)))
            }
        }
    }
}

/// The main daemon orchestrator.
pub struct Orchestrator {
    /// Loaded and validated configuration.
    config: HostlogConfig,
    /// Ingest pipeline shared with the reader task.
    pipeline: Arc<IngestPipeline>,
    /// Read-only scorer over the same store.
    scorer: VisibilityScorer,
    /// Shutdown broadcast sender (signals all background tasks).
    shutdown_tx: broadcast::Sender<()>,
    /// Daemon start time (for uptime reporting).
    start_time: Instant,
}

impl Orchestrator {
    /// Load configuration from `config_path` and build the orchestrator.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or validated,
    /// or if the store or pipeline fail to initialize.
    pub async fn build(config_path: &Path) -> Result<Self> {
        let config = HostlogConfig::load(config_path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?;
        Self::build_from_config(config).await
    }

    /// Build from an already-loaded configuration.
    pub async fn build_from_config(config: HostlogConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

        if config.metrics.enabled {
            metrics_server::install_metrics_recorder(&config.metrics)?;
            record_daemon_metrics();
        }

        let storage = config.storage.clone();
        let store = tokio::task::spawn_blocking(move || SqliteStore::open(&storage))
            .await
            .map_err(|e| anyhow::anyhow!("store open task failed: {}", e))?
            .map_err(|e| anyhow::anyhow!("failed to open log store: {}", e))?;
        let store = Arc::new(store);

        let pipeline = IngestPipelineBuilder::new()
            .config(PipelineConfig::from_core(&config.ingest))
            .stores(Arc::clone(&store))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build ingest pipeline: {}", e))?;

        let scorer = VisibilityScorer::new(store, ScoreWeights::from_core(&config.scoring));
        let (shutdown_tx, _) = broadcast::channel(16);

        tracing::info!(
            db_path = %config.storage.db_path,
            report_interval_secs = config.scoring.report_interval_secs,
            "orchestrator initialized"
        );

        Ok(Self {
            config,
            pipeline: Arc::new(pipeline),
            scorer,
            shutdown_tx,
            start_time: Instant::now(),
        })
    }

    /// Read `input` until EOF or until `SIGTERM`/`SIGINT`.
    pub async fn run(&mut self, input: InputSource) -> Result<ReadSummary> {
        tracing::info!(input = ?input, "opening input");
        let reader = input.open().await?;
        self.run_until(reader, wait_for_shutdown_signal()).await
    }

    /// Run the main loop over `reader` until EOF or until `shutdown` resolves.
    ///
    /// `shutdown` resolves to the name of the trigger, used only for logging.
    pub async fn run_until<R, F>(&mut self, reader: R, shutdown: F) -> Result<ReadSummary>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        F: Future<Output = Result<&'static str>>,
    {
        let mut reader_task = spawn_reader(
            Arc::clone(&self.pipeline),
            reader,
            self.shutdown_tx.subscribe(),
        );

        let reporter_task = spawn_score_reporter(
            self.scorer.clone(),
            self.config.scoring.report_interval_secs,
            self.config.scoring.top_hosts,
            self.shutdown_tx.subscribe(),
        );

        let uptime_task = self
            .config
            .metrics
            .enabled
            .then(|| spawn_uptime_updater(self.start_time, self.shutdown_tx.subscribe()));

        tracing::info!("entering main loop");
        let finished = tokio::select! {
            signal = shutdown => {
                match signal {
                    Ok(name) => tracing::info!(signal = name, "shutdown signal received"),
                    Err(e) => tracing::error!(error = %e, "signal handling failed, shutting down"),
                }
                None
            }
            joined = &mut reader_task => {
                tracing::info!("input exhausted, shutting down");
                Some(joined)
            }
        };

        tracing::info!("broadcasting shutdown signal to all tasks");
        let _ = self.shutdown_tx.send(());

        let joined = match finished {
            Some(joined) => joined,
            None => reader_task.await,
        };
        let _ = reporter_task.await;
        if let Some(task) = uptime_task {
            let _ = task.await;
        }

        self.pipeline.shutdown().await;

        let summary = joined
            .map_err(|e| anyhow::anyhow!("input reader task failed: {}", e))?
            .map_err(|e| anyhow::anyhow!("input read failed: {}", e))?;

        let stats = self.pipeline.stats();
        tracing::info!(
            lines = summary.lines,
            stored = summary.stored,
            decode_errors = summary.decode_errors,
            store_errors = summary.store_errors,
            received = stats.received,
            failed = stats.failed,
            "input processed"
        );

        Ok(summary)
    }

    /// Score every host now and return the configured number of top hosts.
    pub async fn report_top_hosts(&self) -> Result<Vec<HostScore>> {
        report_top_hosts(&self.scorer, self.config.scoring.top_hosts)
            .await
            .map_err(|e| anyhow::anyhow!("visibility report failed: {}", e))
    }

    /// Get a reference to the ingest pipeline.
    pub fn pipeline(&self) -> &Arc<IngestPipeline> {
        &self.pipeline
    }

    /// Get a reference to the loaded configuration.
    pub fn config(&self) -> &HostlogConfig {
        &self.config
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
///
/// Returns the name of the signal that triggered the shutdown.
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

fn spawn_reader<R>(
    pipeline: Arc<IngestPipeline>,
    reader: R,
    shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<Result<ReadSummary, IngestError>>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        hostlog_pipeline::ingest_lines(&pipeline, reader, Some(shutdown_rx)).await
    })
}

async fn report_top_hosts(
    scorer: &VisibilityScorer,
    n: usize,
) -> Result<Vec<HostScore>, hostlog_visibility::ScoringError> {
    let scores = scorer.score_all().await?;
    let top = top_hosts(&scores, n);
    let summary = top
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    tracing::info!(hosts = scores.len(), top = %summary, "visibility report");
    Ok(top)
}

/// Spawn a background task that logs the top hosts on every interval.
///
/// The first report is emitted one full interval after startup.
fn spawn_score_reporter(
    scorer: VisibilityScorer,
    interval_secs: u64,
    top: usize,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = Duration::from_secs(interval_secs);
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = report_top_hosts(&scorer, top).await {
                        tracing::warn!(error = %e, "visibility report failed");
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::debug!("visibility reporter shutting down");
                    break;
                }
            }
        }
    })
}

/// Record daemon-level metrics (build info).
fn record_daemon_metrics() {
    use hostlog_core::metrics as m;

    metrics::gauge!(m::DAEMON_BUILD_INFO, "version" => env!("CARGO_PKG_VERSION")).set(1.0);
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "daemon metrics recorded");
}

/// Spawn a background task that periodically updates the uptime metric.
fn spawn_uptime_updater(
    start_time: Instant,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    use hostlog_core::metrics as m;

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(10));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let uptime_secs = start_time.elapsed().as_secs();
                    #[allow(clippy::cast_precision_loss)]
                    metrics::gauge!(m::DAEMON_UPTIME_SECONDS).set(uptime_secs as f64);
                }
                _ = shutdown_rx.recv() => {
                    tracing::debug!("uptime updater shutting down");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_source_from_arg() {
        assert_eq!(InputSource::from_arg("-"), InputSource::Stdin);
        assert_eq!(
            InputSource::from_arg("/var/log/relay.jsonl"),
            InputSource::File(PathBuf::from("/var/log/relay.jsonl"))
        );
    }

    #[tokio::test]
    async fn missing_input_file_is_an_error() {
        let source = InputSource::File(PathBuf::from("/nonexistent/hostlog/input.jsonl"));
        let err = source.open().await.err().expect("open should fail");
        assert!(err.to_string().contains("failed to open input"));
    }

    #[tokio::test]
    async fn reporter_stops_on_shutdown() {
        let store = Arc::new(
            SqliteStore::open(&hostlog_core::config::StorageConfig {
                db_path: ":memory:".to_owned(),
                pool_size: 1,
                busy_timeout_ms: 1_000,
            })
            .unwrap(),
        );
        let scorer = VisibilityScorer::new(store, ScoreWeights::default());
        let (tx, rx) = broadcast::channel(1);

        let task = spawn_score_reporter(scorer, 60, 3, rx);
        tx.send(()).unwrap();
        task.await.unwrap();
    }
}
