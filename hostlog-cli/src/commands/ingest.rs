//! `hostlog ingest` command handler
//!
//! One-shot import of JSON-lines field bags, the same format the daemon reads.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::info;

use hostlog_core::config::HostlogConfig;
use hostlog_pipeline::{IngestPipeline, ReadSummary, ingest_lines};

use crate::cli::IngestArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `ingest` command.
///
/// Malformed lines are skipped; any storage failure makes the command fail
/// after the report is printed.
pub async fn execute(
    args: IngestArgs,
    config: &HostlogConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let pipeline = super::open_pipeline(config).await?;
    let result = import(&pipeline, args.file.as_deref()).await;
    pipeline.shutdown().await;

    let report = result?;
    writer.render(&report)?;

    if report.summary.store_errors > 0 {
        return Err(CliError::Command(format!(
            "{} entries could not be stored",
            report.summary.store_errors
        )));
    }
    Ok(())
}

/// Read `file` (or stdin) to EOF through the pipeline.
pub async fn import(
    pipeline: &IngestPipeline,
    file: Option<&Path>,
) -> Result<IngestReport, CliError> {
    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match file {
        Some(path) => Box::new(BufReader::new(tokio::fs::File::open(path).await?)),
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let summary = ingest_lines(pipeline, reader, None).await?;
    info!(
        lines = summary.lines,
        stored = summary.stored,
        "import finished"
    );
    Ok(IngestReport {
        source: file.map(Path::to_path_buf),
        summary,
    })
}

#[derive(Debug, Serialize)]
pub struct IngestReport {
    /// `None` for stdin.
    pub source: Option<PathBuf>,
    #[serde(flatten)]
    pub summary: ReadSummary,
}

impl Render for IngestReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let source = self
            .source
            .as_ref()
            .map_or_else(|| "stdin".to_owned(), |p| p.display().to_string());
        let s = &self.summary;
        writeln!(w, "Ingest from {}", source.bold())?;
        writeln!(w, "  Lines:   {}", s.lines)?;
        writeln!(w, "  Stored:  {}", s.stored.to_string().green())?;
        if s.decode_errors > 0 {
            writeln!(w, "  Skipped: {} (malformed)", s.decode_errors.to_string().yellow())?;
        }
        if s.store_errors > 0 {
            writeln!(w, "  Failed:  {}", s.store_errors.to_string().red())?;
        }
        Ok(())
    }
}
