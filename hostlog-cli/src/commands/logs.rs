//! `hostlog logs` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use hostlog_core::config::HostlogConfig;
use hostlog_core::types::{LogEntry, SeverityBucket};
use hostlog_pipeline::IngestPipeline;

use crate::cli::LogsArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render, truncate};

/// Execute the `logs` command.
pub async fn execute(
    args: LogsArgs,
    config: &HostlogConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let pipeline = super::open_pipeline(config).await?;
    let result = collect(&pipeline, args).await;
    pipeline.shutdown().await;
    writer.render(&result?)
}

/// Fetch either the N most recent entries or one filtered page.
pub async fn collect(pipeline: &IngestPipeline, args: LogsArgs) -> Result<LogReport, CliError> {
    if let Some(limit) = args.recent {
        let entries = pipeline.query_recent(limit).await?;
        return Ok(LogReport {
            page: None,
            entries,
        });
    }

    let page = args.page.max(0);
    let result = pipeline.query_filtered(args.hosts.clone(), page).await?;
    info!(
        page,
        hosts = args.hosts.len(),
        total = result.total,
        "fetched log page"
    );
    Ok(LogReport {
        page: Some(PageInfo {
            page,
            last_page: result.last_page,
            total: result.total,
            hosts: args.hosts,
        }),
        entries: result.entries,
    })
}

#[derive(Debug, Serialize)]
pub struct LogReport {
    /// Absent for `--recent`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageInfo>,
    pub entries: Vec<LogEntry>,
}

#[derive(Debug, Serialize)]
pub struct PageInfo {
    pub page: i64,
    pub last_page: u64,
    pub total: u64,
    pub hosts: Vec<String>,
}

impl Render for LogReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        match &self.page {
            Some(p) => {
                let scope = if p.hosts.is_empty() {
                    "all hosts".to_owned()
                } else {
                    p.hosts.join(", ")
                };
                writeln!(
                    w,
                    "Logs for {} (page {} of {}, {} entries)",
                    scope.bold(),
                    p.page,
                    p.last_page,
                    p.total
                )?;
            }
            None => writeln!(w, "Most recent {} entries", self.entries.len())?,
        }
        writeln!(w)?;
        writeln!(
            w,
            "{:<8} {:<20} {:<16} {:<16} {:<8} Content",
            "ID", "Timestamp", "Host", "Hostname", "Level"
        )?;
        writeln!(w, "{}", "-".repeat(100))?;

        for e in &self.entries {
            let level = e.severity_level().to_string();
            let level = match e.severity_bucket() {
                SeverityBucket::Error => level.red(),
                SeverityBucket::Warning => level.yellow(),
                SeverityBucket::Info => level.normal(),
            };
            writeln!(
                w,
                "{:<8} {:<20} {:<16} {:<16} {:<8} {}",
                e.id,
                e.timestamp.format("%Y-%m-%d %H:%M:%S"),
                truncate(&e.host_identity, 16),
                truncate(&e.hostname, 16),
                level,
                truncate(&e.content, 60)
            )?;
        }
        Ok(())
    }
}
