//! `hostlog hosts` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use hostlog_core::config::HostlogConfig;
use hostlog_pipeline::IngestPipeline;

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `hosts` command.
pub async fn execute(config: &HostlogConfig, writer: &OutputWriter) -> Result<(), CliError> {
    let pipeline = super::open_pipeline(config).await?;
    let result = collect(&pipeline).await;
    pipeline.shutdown().await;
    writer.render(&result?)
}

/// List host identities, sorted.
pub async fn collect(pipeline: &IngestPipeline) -> Result<HostListReport, CliError> {
    let mut hosts = pipeline.hosts().await?;
    hosts.sort();
    info!(count = hosts.len(), "listed hosts");
    Ok(HostListReport {
        total: hosts.len(),
        hosts,
    })
}

/// Known host identities.
#[derive(Debug, Serialize)]
pub struct HostListReport {
    pub total: usize,
    pub hosts: Vec<String>,
}

impl Render for HostListReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Hosts ({} total)", self.total.to_string().bold())?;
        for host in &self.hosts {
            // entries without a client field are stored under an empty identity
            if host.is_empty() {
                writeln!(w, "  {}", "(unknown)".dimmed())?;
            } else {
                writeln!(w, "  {host}")?;
            }
        }
        Ok(())
    }
}
