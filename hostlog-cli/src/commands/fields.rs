//! `hostlog fields` command handler

use std::io::Write;

use serde::Serialize;

use hostlog_core::config::HostlogConfig;
use hostlog_core::types::FieldFrequency;
use hostlog_pipeline::IngestPipeline;

use crate::cli::FieldsArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `fields` command.
pub async fn execute(
    args: FieldsArgs,
    config: &HostlogConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let pipeline = super::open_pipeline(config).await?;
    let result = collect(&pipeline, &args.host).await;
    pipeline.shutdown().await;
    writer.render(&result?)
}

/// Field-name counters for `host`, most frequent first.
pub async fn collect(pipeline: &IngestPipeline, host: &str) -> Result<FieldReport, CliError> {
    let fields = pipeline.list_frequencies(host).await?;
    Ok(FieldReport {
        host: host.to_owned(),
        fields,
    })
}

#[derive(Debug, Serialize)]
pub struct FieldReport {
    pub host: String,
    pub fields: Vec<FieldFrequency>,
}

impl Render for FieldReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Field frequencies for {}", self.host.bold())?;
        if self.fields.is_empty() {
            writeln!(w, "  (no fields observed)")?;
            return Ok(());
        }
        writeln!(w)?;
        writeln!(w, "{:<32} {:>10}", "Field", "Count")?;
        writeln!(w, "{}", "-".repeat(43))?;
        for f in &self.fields {
            writeln!(w, "{:<32} {:>10}", f.field_name, f.count)?;
        }
        Ok(())
    }
}
