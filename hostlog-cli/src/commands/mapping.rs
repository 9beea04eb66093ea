//! `hostlog mapping` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use hostlog_core::config::HostlogConfig;
use hostlog_core::types::FieldMapping;
use hostlog_pipeline::IngestPipeline;

use crate::cli::{MappingAction, MappingArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `mapping` command.
pub async fn execute(
    args: MappingArgs,
    config: &HostlogConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let pipeline = super::open_pipeline(config).await?;
    let result = run_action(&pipeline, args.action, writer).await;
    pipeline.shutdown().await;
    result
}

async fn run_action(
    pipeline: &IngestPipeline,
    action: MappingAction,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match action {
        MappingAction::Show { host } => writer.render(&show(pipeline, &host).await?),
        MappingAction::List => writer.render(&list(pipeline).await?),
        MappingAction::Set {
            host,
            hostname_field,
            content_field,
            priority_field,
            timestamp_field,
        } => {
            let mut mapping = FieldMapping::default_for(host);
            if let Some(field) = hostname_field {
                mapping.hostname_field = field;
            }
            if let Some(field) = content_field {
                mapping.content_field = field;
            }
            if let Some(field) = priority_field {
                mapping.priority_field = field;
            }
            if let Some(field) = timestamp_field {
                mapping.timestamp_field = field;
            }
            writer.render(&set(pipeline, mapping).await?)
        }
        MappingAction::Delete { host } => {
            delete(pipeline, &host).await?;
            writer.render(&MappingDeleted { host })
        }
    }
}

/// Effective mapping for `host`, falling back to the default field names.
pub async fn show(pipeline: &IngestPipeline, host: &str) -> Result<MappingReport, CliError> {
    let report = match pipeline.resolve_mapping(host).await? {
        Some(mapping) => MappingReport {
            mapping,
            is_default: false,
        },
        None => MappingReport {
            mapping: FieldMapping::default_for(host),
            is_default: true,
        },
    };
    Ok(report)
}

/// All stored mappings.
pub async fn list(pipeline: &IngestPipeline) -> Result<MappingListReport, CliError> {
    let mappings = pipeline.list_mappings().await?;
    Ok(MappingListReport {
        total: mappings.len(),
        mappings,
    })
}

/// Store `mapping`, replacing any previous one for the same host.
pub async fn set(
    pipeline: &IngestPipeline,
    mapping: FieldMapping,
) -> Result<MappingReport, CliError> {
    if [
        &mapping.hostname_field,
        &mapping.content_field,
        &mapping.priority_field,
        &mapping.timestamp_field,
    ]
    .iter()
    .any(|f| f.trim().is_empty())
    {
        return Err(CliError::Command("field names must not be empty".to_owned()));
    }

    pipeline.upsert_mapping(mapping.clone()).await?;
    info!(host = %mapping.host_identity, "mapping stored");
    Ok(MappingReport {
        mapping,
        is_default: false,
    })
}

/// Remove the mapping for `host`. Errors when none was stored.
pub async fn delete(pipeline: &IngestPipeline, host: &str) -> Result<(), CliError> {
    if pipeline.delete_mapping(host).await? {
        info!(host, "mapping deleted");
        Ok(())
    } else {
        Err(CliError::NotFound(format!("no mapping for host '{host}'")))
    }
}

#[derive(Debug, Serialize)]
pub struct MappingReport {
    #[serde(flatten)]
    pub mapping: FieldMapping,
    /// True when no mapping is stored and the defaults apply.
    pub is_default: bool,
}

impl Render for MappingReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let m = &self.mapping;
        let origin = if self.is_default {
            "default".yellow()
        } else {
            "stored".green()
        };
        writeln!(w, "Field mapping for {} ({})", m.host_identity.bold(), origin)?;
        writeln!(w, "  hostname  <- {}", m.hostname_field)?;
        writeln!(w, "  content   <- {}", m.content_field)?;
        writeln!(w, "  priority  <- {}", m.priority_field)?;
        writeln!(w, "  timestamp <- {}", m.timestamp_field)?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct MappingListReport {
    pub total: usize,
    pub mappings: Vec<FieldMapping>,
}

impl Render for MappingListReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Field mappings ({} total)", self.total.to_string().bold())?;
        writeln!(w)?;
        writeln!(
            w,
            "{:<20} {:<16} {:<16} {:<16} {:<16}",
            "Host", "Hostname", "Content", "Priority", "Timestamp"
        )?;
        writeln!(w, "{}", "-".repeat(88))?;
        for m in &self.mappings {
            writeln!(
                w,
                "{:<20} {:<16} {:<16} {:<16} {:<16}",
                m.host_identity,
                m.hostname_field,
                m.content_field,
                m.priority_field,
                m.timestamp_field
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct MappingDeleted {
    pub host: String,
}

impl Render for MappingDeleted {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Mapping for {} deleted", self.host)
    }
}
