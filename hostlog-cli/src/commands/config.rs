//! `hostlog config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use hostlog_core::config::HostlogConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Section names accepted by `config show --section`.
const SECTIONS: [&str; 5] = ["general", "storage", "ingest", "scoring", "metrics"];

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => {
            let config = super::load_config(config_path).await?;
            let report = show_report(&config, config_path, section.as_deref())?;
            writer.render(&report)
        }
    }
}

/// Load and validate the file; unlike other commands a missing file is an error.
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");
    let report = validate_report(config_path).await;
    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }
    Ok(())
}

/// Validate the configuration file at `config_path`.
pub async fn validate_report(config_path: &Path) -> ConfigValidationReport {
    let errors = match HostlogConfig::load(config_path).await {
        Ok(_) => Vec::new(),
        Err(e) => vec![e.to_string()],
    };
    ConfigValidationReport {
        source: config_path.display().to_string(),
        valid: errors.is_empty(),
        errors,
    }
}

/// Render the effective configuration, or one section of it, as TOML.
pub fn show_report(
    config: &HostlogConfig,
    config_path: &Path,
    section: Option<&str>,
) -> Result<ConfigReport, CliError> {
    let rendered = match section {
        None => toml::to_string_pretty(config),
        Some("general") => toml::to_string_pretty(&config.general),
        Some("storage") => toml::to_string_pretty(&config.storage),
        Some("ingest") => toml::to_string_pretty(&config.ingest),
        Some("scoring") => toml::to_string_pretty(&config.scoring),
        Some("metrics") => toml::to_string_pretty(&config.metrics),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {} (expected: {})",
                other,
                SECTIONS.join(", ")
            )));
        }
    };
    let config_toml =
        rendered.map_err(|e| CliError::Command(format!("failed to serialize config: {e}")))?;

    Ok(ConfigReport {
        source: config_path.display().to_string(),
        section: section.map(str::to_owned),
        config_toml,
    })
}

/// Configuration display report.
///
/// The `config_toml` field is skipped during JSON serialization (only used for text rendering).
#[derive(Debug, Serialize)]
pub struct ConfigReport {
    /// Configuration file path
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Serialized TOML configuration
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{}]", section);
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    /// Configuration file path
    pub source: String,
    /// Whether the configuration is valid
    pub valid: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_full_config_contains_every_section() {
        let config = HostlogConfig::default();
        let report = show_report(&config, Path::new("hostlog.toml"), None).unwrap();
        for section in SECTIONS {
            assert!(
                report.config_toml.contains(&format!("[{section}]")),
                "missing [{section}]"
            );
        }
    }

    #[test]
    fn show_single_section() {
        let config = HostlogConfig::default();
        let report = show_report(&config, Path::new("hostlog.toml"), Some("scoring")).unwrap();
        assert!(report.config_toml.contains("alpha"));
        assert!(!report.config_toml.contains("db_path"));
        assert_eq!(report.section.as_deref(), Some("scoring"));
    }

    #[test]
    fn show_unknown_section_is_an_error() {
        let config = HostlogConfig::default();
        let err = show_report(&config, Path::new("hostlog.toml"), Some("network")).unwrap_err();
        assert!(err.to_string().contains("unknown section"));
    }

    #[test]
    fn validation_report_text_marks_invalid() {
        let report = ConfigValidationReport {
            source: "hostlog.toml".to_owned(),
            valid: false,
            errors: vec!["invalid config value for 'storage.pool_size'".to_owned()],
        };
        let mut out = Vec::new();
        report.render_text(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("INVALID"));
        assert!(text.contains("storage.pool_size"));
    }
}
