//! `hostlog scores` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use hostlog_core::config::HostlogConfig;
use hostlog_core::types::HostScore;
use hostlog_visibility::{ScoreBreakdown, VisibilityScorer, rank};

use crate::cli::ScoresArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `scores` command.
pub async fn execute(
    args: ScoresArgs,
    config: &HostlogConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let scorer = super::open_scorer(config).await?;
    match args.host {
        Some(host) => writer.render(&breakdown(&scorer, &host).await?),
        None => writer.render(&ranking(&scorer, args.top).await?),
    }
}

/// Score every host and rank them, optionally keeping only the top `n`.
pub async fn ranking(
    scorer: &VisibilityScorer,
    top: Option<usize>,
) -> Result<ScoreListReport, CliError> {
    let scores = scorer.score_all().await?;
    let mut ranked = rank(&scores);
    if let Some(n) = top {
        ranked.truncate(n);
    }
    info!(hosts_scored = scores.len(), shown = ranked.len(), "computed scores");
    Ok(ScoreListReport {
        hosts_scored: scores.len(),
        scores: ranked,
    })
}

/// Score one host with its components.
pub async fn breakdown(scorer: &VisibilityScorer, host: &str) -> Result<ScoreBreakdown, CliError> {
    Ok(scorer.breakdown(host).await?)
}

#[derive(Debug, Serialize)]
pub struct ScoreListReport {
    pub hosts_scored: usize,
    pub scores: Vec<HostScore>,
}

impl Render for ScoreListReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Visibility scores ({} hosts scored)",
            self.hosts_scored.to_string().bold()
        )?;
        writeln!(w)?;
        writeln!(w, "{:<5} {:<40} {:>10}", "Rank", "Host", "Score")?;
        writeln!(w, "{}", "-".repeat(57))?;
        for (i, s) in self.scores.iter().enumerate() {
            writeln!(
                w,
                "{:<5} {:<40} {:>10.2}",
                i + 1,
                s.host_identity,
                s.score
            )?;
        }
        Ok(())
    }
}

impl Render for ScoreBreakdown {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let counts = &self.severity_counts;
        writeln!(w, "Visibility score for {}", self.host_identity.bold())?;
        writeln!(w, "  Score:       {}", format!("{:.2}", self.score).bold())?;
        writeln!(
            w,
            "  Time decay:  {:>8.2}  (last entry {:.1}h ago)",
            self.time_decay, self.hours_since_last
        )?;
        writeln!(
            w,
            "  Volume:      {:>8.2}  ({} entries in window)",
            self.volume, self.recent_count
        )?;
        writeln!(
            w,
            "  Severity:    {:>8.2}  (error {}, warning {}, info {})",
            self.severity,
            counts.error.to_string().red(),
            counts.warning.to_string().yellow(),
            counts.info
        )?;
        Ok(())
    }
}
