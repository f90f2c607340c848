//! Run summary: what was synced and how it went

use std::path::Path;

use colored::Colorize;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use super::RunState;
use crate::cli::OutputFormat;
use crate::client::UpsertOutcome;
use crate::error::Result;
use crate::output::{Formattable, json::format_json, table::format_table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Collection,
    Environment,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            ArtifactKind::Collection => "collection",
            ArtifactKind::Environment => "environment",
        })
    }
}

/// Per-artifact result; `Planned` only appears in dry runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Created,
    Updated,
    Unchanged,
    Failed,
    Planned,
}

impl From<UpsertOutcome> for Outcome {
    fn from(outcome: UpsertOutcome) -> Self {
        match outcome {
            UpsertOutcome::Created => Outcome::Created,
            UpsertOutcome::Updated => Outcome::Updated,
            UpsertOutcome::Unchanged => Outcome::Unchanged,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Outcome::Created => "created",
            Outcome::Updated => "updated",
            Outcome::Unchanged => "unchanged",
            Outcome::Failed => "failed",
            Outcome::Planned => "planned",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub kind: ArtifactKind,
    pub name: String,
    pub outcome: Outcome,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Record of one sync run, persisted as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSummary {
    /// Run start (RFC 3339)
    pub timestamp: String,
    pub dry_run: bool,
    pub spec_path: String,
    pub spec_hash: String,
    pub workspace_id: Option<String>,
    pub api_name: String,
    pub api_version: String,
    pub endpoint_count: usize,
    pub state: RunState,
    pub duration_ms: u64,

    /// Retries the client needed across the run
    #[serde(default)]
    pub retries: u32,
    pub artifacts: Vec<ArtifactRecord>,
}

#[derive(Tabled)]
struct ArtifactRow {
    #[tabled(rename = "KIND")]
    kind: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "OUTCOME")]
    outcome: String,
    #[tabled(rename = "REMOTE ID")]
    remote_id: String,
    #[tabled(rename = "ERROR")]
    error: String,
}

impl SyncSummary {
    pub fn count(&self, outcome: Outcome) -> usize {
        self.artifacts
            .iter()
            .filter(|a| a.outcome == outcome)
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ArtifactRecord> {
        self.artifacts
            .iter()
            .filter(|a| a.outcome == Outcome::Failed)
    }

    /// Persist as pretty JSON at `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// One-line tally, e.g. `1 created, 2 unchanged, 1 failed`.
    pub fn tally(&self) -> String {
        let outcomes = [
            Outcome::Planned,
            Outcome::Created,
            Outcome::Updated,
            Outcome::Unchanged,
            Outcome::Failed,
        ];
        let parts: Vec<String> = outcomes
            .iter()
            .map(|o| (o, self.count(*o)))
            .filter(|(_, n)| *n > 0)
            .map(|(o, n)| format!("{} {}", n, o))
            .collect();
        if parts.is_empty() {
            "nothing synced".to_string()
        } else {
            parts.join(", ")
        }
    }

    fn format_pretty(&self) -> String {
        let mut out = Vec::new();
        let title = if self.dry_run {
            format!("{} (dry run)", "Sync plan".bold())
        } else {
            "Sync summary".bold().to_string()
        };
        out.push(title);
        out.push(format!(
            "{} v{} | {} endpoints | spec {}",
            self.api_name, self.api_version, self.endpoint_count, self.spec_hash
        ));
        if let Some(ws) = &self.workspace_id {
            out.push(format!("Workspace: {}", ws.cyan()));
        }
        out.push(String::new());

        for record in &self.artifacts {
            let marker = match record.outcome {
                Outcome::Created | Outcome::Updated => "✓".green(),
                Outcome::Unchanged => "=".dimmed(),
                Outcome::Planned => "○".cyan(),
                Outcome::Failed => "✗".red(),
            };
            let mut line = format!(
                "{} {:<9} {:<11} {}",
                marker, record.outcome, record.kind, record.name
            );
            if let Some(error) = &record.error {
                line.push_str(&format!("\n    {}", error.red()));
            }
            out.push(line);
        }

        out.push(String::new());
        let state = match self.state {
            RunState::Completed => self.state.to_string().green(),
            RunState::CompletedWithErrors => self.state.to_string().yellow(),
            _ => self.state.to_string().red(),
        };
        out.push(format!(
            "{}: {} in {:.1}s",
            state,
            self.tally(),
            self.duration_ms as f64 / 1000.0
        ));
        out.join("\n")
    }

    fn rows(&self) -> Vec<ArtifactRow> {
        self.artifacts
            .iter()
            .map(|a| ArtifactRow {
                kind: a.kind.to_string(),
                name: a.name.clone(),
                outcome: a.outcome.to_string(),
                remote_id: a.remote_id.clone().unwrap_or_else(|| "-".to_string()),
                error: a.error.clone().unwrap_or_default(),
            })
            .collect()
    }
}

impl Formattable for SyncSummary {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Pretty => Ok(self.format_pretty()),
            OutputFormat::Table => Ok(format!(
                "{}\n{}: {}",
                format_table(&self.rows(), "No artifacts."),
                self.state,
                self.tally()
            )),
            OutputFormat::Json => Ok(format_json(self)?),
        }
    }
}
