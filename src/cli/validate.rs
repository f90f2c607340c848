//! Validate command implementation

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::error::Result;
use crate::output::{self, Formattable, json::format_json, table::format_table};
use crate::spec::{Issue, Severity, SpecDocument, load_spec};
use crate::sync::build_artifacts;

/// What a spec would produce, plus its lint findings
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub spec_path: String,
    pub spec_hash: String,
    pub collection: String,
    pub endpoint_count: usize,
    pub environments: Vec<String>,
    pub issues: Vec<Issue>,
}

#[derive(tabled::Tabled)]
struct IssueRow {
    #[tabled(rename = "SEVERITY")]
    severity: String,
    #[tabled(rename = "MESSAGE")]
    message: String,
}

impl ValidationReport {
    pub fn from_spec(spec: &SpecDocument) -> Self {
        let mut issues = spec.lint();
        let environments = match build_artifacts(spec) {
            Ok((_, environments)) => environments.into_iter().map(|e| e.name).collect(),
            Err(e) => {
                let message = e.to_string();
                if !issues.iter().any(|i| i.severity == Severity::Error) {
                    issues.push(Issue {
                        severity: Severity::Error,
                        message,
                    });
                }
                Vec::new()
            }
        };

        Self {
            spec_path: spec.source.display().to_string(),
            spec_hash: spec.hash.clone(),
            collection: spec.collection_name(),
            endpoint_count: spec.endpoint_count(),
            environments,
            issues,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    fn format_pretty(&self) -> String {
        let mut out = vec![
            format!("{} {}", "Spec:".bold(), self.spec_path),
            format!(
                "{} {} ({} endpoints)",
                "Collection:".bold(),
                self.collection,
                self.endpoint_count
            ),
        ];
        if !self.environments.is_empty() {
            out.push(format!(
                "{} {}",
                "Environments:".bold(),
                self.environments.join(", ")
            ));
        }
        out.push(String::new());

        if self.issues.is_empty() {
            out.push(format!("{} No issues found", "✓".green()));
        }
        for issue in &self.issues {
            let line = match issue.severity {
                Severity::Warning => issue.to_string().yellow(),
                Severity::Error => issue.to_string().red(),
            };
            out.push(line.to_string());
        }
        out.join("\n")
    }
}

impl Formattable for ValidationReport {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Pretty => Ok(self.format_pretty()),
            OutputFormat::Table => {
                let rows: Vec<IssueRow> = self
                    .issues
                    .iter()
                    .map(|i| IssueRow {
                        severity: match i.severity {
                            Severity::Warning => "warning".to_string(),
                            Severity::Error => "error".to_string(),
                        },
                        message: i.message.clone(),
                    })
                    .collect();
                Ok(format_table(&rows, "No issues found."))
            }
            OutputFormat::Json => Ok(format_json(self)?),
        }
    }
}

/// Run the validate command; exit code 1 when the document has errors.
pub fn run(spec_path: &Path, opts: &GlobalOptions) -> Result<i32> {
    let spec = load_spec(spec_path)?;
    let report = ValidationReport::from_spec(&spec);
    output::print(&report, opts.format)?;
    Ok(if report.has_errors() { 1 } else { 0 })
}
