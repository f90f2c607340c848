//! Render command implementation
//!
//! Writes the generated artifacts as Postman import files:
//! `<slug>.postman_collection.json` and one
//! `<slug>-<stage>.postman_environment.json` per environment.

use std::path::{Path, PathBuf};

use colored::Colorize;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::error::Result;
use crate::output::{self, Formattable, json::format_json, table::format_table};
use crate::spec::load_spec;
use crate::sync::{ArtifactKind, build_artifacts};

#[derive(Debug, Serialize)]
pub struct RenderedFile {
    pub kind: ArtifactKind,
    pub name: String,
    pub path: PathBuf,
}

#[derive(tabled::Tabled)]
struct FileRow {
    #[tabled(rename = "KIND")]
    kind: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "FILE")]
    path: String,
}

#[derive(Debug, Serialize)]
pub struct RenderReport {
    pub files: Vec<RenderedFile>,
}

impl Formattable for RenderReport {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Pretty => Ok(self
                .files
                .iter()
                .map(|f| format!("{} {} {}", "✓".green(), f.name, f.path.display().to_string().dimmed()))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let rows: Vec<FileRow> = self
                    .files
                    .iter()
                    .map(|f| FileRow {
                        kind: f.kind.to_string(),
                        name: f.name.clone(),
                        path: f.path.display().to_string(),
                    })
                    .collect();
                Ok(format_table(&rows, "No files written."))
            }
            OutputFormat::Json => Ok(format_json(self)?),
        }
    }
}

/// Lowercase, dash-separated file name stem.
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() { "api".to_string() } else { out }
}

/// Build artifacts for `spec_path` and write them under `out_dir`.
pub fn render(spec_path: &Path, out_dir: &Path) -> Result<RenderReport> {
    let spec = load_spec(spec_path)?;
    let (collection, environments) = build_artifacts(&spec)?;
    std::fs::create_dir_all(out_dir)?;

    let stem = slug(spec.title());
    let mut files = Vec::with_capacity(environments.len() + 1);

    let path = out_dir.join(format!("{}.postman_collection.json", stem));
    std::fs::write(&path, serde_json::to_string_pretty(&collection)?)?;
    files.push(RenderedFile {
        kind: ArtifactKind::Collection,
        name: collection.info.name.clone(),
        path,
    });

    for environment in &environments {
        let path = out_dir.join(format!("{}.postman_environment.json", slug(&environment.name)));
        std::fs::write(&path, serde_json::to_string_pretty(environment)?)?;
        files.push(RenderedFile {
            kind: ArtifactKind::Environment,
            name: environment.name.clone(),
            path,
        });
    }

    Ok(RenderReport { files })
}

/// Run the render command
pub fn run(spec_path: &Path, out_dir: &Path, opts: &GlobalOptions) -> Result<()> {
    let report = render(spec_path, out_dir)?;
    output::print(&report, opts.format)
}
