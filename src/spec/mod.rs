//! OpenAPI specification loading and validation
//!
//! [`load_spec`] reads a YAML or JSON document from disk, checks that the
//! sections the builders depend on are present, and returns an immutable
//! [`SpecDocument`]. Builders never re-check field presence after this point.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::SpecError;

pub mod model;
pub mod resolve;

pub use model::{
    Components, HttpMethod, Info, MediaType, Operation, Parameter, ParameterLocation, PathItem,
    ReferenceOr, RequestBody, Schema, Server,
};
pub use resolve::Resolver;

use model::RawSpec;

/// Title used when `info.title` is absent
pub const DEFAULT_TITLE: &str = "API Collection";

/// Version used when `info.version` is absent
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Parsed, validated OpenAPI document
#[derive(Debug, Clone)]
pub struct SpecDocument {
    /// Where the document was loaded from
    pub source: PathBuf,

    /// Short content hash of the raw file, for change tracking
    pub hash: String,

    /// `openapi` (or legacy `swagger`) version string
    pub spec_version: Option<String>,

    pub info: Info,

    pub servers: Vec<Server>,

    pub paths: IndexMap<String, PathItem>,

    pub components: Components,
}

/// Input format of a spec file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    Json,
    Yaml,
    /// Unknown extension: try JSON, then YAML
    Detect,
}

impl SpecFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SpecFormat::Json,
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                SpecFormat::Yaml
            }
            _ => SpecFormat::Detect,
        }
    }
}

/// Load and validate an OpenAPI document from `path`.
///
/// # Errors
/// - [`SpecError::NotFound`] if the file does not exist
/// - [`SpecError::Parse`] if the content is not valid YAML/JSON or has the wrong shape
/// - [`SpecError::Incomplete`] if `info`, `servers` or a non-empty `paths` is missing
pub fn load_spec(path: impl AsRef<Path>) -> Result<SpecDocument, SpecError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SpecError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|e| SpecError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    debug!("Read {} bytes from {}", content.len(), path.display());
    parse_spec(&content, SpecFormat::from_path(path), path)
}

/// Parse spec content that has already been read into memory.
pub fn parse_spec(content: &str, format: SpecFormat, path: &Path) -> Result<SpecDocument, SpecError> {
    let parse_error = |message: String| SpecError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let raw: RawSpec = match format {
        SpecFormat::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?,
        SpecFormat::Yaml => serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?,
        SpecFormat::Detect => serde_json::from_str(content)
            .or_else(|_| serde_yaml::from_str(content))
            .map_err(|e: serde_yaml::Error| parse_error(e.to_string()))?,
    };

    let incomplete = |reason: &str| SpecError::Incomplete {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let info = raw.info.ok_or_else(|| incomplete("missing 'info' section"))?;
    let paths = raw.paths.ok_or_else(|| incomplete("missing 'paths' section"))?;
    if paths.is_empty() {
        return Err(incomplete("'paths' section is empty"));
    }
    let servers = raw
        .servers
        .ok_or_else(|| incomplete("missing 'servers' section"))?;

    Ok(SpecDocument {
        source: path.to_path_buf(),
        hash: content_hash(content),
        spec_version: raw.openapi.or(raw.swagger),
        info,
        servers,
        paths,
        components: raw.components,
    })
}

/// First 8 hex characters of the SHA-256 of `content`.
pub fn content_hash(content: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(content.as_bytes()));
    digest[..8].to_string()
}

/// Severity of a lint finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// Non-fatal problem found in an otherwise loadable spec
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
}

impl Issue {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        write!(f, "{}: {}", label, self.message)
    }
}

impl SpecDocument {
    pub fn title(&self) -> &str {
        self.info.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    pub fn api_version(&self) -> &str {
        self.info.version.as_deref().unwrap_or(DEFAULT_VERSION)
    }

    /// Display name of the generated collection: `"<title> v<version>"`.
    pub fn collection_name(&self) -> String {
        format!("{} v{}", self.title(), self.api_version())
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.components)
    }

    /// Every operation in declaration order, methods in fixed order per path.
    pub fn operations(&self) -> impl Iterator<Item = (&str, HttpMethod, &PathItem, &Operation)> {
        self.paths.iter().flat_map(|(path, item)| {
            item.operations()
                .map(move |(method, op)| (path.as_str(), method, item, op))
        })
    }

    pub fn endpoint_count(&self) -> usize {
        self.operations().count()
    }

    /// Collect non-fatal validation findings.
    pub fn lint(&self) -> Vec<Issue> {
        let mut issues = Vec::new();

        if self.spec_version.is_none() {
            issues.push(Issue::warning("Missing 'openapi' or 'swagger' version field"));
        }
        if self.info.title.is_none() {
            issues.push(Issue::warning(format!(
                "Missing 'info.title' (using '{}')",
                DEFAULT_TITLE
            )));
        }
        if self.servers.is_empty() {
            issues.push(Issue::error(
                "No servers declared; environments cannot be generated",
            ));
        }
        for server in &self.servers {
            for (name, variable) in &server.variables {
                let listed = variable.allowed.iter().any(|v| {
                    v.as_str().map_or_else(|| v.to_string(), str::to_string) == variable.default
                });
                if !variable.allowed.is_empty() && !listed {
                    issues.push(Issue::warning(format!(
                        "Server {} variable '{}' default '{}' is not one of its enum values",
                        server.url, name, variable.default
                    )));
                }
            }
        }

        let resolver = self.resolver();
        for (path, item) in &self.paths {
            if !path.starts_with('/') {
                issues.push(Issue::error(format!("Path '{}' must start with '/'", path)));
            }
            if item.operations().next().is_none() {
                issues.push(Issue::warning(format!(
                    "{} declares no GET/POST/PUT/PATCH/DELETE operations",
                    path
                )));
            }
            for (method, op) in item.operations() {
                if op.operation_id.is_none() {
                    issues.push(Issue::warning(format!(
                        "{} {} missing operationId",
                        method, path
                    )));
                }
                let unresolved = op
                    .parameters
                    .iter()
                    .chain(item.parameters.iter())
                    .filter(|p| resolver.parameter(p).is_none())
                    .count();
                if unresolved > 0 {
                    issues.push(Issue::warning(format!(
                        "{} {} has {} unresolvable parameter reference(s)",
                        method, path, unresolved
                    )));
                }
            }
        }

        issues
    }
}
