//! Error types for postsync

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::sync::ArtifactRecord;

/// Result type alias for postsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Result of a single workspace API operation
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A remote failure that stopped the run while syncing one artifact
    #[error("Sync of '{artifact}' aborted: {source}")]
    Sync {
        artifact: String,
        #[source]
        source: ApiError,
        /// Artifacts already written when the run stopped
        completed: Vec<ArtifactRecord>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

/// OpenAPI document loading errors
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("Spec file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to parse spec {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Spec {} is incomplete: {reason}", .path.display())]
    Incomplete { path: PathBuf, reason: String },
}

/// Errors raised while turning a spec into Postman artifacts
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Invalid path template '{0}': paths must start with '/'")]
    InvalidPath(String),

    #[error("Spec declares no servers; at least one is needed to build environments")]
    NoServers,
}

/// Postman API errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error(
        "Authentication failed (HTTP {status}). Check POSTMAN_API_KEY or run `postsync init`."
    )]
    Auth { status: u16 },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Postman API unavailable after {attempts} attempts: {reason}")]
    RemoteUnavailable { attempts: u32, reason: String },

    #[error("Rate limit exceeded. Retry after {0:?}")]
    RateLimit(Duration),

    #[error("Bad request (HTTP {status}): {message}")]
    BadRequest { status: u16, message: String },

    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Whether another attempt could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ApiError::RateLimit(_) | ApiError::ServerError { .. } | ApiError::Network(_)
        )
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to Postman API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found. Run `postsync init` to set up.")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("API key not configured. Set POSTMAN_API_KEY or run `postsync init`.")]
    MissingApiKey,

    #[error("Workspace not configured. Pass --workspace-id or set POSTMAN_WORKSPACE_ID.")]
    MissingWorkspaceId,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
