//! Command execution context
//!
//! Merges global flags, environment and the config file once so handlers
//! see a single resolved view.

use std::path::PathBuf;
use std::time::Duration;

use log::debug;

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::postman::API_BASE_URL;
use crate::client::{PostmanClient, RetryPolicy};
use crate::config::Config;
use crate::error::{ConfigError, Result};

/// Environment variable holding the Postman API key
pub const API_KEY_ENV: &str = "POSTMAN_API_KEY";

/// Resolved configuration and runtime options for one command.
pub struct CommandContext {
    /// Loaded configuration; empty when no config file exists
    pub config: Config,
    /// Where the config was (or would be) loaded from
    pub config_path: PathBuf,
    /// Output format preference
    pub format: OutputFormat,
    api_host: Option<String>,
    env_api_key: Option<String>,
}

impl CommandContext {
    /// Load config (a missing file is fine) and capture the environment.
    ///
    /// # Errors
    /// Returns error if the config file exists but cannot be parsed.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config_path = Config::resolve_path(opts.config_ref())?;
        let config = Config::load_or_default(&config_path)?;
        debug!("Using config {}", config_path.display());

        Ok(Self {
            config,
            config_path,
            format: opts.format,
            api_host: opts.api_host.clone(),
            env_api_key: std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()),
        })
    }

    /// API key: environment first, then config file.
    pub fn api_key(&self) -> Option<&str> {
        self.env_api_key
            .as_deref()
            .or(self.config.api_key.as_deref())
    }

    /// Where the API key came from, for status output.
    pub fn api_key_source(&self) -> Option<&'static str> {
        if self.env_api_key.is_some() {
            Some(API_KEY_ENV)
        } else if self.config.api_key.is_some() {
            Some("config file")
        } else {
            None
        }
    }

    /// API host: flag/env, then config file, then the public Postman API.
    pub fn api_host(&self) -> &str {
        self.api_host
            .as_deref()
            .or(self.config.api_host.as_deref())
            .unwrap_or(API_BASE_URL)
    }

    /// Workspace: flag/env, then config file.
    pub fn workspace_id(&self, flag: Option<&str>) -> Option<String> {
        flag.map(str::to_string)
            .or_else(|| self.config.workspace_id.clone())
    }

    /// Build a Postman client from the resolved settings.
    ///
    /// `max_attempts` overrides the configured attempt count.
    pub fn client(&self, max_attempts: Option<u32>) -> Result<PostmanClient> {
        let api_key = self.api_key().ok_or(ConfigError::MissingApiKey)?;
        let prefs = &self.config.preferences;
        let retry = RetryPolicy::default()
            .with_max_attempts(max_attempts.unwrap_or(prefs.max_attempts));

        let client = PostmanClient::new(api_key)?
            .with_base_url(self.api_host())
            .with_retry(retry)
            .with_timeout(Duration::from_secs(prefs.timeout_secs));
        debug!("Postman API at {}", client.base_url());
        Ok(client)
    }
}
