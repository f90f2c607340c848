//! Configuration management for postsync

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::client::OverwritePolicy;
use crate::error::{ConfigError, Result};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Postman API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default workspace ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,

    /// Postman API host override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,
}

/// User preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Where sync writes its summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_path: Option<PathBuf>,

    /// Overwrite policy for existing artifacts
    #[serde(default)]
    pub policy: OverwritePolicy,

    /// Attempts per remote call, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_attempts() -> u32 {
    4
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            summary_path: None,
            policy: OverwritePolicy::default(),
            max_attempts: default_max_attempts(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".postsync").join("config.yaml"))
    }

    /// Config path from `--config`, falling back to the default location.
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration, treating a missing file as empty.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load_from(path) {
            Err(crate::error::Error::Config(ConfigError::NotFound)) => Ok(Self::default()),
            other => other,
        }
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, contents)?;

        // Holds the API key
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.preferences.max_attempts == 0 {
            return Err(
                ConfigError::Invalid("preferences.max_attempts must be at least 1".to_string())
                    .into(),
            );
        }
        if self.preferences.timeout_secs == 0 {
            return Err(
                ConfigError::Invalid("preferences.timeout_secs must be at least 1".to_string())
                    .into(),
            );
        }
        Ok(())
    }
}

/// Mask all but the last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), tail)
}
