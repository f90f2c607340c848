//! Global CLI options shared across all commands

use crate::cli::{Cli, OutputFormat};

/// Global CLI options passed to all command handlers.
///
/// # Precedence
///
/// CLI flag > environment variable > config file > default. This struct
/// captures the CLI/env layer; config file values are merged in
/// `CommandContext`.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Output format (pretty, table, json)
    pub format: OutputFormat,

    /// Custom config file path (defaults to ~/.postsync/config.yaml)
    pub config: Option<String>,

    /// Postman API host override
    pub api_host: Option<String>,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            api_host: cli.api_host.clone(),
        }
    }

    /// Get config path as `Option<&str>`.
    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// Get API host override as `Option<&str>`.
    pub fn api_host_ref(&self) -> Option<&str> {
        self.api_host.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_from_cli_copies_globals() {
        let cli = Cli::try_parse_from([
            "postsync",
            "--format",
            "json",
            "--config",
            "/custom/path",
            "--api-host",
            "http://localhost:8080",
            "status",
        ])
        .unwrap();
        let opts = GlobalOptions::from_cli(&cli);

        assert_eq!(opts.format, OutputFormat::Json);
        assert_eq!(opts.config_ref(), Some("/custom/path"));
        assert_eq!(opts.api_host_ref(), Some("http://localhost:8080"));
    }

    #[test]
    fn test_none_accessors() {
        let opts = GlobalOptions::default();
        assert_eq!(opts.format, OutputFormat::Pretty);
        assert_eq!(opts.config_ref(), None);
        assert_eq!(opts.api_host_ref(), None);
    }
}
