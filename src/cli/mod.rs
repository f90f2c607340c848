//! CLI command definitions and handlers

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
pub use clap_complete::Shell;

use crate::client::OverwritePolicy;

pub mod args;
pub mod context;
pub mod init;
pub mod render;
pub mod status;
pub mod sync;
pub mod validate;

pub use args::{GlobalOptions, OutputFormat};
pub use context::CommandContext;

/// postsync - Keep Postman workspaces in step with OpenAPI specs
#[derive(Parser, Debug)]
#[command(name = "postsync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "POSTSYNC_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "POSTSYNC_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Override the Postman API host
    #[arg(long, global = true, env = "POSTSYNC_API_HOST", hide_env = true)]
    pub api_host: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "POSTSYNC_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sync a spec into a Postman workspace
    Sync(SyncArgs),

    /// Load and lint a spec without touching the network
    Validate {
        /// Path to the OpenAPI document (YAML or JSON)
        #[arg(long, short = 's')]
        spec: PathBuf,
    },

    /// Write the generated collection and environments to disk
    Render {
        /// Path to the OpenAPI document (YAML or JSON)
        #[arg(long, short = 's')]
        spec: PathBuf,

        /// Output directory
        #[arg(long, short = 'o', default_value = "postman")]
        out: PathBuf,
    },

    /// Print the collection's pre-request authentication script
    Script,

    /// Store API key and default workspace in the config file
    Init,

    /// Show resolved configuration
    Status,

    /// Display version information
    Version,

    /// Generate shell completions
    #[command(after_help = "\
Examples:
  bash:   postsync completion bash > /etc/bash_completion.d/postsync
  zsh:    postsync completion zsh > \"${fpath[1]}/_postsync\"
  fish:   postsync completion fish > ~/.config/fish/completions/postsync.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for `postsync sync`
#[derive(Debug, Clone, Args)]
pub struct SyncArgs {
    /// Path to the OpenAPI document (YAML or JSON)
    #[arg(long, short = 's')]
    pub spec: PathBuf,

    /// Target Postman workspace
    #[arg(long, short = 'w', env = "POSTMAN_WORKSPACE_ID", hide_env = true)]
    pub workspace_id: Option<String>,

    /// Build and report without calling the Postman API
    #[arg(long)]
    pub dry_run: bool,

    /// What to do with artifacts that already exist
    #[arg(long, value_enum)]
    pub policy: Option<OverwritePolicy>,

    /// Summary file location (default: sync-summary.json)
    #[arg(long, conflicts_with = "no_summary")]
    pub summary: Option<PathBuf>,

    /// Do not write a summary file
    #[arg(long)]
    pub no_summary: bool,

    /// Attempts per remote call, including the first
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: Option<u32>,
}
