//! Status command implementation

use std::path::PathBuf;

use colored::Colorize;

use crate::cli::CommandContext;
use crate::cli::args::GlobalOptions;
use crate::config::mask_secret;
use crate::error::Result;
use crate::sync::{DEFAULT_SUMMARY_PATH, SyncSummary};

/// Run the status command to display configuration status
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "postsync Configuration Status".bold());

    let ctx = CommandContext::new(opts)?;
    let exists = ctx.config_path.exists();

    let location = ctx.config_path.display().to_string();
    if exists {
        println!("Config file: {}", location.cyan());
    } else {
        println!("Config file: {} {}", location.cyan(), "(not found)".dimmed());
    }
    println!();

    match (ctx.api_key(), ctx.api_key_source()) {
        (Some(key), Some(source)) => println!(
            "{} API key configured: {} {}",
            "✓".green(),
            mask_secret(key),
            format!("(from {})", source).dimmed()
        ),
        _ => {
            println!("{} API key not configured", "✗".red());
            println!("  → Set POSTMAN_API_KEY or run 'postsync init'");
        }
    }

    match &ctx.config.workspace_id {
        Some(ws) => println!("{} Default workspace: {}", "✓".green(), ws),
        None => {
            println!("{} No default workspace set", "○".dimmed());
            println!("  → Pass --workspace-id or set POSTMAN_WORKSPACE_ID");
        }
    }

    println!("{} API host: {}", "○".dimmed(), ctx.api_host().cyan());

    let prefs = &ctx.config.preferences;
    println!(
        "{} Policy: {}, attempts: {}, timeout: {}s",
        "○".dimmed(),
        prefs.policy,
        prefs.max_attempts,
        prefs.timeout_secs
    );
    let summary_path = prefs
        .summary_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SUMMARY_PATH));
    println!("{} Summary file: {}", "○".dimmed(), summary_path.display());

    if summary_path.exists() {
        match SyncSummary::load_from(&summary_path) {
            Ok(last) => println!(
                "{} Last sync: {} {} ({})",
                "✓".green(),
                last.timestamp,
                last.state,
                last.tally()
            ),
            Err(e) => println!("{} Last sync summary unreadable: {}", "✗".red(), e),
        }
    } else {
        println!("{} No sync summary yet", "○".dimmed());
    }
    println!();

    Ok(())
}
