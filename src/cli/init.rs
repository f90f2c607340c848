//! Init command implementation

use colored::Colorize;
use dialoguer::{Input, Password, theme::ColorfulTheme};

use crate::cli::args::GlobalOptions;
use crate::config::Config;
use crate::error::Result;

/// Run the init command
///
/// Prompts for the Postman API key and an optional default workspace, then
/// saves them to the config file. Existing preferences are kept.
pub fn run(opts: &GlobalOptions) -> Result<()> {
    let config_path = Config::resolve_path(opts.config_ref())?;
    let mut config = Config::load_or_default(&config_path)?;

    println!("{}", "Welcome to postsync!".bold().green());
    println!("Let's set up your Postman configuration.\n");

    let api_key: String = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Enter your Postman API key")
        .interact()?;

    let workspace_id: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Default workspace ID (leave empty to skip)")
        .with_initial_text(config.workspace_id.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    config.api_key = Some(api_key.trim().to_string());
    let workspace_id = workspace_id.trim();
    config.workspace_id = if workspace_id.is_empty() {
        None
    } else {
        Some(workspace_id.to_string())
    };
    if let Some(host) = opts.api_host_ref() {
        config.api_host = Some(host.to_string());
    }

    config.save_to(&config_path)?;

    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        config_path.display()
    );
    if let Some(ws) = &config.workspace_id {
        println!("  Default workspace: {}", ws.bold());
    }

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Show configuration status", "postsync status".cyan());
    println!(
        "  {} - Preview a sync",
        "postsync sync --spec openapi.yaml --dry-run".cyan()
    );

    Ok(())
}
