//! Sync command implementation

use std::path::PathBuf;

use log::info;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, SyncArgs};
use crate::client::{PostmanClient, WorkspaceApi};
use crate::error::{Error, Result};
use crate::output;
use crate::sync::{ArtifactRecord, DEFAULT_SUMMARY_PATH, SyncOrchestrator, SyncSettings};

/// Resolve settings from flags, environment and config.
pub fn settings(args: &SyncArgs, ctx: &CommandContext) -> SyncSettings {
    let summary_path = if args.no_summary {
        None
    } else {
        Some(
            args.summary
                .clone()
                .or_else(|| ctx.config.preferences.summary_path.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SUMMARY_PATH)),
        )
    };

    SyncSettings {
        spec_path: args.spec.clone(),
        workspace_id: ctx.workspace_id(args.workspace_id.as_deref()),
        dry_run: args.dry_run,
        policy: args.policy.unwrap_or(ctx.config.preferences.policy),
        summary_path,
    }
}

/// Run the sync command and return the process exit code.
pub async fn run(args: &SyncArgs, opts: &GlobalOptions) -> Result<i32> {
    let ctx = CommandContext::new(opts)?;
    let settings = settings(args, &ctx);

    // A dry run never needs credentials
    let client: Option<PostmanClient> = if settings.dry_run {
        None
    } else {
        Some(ctx.client(args.max_attempts)?)
    };

    info!(
        "Syncing {} (policy: {}{})",
        settings.spec_path.display(),
        settings.policy,
        if settings.dry_run { ", dry run" } else { "" }
    );

    let mut orchestrator = SyncOrchestrator::new(settings);
    if let Some(client) = &client {
        orchestrator = orchestrator.with_api(client as &dyn WorkspaceApi);
    }

    let summary = orchestrator.run().await.inspect_err(report_abort)?;
    output::print(&summary, ctx.format)?;

    Ok(summary.state.exit_code())
}

/// Print what an aborted run had already written to the workspace.
fn report_abort(err: &Error) {
    match err {
        Error::Sync { completed, .. } if !completed.is_empty() => {
            eprintln!("Already synced before the abort:");
            for record in completed {
                eprintln!("  {}", abort_line(record));
            }
        }
        _ => {}
    }
}

fn abort_line(record: &ArtifactRecord) -> String {
    format!(
        "{} '{}': {} ({})",
        record.kind,
        record.name,
        record.outcome,
        record.remote_id.as_deref().unwrap_or("-")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::OverwritePolicy;
    use crate::config::Config;
    use clap::Parser;

    fn parse(argv: &[&str]) -> SyncArgs {
        let mut full = vec!["postsync", "sync"];
        full.extend_from_slice(argv);
        match crate::cli::Cli::try_parse_from(full).unwrap().command {
            crate::cli::Commands::Sync(args) => args,
            other => panic!("Expected Sync, got {:?}", other),
        }
    }

    fn context(config: Config) -> CommandContext {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        config.save_to(&path).unwrap();
        let opts = GlobalOptions {
            config: Some(path.display().to_string()),
            ..Default::default()
        };
        CommandContext::new(&opts).unwrap()
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = Config::default();
        config.workspace_id = Some("ws-config".to_string());
        config.preferences.policy = OverwritePolicy::Always;
        config.preferences.summary_path = Some(PathBuf::from("reports/summary.json"));
        let ctx = context(config);

        let args = parse(&[
            "--spec",
            "api.yaml",
            "--workspace-id",
            "ws-flag",
            "--policy",
            "create-only",
            "--summary",
            "out.json",
        ]);
        let settings = settings(&args, &ctx);
        assert_eq!(settings.workspace_id.as_deref(), Some("ws-flag"));
        assert_eq!(settings.policy, OverwritePolicy::CreateOnly);
        assert_eq!(settings.summary_path, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_config_fills_gaps() {
        let mut config = Config::default();
        config.workspace_id = Some("ws-config".to_string());
        config.preferences.policy = OverwritePolicy::Always;
        config.preferences.summary_path = Some(PathBuf::from("reports/summary.json"));
        let ctx = context(config);

        let args = SyncArgs {
            spec: PathBuf::from("api.yaml"),
            workspace_id: None,
            dry_run: false,
            policy: None,
            summary: None,
            no_summary: false,
            max_attempts: None,
        };
        let settings = settings(&args, &ctx);
        assert_eq!(settings.workspace_id.as_deref(), Some("ws-config"));
        assert_eq!(settings.policy, OverwritePolicy::Always);
        assert_eq!(settings.summary_path, Some(PathBuf::from("reports/summary.json")));
    }

    #[test]
    fn test_no_summary() {
        let ctx = context(Config::default());
        let args = parse(&["--spec", "api.yaml", "--no-summary"]);
        assert_eq!(settings(&args, &ctx).summary_path, None);
    }

    #[test]
    fn test_abort_line_names_remote_id() {
        let record = ArtifactRecord {
            kind: crate::sync::ArtifactKind::Collection,
            name: "Refunds API v1.0.0".to_string(),
            outcome: crate::sync::Outcome::Updated,
            remote_id: Some("7-c1".to_string()),
            error: None,
        };
        assert_eq!(
            abort_line(&record),
            "collection 'Refunds API v1.0.0': updated (7-c1)"
        );
    }
}
