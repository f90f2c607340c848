//! Sync orchestration
//!
//! A run walks `Loading → Building → Syncing → Summarizing` and ends in one
//! of `Completed`, `CompletedWithErrors` or `Aborted`. Spec and build errors
//! abort before the workspace is touched. Each artifact upsert is independent:
//! a remote failure is recorded and the run moves on, except for rejected
//! credentials, which abort immediately.

use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::build::{build_collection, build_environments};
use crate::client::upsert::{upsert_collection, upsert_environment};
use crate::client::{OverwritePolicy, UpsertResult, WorkspaceApi};
use crate::error::{ApiError, ConfigError, Error, Result};
use crate::postman::{PostmanCollection, PostmanEnvironment};
use crate::spec::{SpecDocument, load_spec};

pub mod summary;

pub use summary::{ArtifactKind, ArtifactRecord, Outcome, SyncSummary};

/// Default location of the run summary
pub const DEFAULT_SUMMARY_PATH: &str = "sync-summary.json";

/// Inputs of one run, resolved from flags, environment and config
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub spec_path: PathBuf,

    /// Target workspace; required unless `dry_run`
    pub workspace_id: Option<String>,

    pub dry_run: bool,

    pub policy: OverwritePolicy,

    /// Where to write the summary; `None` skips writing
    pub summary_path: Option<PathBuf>,
}

impl SyncSettings {
    pub fn new(spec_path: impl Into<PathBuf>) -> Self {
        Self {
            spec_path: spec_path.into(),
            workspace_id: None,
            dry_run: false,
            policy: OverwritePolicy::default(),
            summary_path: Some(PathBuf::from(DEFAULT_SUMMARY_PATH)),
        }
    }
}

/// Lifecycle of a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Loading,
    Building,
    Syncing,
    Summarizing,
    Completed,
    CompletedWithErrors,
    Aborted,
}

impl RunState {
    /// Process exit code for a finished run.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunState::Completed => 0,
            RunState::CompletedWithErrors => 2,
            _ => 1,
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            RunState::Loading => "Loading",
            RunState::Building => "Building",
            RunState::Syncing => "Syncing",
            RunState::Summarizing => "Summarizing",
            RunState::Completed => "Completed",
            RunState::CompletedWithErrors => "Completed with errors",
            RunState::Aborted => "Aborted",
        })
    }
}

/// Drives one sync run.
pub struct SyncOrchestrator<'a> {
    settings: SyncSettings,
    api: Option<&'a dyn WorkspaceApi>,
    state: RunState,
}

impl<'a> SyncOrchestrator<'a> {
    /// Orchestrator without a workspace client; only dry runs can proceed.
    pub fn new(settings: SyncSettings) -> Self {
        Self {
            settings,
            api: None,
            state: RunState::Loading,
        }
    }

    pub fn with_api(mut self, api: &'a dyn WorkspaceApi) -> Self {
        self.api = Some(api);
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        debug!("Run state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn abort(&mut self, err: impl Into<Error>) -> Error {
        self.transition(RunState::Aborted);
        err.into()
    }

    /// Execute the run and return its summary.
    ///
    /// # Errors
    /// Spec, build and configuration errors, rejected credentials
    /// ([`Error::Sync`]) and failure to write the summary file. Other remote
    /// failures are reported per artifact in the summary instead.
    pub async fn run(&mut self) -> Result<SyncSummary> {
        let started = Instant::now();
        let timestamp = Utc::now().to_rfc3339();

        let target = if self.settings.dry_run {
            None
        } else {
            let workspace = match self.settings.workspace_id.clone() {
                Some(ws) => ws,
                None => return Err(self.abort(ConfigError::MissingWorkspaceId)),
            };
            let Some(api) = self.api else {
                return Err(self.abort(ConfigError::MissingApiKey));
            };
            Some((api, workspace))
        };

        self.transition(RunState::Loading);
        let spec = match load_spec(&self.settings.spec_path) {
            Ok(spec) => spec,
            Err(e) => return Err(self.abort(e)),
        };
        for issue in spec.lint() {
            warn!("{}", issue);
        }
        info!(
            "Loaded {} ({} endpoints, hash {})",
            spec.collection_name(),
            spec.endpoint_count(),
            spec.hash
        );

        self.transition(RunState::Building);
        let (collection, environments) = match build_artifacts(&spec) {
            Ok(artifacts) => artifacts,
            Err(e) => return Err(self.abort(e)),
        };

        self.transition(RunState::Syncing);
        let artifacts = match &target {
            None => plan(&collection, &environments),
            Some((api, workspace)) => {
                self.sync_all(*api, workspace, &collection, &environments)
                    .await?
            }
        };

        self.transition(RunState::Summarizing);
        let failed = artifacts.iter().any(|a| a.outcome == Outcome::Failed);
        let state = if failed {
            RunState::CompletedWithErrors
        } else {
            RunState::Completed
        };

        let summary = SyncSummary {
            timestamp,
            dry_run: self.settings.dry_run,
            spec_path: self.settings.spec_path.display().to_string(),
            spec_hash: spec.hash.clone(),
            workspace_id: self.settings.workspace_id.clone(),
            api_name: spec.title().to_string(),
            api_version: spec.api_version().to_string(),
            endpoint_count: spec.endpoint_count(),
            state,
            duration_ms: started.elapsed().as_millis() as u64,
            retries: target.as_ref().map(|(api, _)| api.retry_count()).unwrap_or(0),
            artifacts,
        };

        if let Some(path) = &self.settings.summary_path {
            if let Err(e) = summary.write_to(path) {
                return Err(self.abort(e));
            }
            info!("Summary written to {}", path.display());
        }

        self.transition(state);
        Ok(summary)
    }

    async fn sync_all(
        &mut self,
        api: &dyn WorkspaceApi,
        workspace: &str,
        collection: &PostmanCollection,
        environments: &[PostmanEnvironment],
    ) -> Result<Vec<ArtifactRecord>> {
        let policy = self.settings.policy;
        let mut records = Vec::with_capacity(environments.len() + 1);

        let name = &collection.info.name;
        let result = upsert_collection(api, workspace, collection, policy).await;
        self.record(&mut records, ArtifactKind::Collection, name, result)?;

        for environment in environments {
            let result = upsert_environment(api, workspace, environment, policy).await;
            self.record(&mut records, ArtifactKind::Environment, &environment.name, result)?;
        }

        Ok(records)
    }

    /// Append the record for an upsert result; rejected credentials abort
    /// and hand the records written so far to the error.
    fn record(
        &mut self,
        records: &mut Vec<ArtifactRecord>,
        kind: ArtifactKind,
        name: &str,
        result: std::result::Result<UpsertResult, ApiError>,
    ) -> Result<()> {
        let record = match result {
            Ok(upsert) => {
                let outcome = Outcome::from(upsert.outcome);
                info!("{} '{}': {} ({})", kind, name, outcome, upsert.remote_id);
                ArtifactRecord {
                    kind,
                    name: name.to_string(),
                    outcome,
                    remote_id: Some(upsert.remote_id),
                    error: None,
                }
            }
            Err(source @ ApiError::Auth { .. }) => {
                for done in records.iter() {
                    warn!("{} '{}' was {} before the abort", done.kind, done.name, done.outcome);
                }
                return Err(self.abort(Error::Sync {
                    artifact: name.to_string(),
                    source,
                    completed: std::mem::take(records),
                }));
            }
            Err(e) => {
                warn!("{} '{}' failed: {}", kind, name, e);
                ArtifactRecord {
                    kind,
                    name: name.to_string(),
                    outcome: Outcome::Failed,
                    remote_id: None,
                    error: Some(e.to_string()),
                }
            }
        };
        records.push(record);
        Ok(())
    }
}

/// Build the collection and all environments for `spec`.
pub fn build_artifacts(
    spec: &SpecDocument,
) -> std::result::Result<(PostmanCollection, Vec<PostmanEnvironment>), crate::error::BuildError> {
    Ok((build_collection(spec)?, build_environments(spec)?))
}

fn plan(collection: &PostmanCollection, environments: &[PostmanEnvironment]) -> Vec<ArtifactRecord> {
    info!(
        "[dry run] would upsert collection '{}' ({} requests in {} folders)",
        collection.info.name,
        collection.request_count(),
        collection.folder_count()
    );
    let mut records = vec![planned(ArtifactKind::Collection, &collection.info.name)];
    for environment in environments {
        info!("[dry run] would upsert environment '{}'", environment.name);
        records.push(planned(ArtifactKind::Environment, &environment.name));
    }
    records
}

fn planned(kind: ArtifactKind, name: &str) -> ArtifactRecord {
    ArtifactRecord {
        kind,
        name: name.to_string(),
        outcome: Outcome::Planned,
        remote_id: None,
        error: None,
    }
}
