//! Find-by-name and create-or-update for workspace artifacts
//!
//! Artifacts are matched by exact name. Whether an existing artifact is
//! overwritten is decided by [`OverwritePolicy`].

use clap::ValueEnum;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{RemoteArtifact, WorkspaceApi};
use crate::error::ApiResult;
use crate::postman::{PostmanCollection, PostmanEnvironment};

/// When an existing remote artifact is replaced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OverwritePolicy {
    /// Update whenever a same-named artifact exists
    Always,
    /// Update only when the generated content differs from the remote
    #[default]
    IfChanged,
    /// Never touch existing artifacts
    CreateOnly,
}

impl std::fmt::Display for OverwritePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OverwritePolicy::Always => "always",
            OverwritePolicy::IfChanged => "if-changed",
            OverwritePolicy::CreateOnly => "create-only",
        };
        write!(f, "{}", name)
    }
}

/// What an upsert did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertResult {
    pub outcome: UpsertOutcome,
    pub remote_id: String,
}

impl UpsertResult {
    fn new(outcome: UpsertOutcome, remote_id: impl Into<String>) -> Self {
        Self {
            outcome,
            remote_id: remote_id.into(),
        }
    }
}

pub async fn find_collection_by_name(
    api: &dyn WorkspaceApi,
    workspace_id: &str,
    name: &str,
) -> ApiResult<Option<RemoteArtifact>> {
    let collections = api.list_collections(workspace_id).await?;
    Ok(first_named(collections, name, "collection"))
}

pub async fn find_environment_by_name(
    api: &dyn WorkspaceApi,
    workspace_id: &str,
    name: &str,
) -> ApiResult<Option<RemoteArtifact>> {
    let environments = api.list_environments(workspace_id).await?;
    Ok(first_named(environments, name, "environment"))
}

fn first_named(artifacts: Vec<RemoteArtifact>, name: &str, kind: &str) -> Option<RemoteArtifact> {
    let mut matches = artifacts.into_iter().filter(|a| a.name == name);
    let first = matches.next();
    let extra = matches.count();
    if extra > 0 {
        warn!(
            "{} {}s named '{}' in workspace; using the first",
            extra + 1,
            kind,
            name
        );
    }
    first
}

/// Create the collection, or update the same-named one per `policy`.
pub async fn upsert_collection(
    api: &dyn WorkspaceApi,
    workspace_id: &str,
    collection: &PostmanCollection,
    policy: OverwritePolicy,
) -> ApiResult<UpsertResult> {
    let name = &collection.info.name;
    let Some(existing) = find_collection_by_name(api, workspace_id, name).await? else {
        let created = api.create_collection(workspace_id, collection).await?;
        return Ok(UpsertResult::new(UpsertOutcome::Created, created.remote_id()));
    };

    let uid = existing.remote_id();
    match policy {
        OverwritePolicy::CreateOnly => {
            debug!("Collection '{}' exists, leaving it untouched", name);
            return Ok(UpsertResult::new(UpsertOutcome::Unchanged, uid));
        }
        OverwritePolicy::IfChanged => {
            let remote = api.get_collection(uid).await?;
            if same_content(remote.content_hash(), collection.content_hash()) {
                debug!("Collection '{}' is up to date", name);
                return Ok(UpsertResult::new(UpsertOutcome::Unchanged, uid));
            }
        }
        OverwritePolicy::Always => {}
    }

    api.update_collection(uid, collection).await?;
    Ok(UpsertResult::new(UpsertOutcome::Updated, uid))
}

/// Create the environment, or update the same-named one per `policy`.
///
/// Variables left empty in `environment` keep the value already stored
/// remotely, so filled-in credentials survive a sync.
pub async fn upsert_environment(
    api: &dyn WorkspaceApi,
    workspace_id: &str,
    environment: &PostmanEnvironment,
    policy: OverwritePolicy,
) -> ApiResult<UpsertResult> {
    let name = &environment.name;
    let Some(existing) = find_environment_by_name(api, workspace_id, name).await? else {
        let created = api.create_environment(workspace_id, environment).await?;
        return Ok(UpsertResult::new(UpsertOutcome::Created, created.remote_id()));
    };

    let uid = existing.remote_id();
    if policy == OverwritePolicy::CreateOnly {
        debug!("Environment '{}' exists, leaving it untouched", name);
        return Ok(UpsertResult::new(UpsertOutcome::Unchanged, uid));
    }

    let remote = api.get_environment(uid).await?;
    let mut merged = environment.clone();
    merged.preserve_placeholders(&remote);

    if policy == OverwritePolicy::IfChanged
        && same_content(remote.content_hash(), merged.content_hash())
    {
        debug!("Environment '{}' is up to date", name);
        return Ok(UpsertResult::new(UpsertOutcome::Unchanged, uid));
    }

    api.update_environment(uid, &merged).await?;
    Ok(UpsertResult::new(UpsertOutcome::Updated, uid))
}

fn same_content(
    remote: Result<String, serde_json::Error>,
    local: Result<String, serde_json::Error>,
) -> bool {
    matches!((remote, local), (Ok(a), Ok(b)) if a == b)
}
