//! Postman workspace API client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::postman::{PostmanCollection, PostmanEnvironment};

#[cfg(test)]
pub mod mock;
pub mod postman;
pub mod rate_limit;
pub mod retry;
pub mod upsert;

#[cfg(test)]
pub use mock::MockWorkspaceClient;
pub use postman::PostmanClient;
pub use retry::RetryPolicy;
pub use upsert::{OverwritePolicy, UpsertOutcome, UpsertResult};

/// Raw operations on a Postman workspace.
///
/// Implementations handle transport concerns (auth header, retries, rate
/// limiting). Name matching and overwrite decisions live in [`upsert`].
#[async_trait]
pub trait WorkspaceApi: Send + Sync {
    /// List collections in a workspace
    async fn list_collections(&self, workspace_id: &str) -> ApiResult<Vec<RemoteArtifact>>;

    /// Fetch a collection's full content
    async fn get_collection(&self, uid: &str) -> ApiResult<PostmanCollection>;

    async fn create_collection(
        &self,
        workspace_id: &str,
        collection: &PostmanCollection,
    ) -> ApiResult<RemoteArtifact>;

    /// Replace a collection's content
    async fn update_collection(
        &self,
        uid: &str,
        collection: &PostmanCollection,
    ) -> ApiResult<RemoteArtifact>;

    /// List environments in a workspace
    async fn list_environments(&self, workspace_id: &str) -> ApiResult<Vec<RemoteArtifact>>;

    async fn get_environment(&self, uid: &str) -> ApiResult<PostmanEnvironment>;

    async fn create_environment(
        &self,
        workspace_id: &str,
        environment: &PostmanEnvironment,
    ) -> ApiResult<RemoteArtifact>;

    async fn update_environment(
        &self,
        uid: &str,
        environment: &PostmanEnvironment,
    ) -> ApiResult<RemoteArtifact>;

    /// Retries performed so far; zero for clients that never retry
    fn retry_count(&self) -> u32 {
        0
    }
}

/// Identity of a collection or environment stored in a workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteArtifact {
    #[serde(default)]
    pub id: String,

    pub name: String,

    /// `<owner>-<id>`; addressing key for get/update
    #[serde(default)]
    pub uid: String,
}

impl RemoteArtifact {
    /// Key used to address the artifact in get/update calls.
    pub fn remote_id(&self) -> &str {
        if self.uid.is_empty() { &self.id } else { &self.uid }
    }
}
