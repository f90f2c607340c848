//! In-memory workspace for testing
//!
//! Implements [`WorkspaceApi`] over a vector of stored artifacts so upsert
//! and orchestrator logic can be exercised without HTTP.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{RemoteArtifact, WorkspaceApi};
use crate::error::{ApiError, ApiResult};
use crate::postman::{PostmanCollection, PostmanEnvironment};

/// Mock workspace client.
///
/// # Example
/// ```ignore
/// let mock = MockWorkspaceClient::new()
///     .with_write_failure("Refunds - QA", ApiError::Network("reset".into()))
///     .await;
/// ```
pub struct MockWorkspaceClient {
    collections: Arc<Mutex<Vec<(RemoteArtifact, PostmanCollection)>>>,
    environments: Arc<Mutex<Vec<(RemoteArtifact, PostmanEnvironment)>>>,
    /// Error returned by the next call, consumed on use
    error: Arc<Mutex<Option<ApiError>>>,
    /// Error returned by every call
    persistent_error: Arc<Mutex<Option<ApiError>>>,
    /// Create/update failures keyed by artifact name
    write_failures: Arc<Mutex<Vec<(String, ApiError)>>>,
    call_count: Arc<Mutex<CallCounts>>,
    next_id: Arc<Mutex<usize>>,
}

impl Default for MockWorkspaceClient {
    fn default() -> Self {
        Self {
            collections: Arc::new(Mutex::new(Vec::new())),
            environments: Arc::new(Mutex::new(Vec::new())),
            error: Arc::new(Mutex::new(None)),
            persistent_error: Arc::new(Mutex::new(None)),
            write_failures: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(CallCounts::default())),
            next_id: Arc::new(Mutex::new(0)),
        }
    }
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub list_collections: usize,
    pub get_collection: usize,
    pub create_collection: usize,
    pub update_collection: usize,
    pub list_environments: usize,
    pub get_environment: usize,
    pub create_environment: usize,
    pub update_environment: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.list_collections
            + self.get_collection
            + self.list_environments
            + self.get_environment
            + self.writes()
    }

    /// Create and update calls only.
    pub fn writes(&self) -> usize {
        self.create_collection
            + self.update_collection
            + self.create_environment
            + self.update_environment
    }
}

impl MockWorkspaceClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the workspace with a collection.
    pub async fn with_collection(self, collection: PostmanCollection) -> Self {
        let artifact = self.allocate("col", &collection.info.name).await;
        self.collections.lock().await.push((artifact, collection));
        self
    }

    /// Seed the workspace with an environment.
    pub async fn with_environment(self, environment: PostmanEnvironment) -> Self {
        let artifact = self.allocate("env", &environment.name).await;
        self.environments.lock().await.push((artifact, environment));
        self
    }

    /// Fail the next call with `error`.
    pub async fn with_error(self, error: ApiError) -> Self {
        *self.error.lock().await = Some(error);
        self
    }

    /// Fail every call with `error`.
    pub async fn with_persistent_error(self, error: ApiError) -> Self {
        *self.persistent_error.lock().await = Some(error);
        self
    }

    /// Fail creates and updates of the artifact named `name`.
    pub async fn with_write_failure(self, name: &str, error: ApiError) -> Self {
        self.write_failures
            .lock()
            .await
            .push((name.to_string(), error));
        self
    }

    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    pub async fn collection_names(&self) -> Vec<String> {
        let collections = self.collections.lock().await;
        collections.iter().map(|(a, _)| a.name.clone()).collect()
    }

    pub async fn environment_names(&self) -> Vec<String> {
        let environments = self.environments.lock().await;
        environments.iter().map(|(a, _)| a.name.clone()).collect()
    }

    pub async fn environment(&self, name: &str) -> Option<PostmanEnvironment> {
        let environments = self.environments.lock().await;
        environments
            .iter()
            .find(|(a, _)| a.name == name)
            .map(|(_, env)| env.clone())
    }

    async fn allocate(&self, prefix: &str, name: &str) -> RemoteArtifact {
        let mut next = self.next_id.lock().await;
        *next += 1;
        let id = format!("{}-{}", prefix, next);
        RemoteArtifact {
            uid: format!("owner-{}", id),
            id,
            name: name.to_string(),
        }
    }

    async fn check_error(&self) -> ApiResult<()> {
        if let Some(e) = self.error.lock().await.take() {
            return Err(e);
        }
        if let Some(e) = self.persistent_error.lock().await.as_ref() {
            return Err(e.clone());
        }
        Ok(())
    }

    async fn check_write(&self, name: &str) -> ApiResult<()> {
        let failures = self.write_failures.lock().await;
        match failures.iter().find(|(n, _)| n == name) {
            Some((_, e)) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl WorkspaceApi for MockWorkspaceClient {
    async fn list_collections(&self, _workspace_id: &str) -> ApiResult<Vec<RemoteArtifact>> {
        self.call_count.lock().await.list_collections += 1;
        self.check_error().await?;

        let collections = self.collections.lock().await;
        Ok(collections.iter().map(|(a, _)| a.clone()).collect())
    }

    async fn get_collection(&self, uid: &str) -> ApiResult<PostmanCollection> {
        self.call_count.lock().await.get_collection += 1;
        self.check_error().await?;

        let collections = self.collections.lock().await;
        collections
            .iter()
            .find(|(a, _)| a.remote_id() == uid)
            .map(|(_, c)| c.clone())
            .ok_or_else(|| ApiError::NotFound(format!("/collections/{}", uid)))
    }

    async fn create_collection(
        &self,
        _workspace_id: &str,
        collection: &PostmanCollection,
    ) -> ApiResult<RemoteArtifact> {
        self.call_count.lock().await.create_collection += 1;
        self.check_error().await?;
        self.check_write(&collection.info.name).await?;

        let artifact = self.allocate("col", &collection.info.name).await;
        self.collections
            .lock()
            .await
            .push((artifact.clone(), collection.clone()));
        Ok(artifact)
    }

    async fn update_collection(
        &self,
        uid: &str,
        collection: &PostmanCollection,
    ) -> ApiResult<RemoteArtifact> {
        self.call_count.lock().await.update_collection += 1;
        self.check_error().await?;
        self.check_write(&collection.info.name).await?;

        let mut collections = self.collections.lock().await;
        let slot = collections
            .iter_mut()
            .find(|(a, _)| a.remote_id() == uid)
            .ok_or_else(|| ApiError::NotFound(format!("/collections/{}", uid)))?;
        slot.0.name = collection.info.name.clone();
        slot.1 = collection.clone();
        Ok(slot.0.clone())
    }

    async fn list_environments(&self, _workspace_id: &str) -> ApiResult<Vec<RemoteArtifact>> {
        self.call_count.lock().await.list_environments += 1;
        self.check_error().await?;

        let environments = self.environments.lock().await;
        Ok(environments.iter().map(|(a, _)| a.clone()).collect())
    }

    async fn get_environment(&self, uid: &str) -> ApiResult<PostmanEnvironment> {
        self.call_count.lock().await.get_environment += 1;
        self.check_error().await?;

        let environments = self.environments.lock().await;
        environments
            .iter()
            .find(|(a, _)| a.remote_id() == uid)
            .map(|(_, e)| e.clone())
            .ok_or_else(|| ApiError::NotFound(format!("/environments/{}", uid)))
    }

    async fn create_environment(
        &self,
        _workspace_id: &str,
        environment: &PostmanEnvironment,
    ) -> ApiResult<RemoteArtifact> {
        self.call_count.lock().await.create_environment += 1;
        self.check_error().await?;
        self.check_write(&environment.name).await?;

        let artifact = self.allocate("env", &environment.name).await;
        self.environments
            .lock()
            .await
            .push((artifact.clone(), environment.clone()));
        Ok(artifact)
    }

    async fn update_environment(
        &self,
        uid: &str,
        environment: &PostmanEnvironment,
    ) -> ApiResult<RemoteArtifact> {
        self.call_count.lock().await.update_environment += 1;
        self.check_error().await?;
        self.check_write(&environment.name).await?;

        let mut environments = self.environments.lock().await;
        let slot = environments
            .iter_mut()
            .find(|(a, _)| a.remote_id() == uid)
            .ok_or_else(|| ApiError::NotFound(format!("/environments/{}", uid)))?;
        slot.0.name = environment.name.clone();
        slot.1 = environment.clone();
        Ok(slot.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postman::CollectionInfo;

    fn collection(name: &str) -> PostmanCollection {
        PostmanCollection {
            info: CollectionInfo {
                name: name.to_string(),
                description: None,
                schema: String::new(),
            },
            item: vec![],
            event: vec![],
            auth: None,
        }
    }

    #[tokio::test]
    async fn test_one_shot_error_is_consumed() {
        let mock = MockWorkspaceClient::new()
            .with_error(ApiError::Network("reset".to_string()))
            .await;

        assert!(mock.list_collections("ws").await.is_err());
        assert!(mock.list_collections("ws").await.is_ok());
        assert_eq!(mock.call_counts().await.list_collections, 2);
    }

    #[tokio::test]
    async fn test_write_failure_only_hits_named_artifact() {
        let mock = MockWorkspaceClient::new()
            .with_write_failure("Broken", ApiError::Auth { status: 403 })
            .await;

        assert!(mock.create_collection("ws", &collection("Broken")).await.is_err());
        assert!(mock.create_collection("ws", &collection("Fine")).await.is_ok());
        assert_eq!(mock.collection_names().await, vec!["Fine"]);
    }

    #[tokio::test]
    async fn test_created_artifacts_are_addressable() {
        let mock = MockWorkspaceClient::new();
        let created = mock.create_collection("ws", &collection("A")).await.unwrap();
        let fetched = mock.get_collection(created.remote_id()).await.unwrap();
        assert_eq!(fetched.info.name, "A");
    }
}
