//! Postman API client implementation

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client as HttpClient, Method, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::rate_limit::ReactiveLimiter;
use super::retry::RetryPolicy;
use super::{RemoteArtifact, WorkspaceApi};
use crate::error::{ApiError, ApiResult};
use crate::postman::{PostmanCollection, PostmanEnvironment};

/// Postman API base URL
pub const API_BASE_URL: &str = "https://api.getpostman.com";

/// Per-call timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Postman API client
pub struct PostmanClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
    timeout: Duration,
    retry: RetryPolicy,
    limiter: ReactiveLimiter,
    retries: AtomicU32,
}

#[derive(Deserialize)]
struct CollectionList {
    #[serde(default)]
    collections: Vec<RemoteArtifact>,
}

#[derive(Deserialize)]
struct EnvironmentList {
    #[serde(default)]
    environments: Vec<RemoteArtifact>,
}

#[derive(Deserialize)]
struct CollectionEnvelope<T> {
    collection: T,
}

#[derive(Deserialize)]
struct EnvironmentEnvelope<T> {
    environment: T,
}

impl PostmanClient {
    /// Create a client authenticating with `api_key`.
    pub fn new(api_key: impl Into<String>) -> ApiResult<Self> {
        let http = HttpClient::builder()
            .user_agent(concat!("postsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: API_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            limiter: ReactiveLimiter::default(),
            retries: AtomicU32::new(0),
        })
    }

    /// Point the client at another host (mock servers, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request, retrying transient failures per the retry policy.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0;

        loop {
            attempt += 1;
            self.limiter.wait_if_active().await;
            debug!("{} {} (attempt {})", method, path, attempt);

            let mut builder = self
                .http
                .request(method.clone(), &url)
                .header("X-Api-Key", &self.api_key)
                .header("Accept", "application/json")
                .timeout(self.timeout);
            if !query.is_empty() {
                builder = builder.query(query);
            }
            if let Some(body) = body {
                builder = builder.json(body);
            }

            let error = match builder.send().await {
                Ok(response) => match self.handle_response::<T>(response, path).await {
                    Ok(data) => return Ok(data),
                    Err(e) => e,
                },
                Err(e) => ApiError::from(e),
            };

            if !error.is_transient() {
                return Err(error);
            }
            if attempt >= self.retry.max_attempts {
                warn!("{} {} failed after {} attempts: {}", method, path, attempt, error);
                return Err(ApiError::RemoteUnavailable {
                    attempts: attempt,
                    reason: error.to_string(),
                });
            }

            let retry_after = match &error {
                ApiError::RateLimit(after) if !after.is_zero() => Some(*after),
                _ => None,
            };
            let delay = self.retry.delay(attempt, retry_after);
            self.retries.fetch_add(1, Ordering::SeqCst);
            warn!(
                "{} {} failed ({}); retrying in {:?}",
                method, path, error, delay
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Map a response to data or a typed error.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        path: &str,
    ) -> ApiResult<T> {
        let status = response.status();
        match status {
            s if s.is_success() => response.json::<T>().await.map_err(|e| {
                ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
            }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Auth {
                status: status.as_u16(),
            }),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(path.to_string())),
            StatusCode::TOO_MANY_REQUESTS => {
                self.limiter.activate();
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(Duration::ZERO);
                Err(ApiError::RateLimit(retry_after))
            }
            s if s.is_server_error() => {
                let message = error_message(response).await;
                Err(ApiError::ServerError {
                    status: s.as_u16(),
                    message,
                })
            }
            s if s.is_client_error() => {
                let message = error_message(response).await;
                Err(ApiError::BadRequest {
                    status: s.as_u16(),
                    message,
                })
            }
            _ => Err(ApiError::InvalidResponse(format!(
                "Unexpected status code: {}",
                status
            ))),
        }
    }
}

/// Best-effort error text from a Postman error body.
///
/// Postman answers `{"error": {"name": ..., "message": ...}}`; anything else
/// is returned verbatim.
async fn error_message(response: Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            if text.is_empty() {
                status.to_string()
            } else {
                text
            }
        })
}

#[async_trait]
impl WorkspaceApi for PostmanClient {
    async fn list_collections(&self, workspace_id: &str) -> ApiResult<Vec<RemoteArtifact>> {
        let list: CollectionList = self
            .request(Method::GET, "/collections", &[("workspace", workspace_id)], None)
            .await?;
        Ok(list.collections)
    }

    async fn get_collection(&self, uid: &str) -> ApiResult<PostmanCollection> {
        let path = format!("/collections/{}", uid);
        let envelope: CollectionEnvelope<PostmanCollection> =
            self.request(Method::GET, &path, &[], None).await?;
        Ok(envelope.collection)
    }

    async fn create_collection(
        &self,
        workspace_id: &str,
        collection: &PostmanCollection,
    ) -> ApiResult<RemoteArtifact> {
        let body = json!({ "collection": collection });
        let envelope: CollectionEnvelope<RemoteArtifact> = self
            .request(
                Method::POST,
                "/collections",
                &[("workspace", workspace_id)],
                Some(&body),
            )
            .await?;
        Ok(envelope.collection)
    }

    async fn update_collection(
        &self,
        uid: &str,
        collection: &PostmanCollection,
    ) -> ApiResult<RemoteArtifact> {
        let path = format!("/collections/{}", uid);
        let body = json!({ "collection": collection });
        let envelope: CollectionEnvelope<RemoteArtifact> =
            self.request(Method::PUT, &path, &[], Some(&body)).await?;
        Ok(envelope.collection)
    }

    async fn list_environments(&self, workspace_id: &str) -> ApiResult<Vec<RemoteArtifact>> {
        let list: EnvironmentList = self
            .request(Method::GET, "/environments", &[("workspace", workspace_id)], None)
            .await?;
        Ok(list.environments)
    }

    async fn get_environment(&self, uid: &str) -> ApiResult<PostmanEnvironment> {
        let path = format!("/environments/{}", uid);
        let envelope: EnvironmentEnvelope<PostmanEnvironment> =
            self.request(Method::GET, &path, &[], None).await?;
        Ok(envelope.environment)
    }

    async fn create_environment(
        &self,
        workspace_id: &str,
        environment: &PostmanEnvironment,
    ) -> ApiResult<RemoteArtifact> {
        let body = json!({ "environment": environment });
        let envelope: EnvironmentEnvelope<RemoteArtifact> = self
            .request(
                Method::POST,
                "/environments",
                &[("workspace", workspace_id)],
                Some(&body),
            )
            .await?;
        Ok(envelope.environment)
    }

    async fn update_environment(
        &self,
        uid: &str,
        environment: &PostmanEnvironment,
    ) -> ApiResult<RemoteArtifact> {
        let path = format!("/environments/{}", uid);
        let body = json!({ "environment": environment });
        let envelope: EnvironmentEnvelope<RemoteArtifact> =
            self.request(Method::PUT, &path, &[], Some(&body)).await?;
        Ok(envelope.environment)
    }

    fn retry_count(&self) -> u32 {
        self.retries.load(Ordering::SeqCst)
    }
}
