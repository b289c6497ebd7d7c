//! Upstream REST client with timeout and error handling.
//!
//! # Responsibilities
//! - Issue exactly one HTTP call per operation against the configured collection URL
//! - Attach the credential header to mutating calls only
//! - Validate client payloads before anything is sent
//! - Translate upstream responses into typed results

use std::time::{Duration, Instant};

use axum::body::Bytes;
use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::resilience::timeouts::with_deadline;
use crate::upstream::error::{UpstreamError, UpstreamResult};
use crate::upstream::types::{delete_target, is_truthy, Todo, TodoPayload};

/// Client for the upstream todo collection.
#[derive(Clone)]
pub struct UpstreamClient {
    http: Client,
    base_url: Url,
    credential_header: HeaderName,
    credential: HeaderValue,
    timeout: Duration,
}

impl UpstreamClient {
    /// Create a new upstream client.
    ///
    /// Fails if the base URL, credential header or credential is unusable.
    pub fn new(config: &UpstreamConfig) -> UpstreamResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| UpstreamError::Config(format!("base_url '{}': {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(UpstreamError::Config(format!(
                "base_url '{}' cannot carry path segments",
                config.base_url
            )));
        }

        let credential_header = HeaderName::try_from(config.credential_header.as_str())
            .map_err(|e| UpstreamError::Config(format!("credential_header: {}", e)))?;

        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| UpstreamError::Config("api_key is not set".to_string()))?;
        let mut credential = HeaderValue::from_str(api_key)
            .map_err(|e| UpstreamError::Config(format!("api_key: {}", e)))?;
        credential.set_sensitive(true);

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(UpstreamError::Transport)?;

        tracing::info!(base_url = %base_url, "Upstream client initialized");

        Ok(Self {
            http,
            base_url,
            credential_header,
            credential,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// List every todo.
    pub async fn fetch_all(&self) -> UpstreamResult<Vec<Todo>> {
        let body = self.send("fetch_all", self.http.get(self.base_url.clone())).await?;
        decode(&body)
    }

    /// Fetch a single todo.
    ///
    /// An upstream 404, or a payload without an `id`, is reported as
    /// [`UpstreamError::NotFound`].
    pub async fn fetch_one(&self, id: &str) -> UpstreamResult<Todo> {
        let body = match self.send("fetch_one", self.http.get(self.item_url(id))).await {
            Err(UpstreamError::Status { status: StatusCode::NOT_FOUND, .. }) => {
                return Err(UpstreamError::NotFound);
            }
            other => other?,
        };

        let value: Value = decode(&body)?;
        if !value.get("id").is_some_and(is_truthy) {
            return Err(UpstreamError::NotFound);
        }
        serde_json::from_value(value).map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    /// Create a todo. Requires `userId` and `title`; `completed` is always
    /// sent as `false`.
    pub async fn create(&self, payload: TodoPayload) -> UpstreamResult<Todo> {
        let new_todo = payload.into_new_todo()?;
        let request = self.authorized(self.http.post(self.base_url.clone())).json(&new_todo);
        let body = self.send("create", request).await?;
        decode(&body)
    }

    /// Replace a todo. The id comes from `path_id` or the payload.
    pub async fn update(&self, path_id: Option<&str>, payload: TodoPayload) -> UpstreamResult<Todo> {
        let update = payload.into_update(path_id)?;
        let url = self.item_url(&update.id.to_string());
        let request = self.authorized(self.http.put(url)).json(&update);
        let body = self.send("update", request).await?;
        decode(&body)
    }

    /// Delete a todo, returning the id that was deleted.
    pub async fn delete(
        &self,
        path_id: Option<&str>,
        payload: Option<&TodoPayload>,
    ) -> UpstreamResult<i64> {
        let id = delete_target(path_id, payload)?;
        let request = self
            .authorized(self.http.delete(self.item_url(&id.to_string())))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.send("delete", request).await?;
        Ok(id)
    }

    fn item_url(&self, id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(id);
        }
        url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(self.credential_header.clone(), self.credential.clone())
    }

    /// Send one request and read its whole body under the configured
    /// deadline. Non-2xx responses become [`UpstreamError::Status`] carrying
    /// the upstream body.
    async fn send(&self, operation: &'static str, request: RequestBuilder) -> UpstreamResult<Bytes> {
        let start = Instant::now();
        let result = with_deadline(self.timeout, async {
            let response = request.send().await.map_err(UpstreamError::Transport)?;
            let status = response.status();
            let content_type = response.headers().get(CONTENT_TYPE).cloned();
            let body = response.bytes().await.map_err(UpstreamError::Transport)?;
            if status.is_success() {
                return Ok(body);
            }

            Err(UpstreamError::Status {
                status,
                content_type,
                body,
            })
        })
        .await;

        match &result {
            Ok(body) => {
                tracing::debug!(operation, bytes = body.len(), "Upstream call succeeded");
                metrics::record_upstream(operation, "ok", start);
            }
            Err(UpstreamError::Status { status, .. }) => {
                tracing::warn!(operation, status = %status, "Upstream returned error status");
                metrics::record_upstream(operation, "status", start);
            }
            Err(e) => {
                tracing::error!(operation, error = %e, "Upstream call failed");
                metrics::record_upstream(operation, e.kind(), start);
            }
        }

        result
    }
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("base_url", &self.base_url.as_str())
            .field("credential_header", &self.credential_header)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> UpstreamResult<T> {
    serde_json::from_slice(body).map_err(|e| UpstreamError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> UpstreamConfig {
        UpstreamConfig {
            base_url: base_url.to_string(),
            api_key: Some("secret".into()),
            ..UpstreamConfig::default()
        }
    }

    #[test]
    fn test_item_url_handles_trailing_slash() {
        let client = UpstreamClient::new(&config("https://example.com/todos/")).unwrap();
        assert_eq!(client.item_url("7").as_str(), "https://example.com/todos/7");

        let client = UpstreamClient::new(&config("https://example.com/todos")).unwrap();
        assert_eq!(client.item_url("7").as_str(), "https://example.com/todos/7");
    }

    #[test]
    fn test_item_url_escapes_segment() {
        let client = UpstreamClient::new(&config("https://example.com/todos")).unwrap();
        assert_eq!(client.item_url("a/b").as_str(), "https://example.com/todos/a%2Fb");
    }

    #[test]
    fn test_requires_credential() {
        let mut cfg = config("https://example.com/todos");
        cfg.api_key = None;
        assert!(matches!(UpstreamClient::new(&cfg), Err(UpstreamError::Config(_))));
    }

    #[test]
    fn test_debug_hides_credential() {
        let client = UpstreamClient::new(&config("https://example.com/todos")).unwrap();
        assert!(!format!("{client:?}").contains("secret"));
    }
}
