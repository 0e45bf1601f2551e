//! Backend client: one HTTP round trip per operation.

use crate::operation::Operation;
use async_trait::async_trait;
use pocketbridge_core::{AuthContext, Credential, RawFailure};
use reqwest::{StatusCode, Url};
use std::time::Duration;

/// Capability to execute one backend operation
#[async_trait]
pub trait Backend: Send + Sync {
    /// Backend address, quoted in connectivity errors
    fn base_url(&self) -> &str;

    /// Execute the operation. `204 No Content` yields JSON `null`.
    async fn call(&self, operation: &Operation) -> Result<serde_json::Value, RawFailure>;
}

/// Errors building a client
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Base URL cannot be parsed or cannot carry a path
    #[error("Invalid backend URL {url}: {reason}")]
    InvalidUrl {
        /// Offending URL
        url: String,
        /// Parser message
        reason: String,
    },

    /// HTTP client construction failed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base URL, e.g. `http://127.0.0.1:8090`
    pub base_url: String,
    /// TCP connect timeout
    pub connect_timeout: Duration,
}

impl BackendConfig {
    /// Default backend address
    pub const DEFAULT_URL: &'static str = "http://127.0.0.1:8090";

    /// Create a config with a 10 second connect timeout
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Set the connect timeout
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_URL)
    }
}

/// reqwest-based [`Backend`]
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    base: Url,
    client: reqwest::Client,
    auth: AuthContext,
}

impl HttpBackend {
    /// Create a client sharing `auth` with the tool layer
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid or the client cannot be built
    pub fn new(config: BackendConfig, auth: AuthContext) -> Result<Self, BackendError> {
        let base = Url::parse(&config.base_url).map_err(|e| BackendError::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(BackendError::InvalidUrl {
                url: config.base_url,
                reason: "URL cannot carry a path".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            base,
            client,
            auth,
        })
    }

    /// Shared auth state
    #[must_use]
    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    fn url_for(&self, segments: &[String]) -> Result<Url, RawFailure> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| RawFailure::generic(format!("Cannot build URL from {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn map_send_error(&self, error: reqwest::Error) -> RawFailure {
        if error.is_connect() || error.is_timeout() {
            return RawFailure::connection(error.to_string());
        }
        RawFailure::generic(format!("Request to {} failed: {error}", self.base_url))
    }

    fn store_credential(&self, collection: &str, body: &serde_json::Value) -> Result<(), RawFailure> {
        let token = body
            .get("token")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| RawFailure::generic("Authentication response did not include a token"))?;

        let mut credential = Credential::new(token, collection);
        if let Some(record) = body.get("record") {
            credential = credential.with_record(record.clone());
        }
        self.auth.set(credential);
        tracing::info!(collection, "stored credential");
        Ok(())
    }
}

#[async_trait]
impl Backend for HttpBackend {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call(&self, operation: &Operation) -> Result<serde_json::Value, RawFailure> {
        let request = operation.request();
        let url = self.url_for(&request.segments)?;
        tracing::debug!(operation = operation.name(), method = request.method.as_str(), path = %request.path(), "backend request");

        let mut builder = self.client.request(request.method.into(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = self.auth.token() {
            builder = builder.header(reqwest::header::AUTHORIZATION, token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_send_error(e))?;
        tracing::debug!(operation = operation.name(), status = status.as_u16(), bytes = text.len(), "backend response");

        if !status.is_success() {
            let body = serde_json::from_str(&text).ok();
            return Err(RawFailure::http(status.as_u16(), body));
        }
        if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }

        let body: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            RawFailure::generic(format!("Invalid JSON from {}: {e}", self.base_url))
        })?;

        if let Some(collection) = operation.auth_collection() {
            self.store_credential(collection, &body)?;
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::ListQuery;
    use httpmock::prelude::*;

    fn backend(url: &str) -> HttpBackend {
        HttpBackend::new(BackendConfig::new(url), AuthContext::new()).unwrap()
    }

    #[test]
    fn test_rejects_invalid_url() {
        let err = HttpBackend::new(BackendConfig::new("not a url"), AuthContext::new()).unwrap_err();
        assert!(matches!(err, BackendError::InvalidUrl { .. }));
    }

    #[test]
    fn test_url_keeps_base_path() {
        let b = backend("http://host:8090/pb/");
        let url = b.url_for(&["api".to_string(), "health".to_string()]).unwrap();
        assert_eq!(url.as_str(), "http://host:8090/pb/api/health");
        assert_eq!(b.base_url(), "http://host:8090/pb");
    }

    #[test]
    fn test_url_encodes_segments() {
        let b = backend("http://host:8090");
        let url = b.url_for(&["api".to_string(), "a b/c".to_string()]).unwrap();
        assert_eq!(url.as_str(), "http://host:8090/api/a%20b%2Fc");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_connection_failure() {
        let b = backend("http://127.0.0.1:1");
        let err = b.call(&Operation::Health).await.unwrap_err();
        assert!(matches!(err, RawFailure::Connection { .. }));
    }

    #[tokio::test]
    async fn test_error_status_carries_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/collections/posts/records/missing");
                then.status(404)
                    .json_body(serde_json::json!({"status": 404, "message": "Not found.", "data": {}}));
            })
            .await;

        let b = backend(&server.base_url());
        let op = Operation::GetRecord {
            collection: "posts".to_string(),
            id: "missing".to_string(),
            expand: None,
            fields: None,
        };
        match b.call(&op).await.unwrap_err() {
            RawFailure::Http { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body.unwrap()["message"], "Not found.");
            }
            other => panic!("unexpected failure: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_admin_auth_stores_token_and_sends_it() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/collections/_superusers/auth-with-password")
                    .json_body(serde_json::json!({"identity": "root@example.com", "password": "pw"}));
                then.status(200).json_body(serde_json::json!({
                    "token": "tok123",
                    "record": {"id": "su1", "email": "root@example.com"}
                }));
            })
            .await;
        let logs = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/logs")
                    .query_param("page", "1")
                    .header("Authorization", "tok123");
                then.status(200).json_body(serde_json::json!({
                    "page": 1, "perPage": 30, "totalItems": 0, "totalPages": 0, "items": []
                }));
            })
            .await;

        let b = backend(&server.base_url());
        b.call(&Operation::AuthAdmin {
            email: "root@example.com".to_string(),
            password: "pw".to_string(),
        })
        .await
        .unwrap();
        assert!(b.auth().is_superuser());

        b.call(&Operation::ListLogs {
            query: ListQuery::default(),
        })
        .await
        .unwrap();
        logs.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_content_is_null() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/collections/posts/records/abc");
                then.status(204);
            })
            .await;

        let b = backend(&server.base_url());
        let out = b
            .call(&Operation::DeleteRecord {
                collection: "posts".to_string(),
                id: "abc".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(out, serde_json::Value::Null);
    }
}
