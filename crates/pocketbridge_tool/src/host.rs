//! Tool dispatch: one entry point from a tool name and raw arguments to
//! rendered text.

use crate::registry::ToolRegistry;
use crate::schema::{Access, FORMAT_PARAM};
use crate::tool::ToolContext;
use indexmap::IndexMap;
use pocketbridge_core::{ErrorEnvelope, ErrorKind, OutputFormat, RawFailure, Value};
use pocketbridge_shape::{RenderedResponse, ResponseShaper, require_admin, require_authenticated};

/// Runs tools and shapes their outcome
pub struct ToolHost {
    registry: ToolRegistry,
    ctx: ToolContext,
    shaper: ResponseShaper,
}

impl ToolHost {
    /// Create a host
    #[must_use]
    pub fn new(registry: ToolRegistry, ctx: ToolContext, shaper: ResponseShaper) -> Self {
        Self {
            registry,
            ctx,
            shaper,
        }
    }

    /// Registered tools
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Call context
    #[must_use]
    pub fn context(&self) -> &ToolContext {
        &self.ctx
    }

    /// Handle one tool call. Never fails: errors are rendered as envelopes.
    pub async fn handle(&self, name: &str, arguments: serde_json::Value) -> RenderedResponse {
        let (format, arguments) = match split_format(arguments) {
            Ok(split) => split,
            Err(envelope) => return self.shaper.envelope(&envelope, OutputFormat::default()),
        };

        let outcome = self.dispatch(name, arguments).await;
        let response = self.shaper.shape(outcome, format);
        tracing::info!(
            tool = name,
            %format,
            is_error = response.is_error,
            chars = response.text.chars().count(),
            "tool call"
        );
        response
    }

    async fn dispatch(&self, name: &str, arguments: serde_json::Value) -> Result<Value, RawFailure> {
        let tool = self.registry.get(name).ok_or_else(|| unknown_tool(name))?;
        match tool.schema().access {
            Access::Public => {}
            Access::Authenticated => require_authenticated(&self.ctx.auth)?,
            Access::Admin => require_admin(&self.ctx.auth)?,
        }
        tool.run(&self.ctx, arguments).await
    }
}

/// Remove `format` from the arguments and parse it
fn split_format(
    arguments: serde_json::Value,
) -> Result<(OutputFormat, serde_json::Value), ErrorEnvelope> {
    let mut object = match arguments {
        serde_json::Value::Object(object) => object,
        other => return Ok((OutputFormat::default(), other)),
    };

    let format = match object.remove(FORMAT_PARAM) {
        None | Some(serde_json::Value::Null) => OutputFormat::default(),
        Some(serde_json::Value::String(name)) => name
            .parse::<OutputFormat>()
            .map_err(|e| invalid_format(e.to_string()))?,
        Some(_) => return Err(invalid_format("must be a string".to_string())),
    };
    Ok((format, serde_json::Value::Object(object)))
}

fn invalid_format(reason: String) -> ErrorEnvelope {
    let mut fields = IndexMap::new();
    fields.insert(FORMAT_PARAM.to_string(), "must be compact or json".to_string());
    ErrorEnvelope::validation(format!("Invalid format: {reason}"), fields)
}

fn unknown_tool(name: &str) -> ErrorEnvelope {
    ErrorEnvelope::new(ErrorKind::ValidationError, format!("Unknown tool: {name}"))
        .with_suggestion("Call tools/list to see the available tools.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockBackend;
    use pocketbridge_backend::Operation;
    use pocketbridge_core::{AuthContext, Credential};
    use pocketbridge_shape::ShaperConfig;
    use std::sync::Arc;

    fn host_with(backend: MockBackend, auth: AuthContext, limit: usize) -> (ToolHost, Arc<MockBackend>) {
        let backend = Arc::new(backend.with_auth(auth.clone()));
        let ctx = ToolContext::new(backend.clone(), auth);
        let shaper = ResponseShaper::new(ShaperConfig::new(MockBackend::URL).with_size_limit(limit));
        (ToolHost::new(ToolRegistry::builtin(), ctx, shaper), backend)
    }

    fn host(backend: MockBackend, auth: AuthContext) -> (ToolHost, Arc<MockBackend>) {
        host_with(backend, auth, pocketbridge_shape::DEFAULT_SIZE_LIMIT)
    }

    fn compact(text: &str) -> toml::Table {
        toml::from_str(text).unwrap()
    }

    fn error_code(text: &str) -> String {
        compact(text)["error"]["code"].as_str().unwrap().to_string()
    }

    fn page(n: usize) -> serde_json::Value {
        let items: Vec<serde_json::Value> = (0..n)
            .map(|i| serde_json::json!({"id": format!("r{i}"), "title": "t".repeat(50), "created": "2024-01-31 10:15:00.123Z"}))
            .collect();
        serde_json::json!({"page": 1, "perPage": 30, "totalItems": n * 2, "totalPages": 2, "items": items})
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let (host, backend) = host(MockBackend::new(), AuthContext::new());
        let out = host.handle("drop_database", serde_json::json!({})).await;
        assert!(out.is_error);
        assert_eq!(error_code(&out.text), "VALIDATION_ERROR");
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_admin_tool_without_credential_makes_no_call() {
        let (host, backend) = host(MockBackend::new(), AuthContext::new());
        let out = host.handle("list_collections", serde_json::json!({})).await;
        assert!(out.is_error);
        let parsed = compact(&out.text);
        assert_eq!(parsed["error"]["code"].as_str(), Some("AUTH_REQUIRED"));
        assert!(parsed["error"]["suggestion"].as_str().unwrap().contains("auth_admin"));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_user_credential_is_not_admin() {
        let auth = AuthContext::new();
        auth.set(Credential::new("tok", "users"));
        let (host, backend) = host(MockBackend::new(), auth);
        let out = host.handle("list_backups", serde_json::json!({})).await;
        assert_eq!(error_code(&out.text), "AUTH_REQUIRED");
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_admin_login_then_admin_tool() {
        let backend = MockBackend::new()
            .respond(Ok(serde_json::json!({"token": "tok", "record": {"id": "su1"}})))
            .respond(Ok(serde_json::json!([{"key": "a.zip", "size": 10}])));
        let (host, backend) = host(backend, AuthContext::new());

        let login = host
            .handle("auth_admin", serde_json::json!({"email": "root@example.com", "password": "pw"}))
            .await;
        assert!(!login.is_error);
        assert!(!login.text.contains("tok"));
        assert_eq!(compact(&login.text)["admin"].as_bool(), Some(true));

        let out = host.handle("list_backups", serde_json::json!({})).await;
        assert!(!out.is_error, "{}", out.text);
        assert!(out.text.contains("[[backups]]"));
        assert_eq!(backend.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_list_records_compact() {
        let (host, backend) = host(MockBackend::new().respond(Ok(page(2))), AuthContext::new());
        let out = host
            .handle("list_records", serde_json::json!({"collection": "posts", "perPage": 2}))
            .await;
        assert!(!out.is_error);
        let parsed = compact(&out.text);
        assert_eq!(parsed["hasMore"].as_bool(), Some(true));
        assert_eq!(parsed["nextOffset"].as_integer(), Some(30));
        assert_eq!(parsed["items"].as_array().unwrap().len(), 2);
        assert_eq!(parsed["items"][0]["created"].as_str(), Some("2024-01-31T10:15:00.123Z"));

        match &backend.calls()[0] {
            Operation::ListRecords { collection, query, .. } => {
                assert_eq!(collection, "posts");
                assert_eq!(query.per_page, 2);
            }
            other => panic!("unexpected operation {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_structured_format() {
        let record = serde_json::json!({"id": "abc", "title": "Hello", "draft": null});
        let (host, _) = host(MockBackend::new().respond(Ok(record)), AuthContext::new());
        let out = host
            .handle(
                "get_record",
                serde_json::json!({"collection": "posts", "id": "abc", "format": "json"}),
            )
            .await;
        let json: serde_json::Value = serde_json::from_str(&out.text).unwrap();
        assert_eq!(json["title"], "Hello");
        assert!(json["draft"].is_null());
    }

    #[tokio::test]
    async fn test_invalid_format() {
        let (host, backend) = host(MockBackend::new(), AuthContext::new());
        let out = host
            .handle("health_check", serde_json::json!({"format": "yaml"}))
            .await;
        assert!(out.is_error);
        let parsed = compact(&out.text);
        assert_eq!(parsed["error"]["code"].as_str(), Some("VALIDATION_ERROR"));
        assert!(parsed["error"]["fieldErrors"].get("format").is_some());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_params_make_no_call() {
        let (host, backend) = host(MockBackend::new(), AuthContext::new());
        let out = host
            .handle("list_records", serde_json::json!({"collection": "posts", "perPage": 1000}))
            .await;
        assert_eq!(error_code(&out.text), "VALIDATION_ERROR");
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_connection_failure_names_backend() {
        let backend = MockBackend::new().respond(Err(RawFailure::connection("connection refused")));
        let (host, _) = host(backend, AuthContext::new());
        let out = host.handle("health_check", serde_json::Value::Null).await;
        let parsed = compact(&out.text);
        assert_eq!(parsed["error"]["code"].as_str(), Some("CONNECTION_ERROR"));
        assert!(parsed["error"]["message"].as_str().unwrap().contains(MockBackend::URL));
    }

    #[tokio::test]
    async fn test_backend_validation_failure_carries_fields() {
        let body = serde_json::json!({
            "status": 400,
            "message": "Failed to create record.",
            "data": {"title": {"code": "validation_required", "message": "Missing required value."}}
        });
        let backend = MockBackend::new().respond(Err(RawFailure::http(400, Some(body))));
        let (host, _) = host(backend, AuthContext::new());
        let out = host
            .handle(
                "create_record",
                serde_json::json!({"collection": "posts", "data": {"body": "x"}}),
            )
            .await;
        let parsed = compact(&out.text);
        assert_eq!(parsed["error"]["message"].as_str(), Some("Failed to create record."));
        assert_eq!(
            parsed["error"]["fieldErrors"]["title"].as_str(),
            Some("Missing required value.")
        );
    }

    #[tokio::test]
    async fn test_delete_acknowledged() {
        let backend = MockBackend::new().respond(Ok(serde_json::Value::Null));
        let (host, _) = host(backend, AuthContext::new());
        let out = host
            .handle("delete_record", serde_json::json!({"collection": "posts", "id": "abc"}))
            .await;
        let parsed = compact(&out.text);
        assert_eq!(parsed["deleted"].as_bool(), Some(true));
        assert_eq!(parsed["id"].as_str(), Some("abc"));
    }

    #[tokio::test]
    async fn test_status_and_logout_are_local() {
        let auth = AuthContext::new();
        auth.set(Credential::new("tok", Credential::SUPERUSER_COLLECTION));
        let (host, backend) = host(MockBackend::new(), auth.clone());

        let status = compact(&host.handle("auth_status", serde_json::json!({})).await.text);
        assert_eq!(status["authenticated"].as_bool(), Some(true));
        assert_eq!(status["admin"].as_bool(), Some(true));

        let out = compact(&host.handle("logout", serde_json::json!({})).await.text);
        assert_eq!(out["wasAuthenticated"].as_bool(), Some(true));
        assert!(!auth.is_authenticated());

        let status = compact(&host.handle("auth_status", serde_json::json!({})).await.text);
        assert_eq!(status["authenticated"].as_bool(), Some(false));
        assert!(status.get("collection").is_none());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_requires_credential() {
        let (host, backend) = host(MockBackend::new(), AuthContext::new());
        let out = host.handle("auth_refresh", serde_json::json!({})).await;
        assert_eq!(error_code(&out.text), "AUTH_REQUIRED");
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_uses_credential_collection() {
        let auth = AuthContext::new();
        auth.set(Credential::new("old", "members"));
        let backend = MockBackend::new().respond(Ok(serde_json::json!({"token": "new", "record": {"id": "m1"}})));
        let (host, backend) = host(backend, auth.clone());
        let out = host.handle("auth_refresh", serde_json::json!({})).await;
        assert!(!out.is_error);
        assert_eq!(
            backend.calls()[0],
            Operation::AuthRefresh {
                collection: "members".to_string()
            }
        );
        assert_eq!(auth.token().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_oversized_list_truncated() {
        let (host, _) = host_with(MockBackend::new().respond(Ok(page(20))), AuthContext::new(), 1_000);
        let out = host
            .handle("list_records", serde_json::json!({"collection": "posts"}))
            .await;
        assert!(!out.is_error);
        let parsed = compact(&out.text);
        assert_eq!(parsed["items"].as_array().unwrap().len(), 10);
        assert_eq!(parsed["truncated"].as_bool(), Some(true));
        assert!(parsed["truncationMessage"].as_str().unwrap().contains("from 20 to 10"));
    }

    #[tokio::test]
    async fn test_oversized_list_next_offset_resumes_after_kept_items() {
        let (host, _) = host_with(MockBackend::new().respond(Ok(page(20))), AuthContext::new(), 1_000);
        let out = host
            .handle("list_records", serde_json::json!({"collection": "posts"}))
            .await;
        let parsed = compact(&out.text);
        assert_eq!(parsed["nextOffset"].as_integer(), Some(10));
        assert_eq!(parsed["hasMore"].as_bool(), Some(true));
    }

    #[tokio::test]
    async fn test_oversized_record_with_items_field_untouched() {
        let lines: Vec<String> = (0..10).map(|i| format!("line {i} {}", "x".repeat(45))).collect();
        let record = serde_json::json!({"id": "order1", "items": lines});
        let (host, _) = host_with(MockBackend::new().respond(Ok(record)), AuthContext::new(), 200);
        let out = host
            .handle("get_record", serde_json::json!({"collection": "orders", "id": "order1"}))
            .await;
        assert!(!out.is_error);
        let parsed = compact(&out.text);
        assert_eq!(parsed["items"].as_array().unwrap().len(), 10);
        assert!(parsed.get("truncated").is_none());
        assert!(parsed.get("truncationMessage").is_none());
    }

    #[tokio::test]
    async fn test_disabled_tool_is_unknown() {
        let auth = AuthContext::new();
        let backend = Arc::new(MockBackend::new().with_auth(auth.clone()));
        let mut registry = ToolRegistry::builtin();
        registry.disable("health_check").unwrap();
        let host = ToolHost::new(
            registry,
            ToolContext::new(backend.clone(), auth),
            ResponseShaper::new(ShaperConfig::new(MockBackend::URL)),
        );
        let out = host.handle("health_check", serde_json::json!({})).await;
        assert_eq!(error_code(&out.text), "VALIDATION_ERROR");
        assert!(backend.calls().is_empty());
    }
}
