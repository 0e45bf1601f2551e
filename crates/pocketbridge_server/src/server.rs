//! MCP method dispatch and the stdio loop.

use crate::config::{AdminCredentials, Args};
use crate::rpc::{INVALID_REQUEST, PARSE_ERROR, Request, Response, RpcError};
use pocketbridge_backend::{BackendError, HttpBackend, Operation};
use pocketbridge_core::AuthContext;
use pocketbridge_shape::ResponseShaper;
use pocketbridge_tool::{ToolContext, ToolHost, ToolRegistry};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Protocol revisions this server speaks, newest first
pub const SUPPORTED_PROTOCOL_VERSIONS: [&str; 3] = ["2025-06-18", "2025-03-26", "2024-11-05"];

/// Server name reported by `initialize`
pub const SERVER_NAME: &str = "pocketbridge";

/// Errors starting or running the server
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Backend client could not be built
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Reading stdin or writing stdout failed
    #[error("Transport I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

/// Handles MCP requests against a [`ToolHost`]
pub struct McpServer {
    host: ToolHost,
}

impl McpServer {
    /// Create a server
    #[must_use]
    pub fn new(host: ToolHost) -> Self {
        Self { host }
    }

    /// Build the backend client, registry and host from arguments
    ///
    /// # Errors
    ///
    /// Returns error if the backend URL is invalid
    pub fn from_args(args: &Args) -> Result<Self, ServerError> {
        let auth = AuthContext::new();
        let backend = HttpBackend::new(args.backend_config(), auth.clone())?;

        let mut registry = ToolRegistry::builtin();
        for name in args.disabled_tools.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            match registry.disable(name) {
                Ok(()) => tracing::info!(tool = name, "tool disabled"),
                Err(e) => tracing::warn!(error = %e, "cannot disable tool"),
            }
        }

        let ctx = ToolContext::new(Arc::new(backend), auth);
        let shaper = ResponseShaper::new(args.shaper_config());
        Ok(Self::new(ToolHost::new(registry, ctx, shaper)))
    }

    /// Tool host
    #[must_use]
    pub fn host(&self) -> &ToolHost {
        &self.host
    }

    /// Authenticate as a superuser. Failure is logged and leaves the server
    /// unauthenticated.
    pub async fn authenticate(&self, credentials: &AdminCredentials) -> bool {
        let operation = Operation::AuthAdmin {
            email: credentials.email.clone(),
            password: credentials.password.expose_secret().to_string(),
        };
        match self.host.context().backend.call(&operation).await {
            Ok(_) => {
                tracing::info!(email = %credentials.email, "authenticated as superuser at startup");
                true
            }
            Err(failure) => {
                tracing::warn!(email = %credentials.email, error = %failure, "startup authentication failed");
                false
            }
        }
    }

    /// Handle one line of input. Returns the serialized response, if any.
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let response = match serde_json::from_str::<Value>(line) {
            Err(e) => Some(Response::error(
                Value::Null,
                RpcError::new(PARSE_ERROR, format!("Parse error: {e}")),
            )),
            Ok(message) => match serde_json::from_value::<Request>(message) {
                Ok(request) => self.handle(request).await,
                Err(e) => Some(Response::error(
                    Value::Null,
                    RpcError::new(INVALID_REQUEST, format!("Invalid request: {e}")),
                )),
            },
        }?;

        match serde_json::to_string(&response) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::error!(error = %e, "cannot serialize response");
                None
            }
        }
    }

    /// Handle a parsed request. Notifications yield no response.
    pub async fn handle(&self, request: Request) -> Option<Response> {
        let Some(id) = request.id.clone() else {
            tracing::debug!(method = %request.method, "notification");
            return None;
        };

        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.initialize(request.params.as_ref())),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.host.registry().descriptors() })),
            "tools/call" => self.call_tool(request.params).await,
            other => Err(RpcError::method_not_found(other)),
        };

        Some(match outcome {
            Ok(result) => Response::result(id, result),
            Err(error) => Response::error(id, error),
        })
    }

    fn initialize(&self, params: Option<&Value>) -> Value {
        let requested = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str);
        let version = requested
            .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(v))
            .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0]);
        tracing::info!(requested, version, "initialize");

        json!({
            "protocolVersion": version,
            "capabilities": { "tools": { "listChanged": false } },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            },
        })
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, RpcError> {
        let params = params.ok_or_else(|| RpcError::invalid_params("tools/call requires params"))?;
        let call: CallParams = serde_json::from_value(params)
            .map_err(|e| RpcError::invalid_params(format!("Invalid tools/call params: {e}")))?;

        let response = self
            .host
            .handle(&call.name, call.arguments.unwrap_or(Value::Null))
            .await;
        Ok(json!({
            "content": [{ "type": "text", "text": response.text }],
            "isError": response.is_error,
        }))
    }

    /// Serve newline-delimited messages until the reader closes
    ///
    /// # Errors
    ///
    /// Returns error if reading or writing fails
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<(), ServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if let Some(response) = self.handle_line(&line).await {
                writer.write_all(response.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }
        tracing::info!("input closed, shutting down");
        Ok(())
    }
}
