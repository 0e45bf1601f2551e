//! Tool trait and the context every call runs in.

use crate::schema::ToolSchema;
use async_trait::async_trait;
use pocketbridge_backend::Backend;
use pocketbridge_core::{AuthContext, RawFailure, Value};
use std::sync::Arc;

/// Everything a tool may touch during a call
#[derive(Clone)]
pub struct ToolContext {
    /// Backend client
    pub backend: Arc<dyn Backend>,
    /// Credential shared with the backend client
    pub auth: AuthContext,
}

impl ToolContext {
    /// Create a context
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, auth: AuthContext) -> Self {
        Self { backend, auth }
    }
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext")
            .field("backend", &self.backend.base_url())
            .field("authenticated", &self.auth.is_authenticated())
            .finish()
    }
}

/// A callable tool
#[async_trait]
pub trait Tool: Send + Sync {
    /// Advertised schema
    fn schema(&self) -> &ToolSchema;

    /// Tool name
    fn name(&self) -> &str {
        &self.schema().name
    }

    /// Run the tool with the agent's arguments (without `format`)
    async fn run(&self, ctx: &ToolContext, arguments: serde_json::Value) -> Result<Value, RawFailure>;
}
