//! Built-in tools.
//!
//! Most tools are a [`BackendTool`]: parse parameters, plan one backend
//! operation, present the response. Tools that only touch the local credential
//! implement [`Tool`] directly.

pub mod auth;
pub mod collections;
pub mod records;
pub mod system;

use crate::present::Present;
use crate::schema::ToolSchema;
use crate::tool::{Tool, ToolContext};
use crate::validate::{Params, parse_params};
use async_trait::async_trait;
use pocketbridge_backend::Operation;
use pocketbridge_core::{RawFailure, Value};
use pocketbridge_shape::require_admin;
use std::marker::PhantomData;
use std::sync::Arc;

/// Backend operation planned from validated parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    /// Call to make
    pub operation: Operation,
    /// How to present its response
    pub present: Present,
}

impl Plan {
    /// Create a plan
    #[must_use]
    pub fn new(operation: Operation, present: Present) -> Self {
        Self { operation, present }
    }
}

/// Tool backed by exactly one backend operation
pub struct BackendTool<P> {
    schema: ToolSchema,
    plan: fn(P) -> Plan,
    _params: PhantomData<fn() -> P>,
}

impl<P: Params> BackendTool<P> {
    /// Create a tool from its schema and planner
    #[must_use]
    pub fn new(schema: ToolSchema, plan: fn(P) -> Plan) -> Self {
        Self {
            schema,
            plan,
            _params: PhantomData,
        }
    }

    /// Boxed for the registry
    #[must_use]
    pub fn shared(schema: ToolSchema, plan: fn(P) -> Plan) -> Arc<dyn Tool> {
        Arc::new(Self::new(schema, plan))
    }
}

#[async_trait]
impl<P: Params> Tool for BackendTool<P> {
    fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    async fn run(&self, ctx: &ToolContext, arguments: serde_json::Value) -> Result<Value, RawFailure> {
        let params: P = parse_params(arguments)?;
        let Plan { operation, present } = (self.plan)(params);

        if operation.requires_admin() {
            require_admin(&ctx.auth)?;
        }

        let body = ctx.backend.call(&operation).await?;
        present.render(&operation, body)
    }
}

/// Every built-in tool, in advertised order
#[must_use]
pub fn builtin() -> Vec<Arc<dyn Tool>> {
    let mut tools = Vec::new();
    tools.extend(records::tools());
    tools.extend(collections::tools());
    tools.extend(auth::tools());
    tools.extend(system::tools());
    tools
}
