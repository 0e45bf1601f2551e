//! Authentication tools.
//!
//! `auth_admin`, `auth_user` and `auth_refresh` go to the backend, which stores
//! the returned credential in the shared context. `auth_status` and `logout`
//! only touch the local credential.

use super::{BackendTool, Plan};
use crate::present::Present;
use crate::schema::{Access, ToolSchema, param};
use crate::tool::{Tool, ToolContext};
use crate::validate::{FieldErrors, Params, secret};
use async_trait::async_trait;
use pocketbridge_backend::Operation;
use pocketbridge_core::{Mapping, MappingExt, RawFailure, Value};
use pocketbridge_shape::unauthenticated;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::Arc;

/// Auth collection used by `auth_user` when none is given
pub const DEFAULT_USER_COLLECTION: &str = "users";

/// `auth_admin` parameters
#[derive(Debug, Deserialize)]
pub struct AuthAdminParams {
    /// Superuser email
    pub email: String,
    /// Superuser password
    #[serde(deserialize_with = "secret")]
    pub password: SecretString,
}

impl Params for AuthAdminParams {
    fn check(&self, errors: &mut FieldErrors) {
        errors.non_empty("email", &self.email);
        errors.non_empty("password", self.password.expose_secret());
    }
}

/// `auth_user` parameters
#[derive(Debug, Deserialize)]
pub struct AuthUserParams {
    /// Auth collection
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Username or email
    pub identity: String,
    /// Password
    #[serde(deserialize_with = "secret")]
    pub password: SecretString,
}

fn default_collection() -> String {
    DEFAULT_USER_COLLECTION.to_string()
}

impl Params for AuthUserParams {
    fn check(&self, errors: &mut FieldErrors) {
        errors.collection_name("collection", &self.collection);
        errors.non_empty("identity", &self.identity);
        errors.non_empty("password", self.password.expose_secret());
    }
}

/// Refreshes the current credential for its own collection
pub struct AuthRefresh {
    schema: ToolSchema,
}

impl AuthRefresh {
    /// Create the tool
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: ToolSchema::new("auth_refresh", "Refresh the current authentication token")
                .with_access(Access::Authenticated),
        }
    }
}

impl Default for AuthRefresh {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for AuthRefresh {
    fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    async fn run(&self, ctx: &ToolContext, _arguments: serde_json::Value) -> Result<Value, RawFailure> {
        let credential = ctx.auth.credential().ok_or_else(unauthenticated)?;
        let operation = Operation::AuthRefresh {
            collection: credential.collection,
        };
        let body = ctx.backend.call(&operation).await?;
        Present::Auth.render(&operation, body)
    }
}

/// Reports the local credential without calling the backend
pub struct AuthStatus {
    schema: ToolSchema,
}

impl AuthStatus {
    /// Create the tool
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: ToolSchema::new("auth_status", "Show whether a credential is held and whose it is"),
        }
    }
}

impl Default for AuthStatus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for AuthStatus {
    fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    async fn run(&self, ctx: &ToolContext, _arguments: serde_json::Value) -> Result<Value, RawFailure> {
        let credential = ctx.auth.credential();
        let mut map = Mapping::new();
        map.insert("authenticated".to_string(), Value::Bool(credential.is_some()));
        map.insert(
            "admin".to_string(),
            Value::Bool(credential.as_ref().is_some_and(|c| c.superuser)),
        );
        map.insert_opt("collection", credential.as_ref().map(|c| c.collection.clone()));
        map.insert_opt("record", credential.and_then(|c| c.record).map(Value::from_json));
        Ok(Value::Mapping(map))
    }
}

/// Forgets the local credential
pub struct Logout {
    schema: ToolSchema,
}

impl Logout {
    /// Create the tool
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: ToolSchema::new("logout", "Forget the current credential"),
        }
    }
}

impl Default for Logout {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for Logout {
    fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    async fn run(&self, ctx: &ToolContext, _arguments: serde_json::Value) -> Result<Value, RawFailure> {
        let was_authenticated = ctx.auth.clear();
        tracing::info!(was_authenticated, "credential cleared");
        let mut map = Mapping::new();
        map.insert("loggedOut".to_string(), Value::Bool(true));
        map.insert("wasAuthenticated".to_string(), Value::Bool(was_authenticated));
        Ok(Value::Mapping(map))
    }
}

/// Authentication tools
#[must_use]
pub fn tools() -> Vec<Arc<dyn Tool>> {
    vec![
        BackendTool::<AuthAdminParams>::shared(
            ToolSchema::new("auth_admin", "Authenticate as a superuser; required for admin tools")
                .with_required("email", param::string("Superuser email"))
                .with_required("password", param::string("Superuser password")),
            |p: AuthAdminParams| {
                Plan::new(
                    Operation::AuthAdmin {
                        email: p.email,
                        password: p.password.expose_secret().to_string(),
                    },
                    Present::Auth,
                )
            },
        ),
        BackendTool::<AuthUserParams>::shared(
            ToolSchema::new("auth_user", "Authenticate a user of an auth collection")
                .with_param("collection", param::string("Auth collection (default users)"))
                .with_required("identity", param::string("Username or email"))
                .with_required("password", param::string("Password")),
            |p: AuthUserParams| {
                Plan::new(
                    Operation::AuthWithPassword {
                        collection: p.collection,
                        identity: p.identity,
                        password: p.password.expose_secret().to_string(),
                    },
                    Present::Auth,
                )
            },
        ),
        Arc::new(AuthRefresh::new()),
        Arc::new(AuthStatus::new()),
        Arc::new(Logout::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::parse_params;

    #[test]
    fn test_password_not_in_debug_output() {
        let p: AuthAdminParams = parse_params(serde_json::json!({
            "email": "root@example.com",
            "password": "hunter2"
        }))
        .unwrap();
        assert!(!format!("{p:?}").contains("hunter2"));
        assert_eq!(p.password.expose_secret(), "hunter2");
    }

    #[test]
    fn test_user_collection_defaults() {
        let p: AuthUserParams = parse_params(serde_json::json!({
            "identity": "ann",
            "password": "pw"
        }))
        .unwrap();
        assert_eq!(p.collection, DEFAULT_USER_COLLECTION);
    }

    #[test]
    fn test_empty_password_rejected() {
        let err = parse_params::<AuthAdminParams>(serde_json::json!({
            "email": "root@example.com",
            "password": ""
        }))
        .unwrap_err();
        assert!(err.to_string().contains("password"));
    }
}
