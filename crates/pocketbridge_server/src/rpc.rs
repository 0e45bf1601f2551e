//! JSON-RPC 2.0 message types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Invalid JSON was received
pub const PARSE_ERROR: i32 = -32700;
/// The JSON sent is not a valid request object
pub const INVALID_REQUEST: i32 = -32600;
/// The method does not exist
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Invalid method parameters
pub const INVALID_PARAMS: i32 = -32602;

/// Incoming request or notification
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Request {
    /// Protocol version, always `2.0`
    #[serde(default)]
    pub jsonrpc: String,
    /// Method name
    pub method: String,
    /// Method parameters
    #[serde(default)]
    pub params: Option<Value>,
    /// Request id; absent for notifications
    #[serde(default)]
    pub id: Option<Value>,
}

impl Request {
    /// Notifications get no response
    #[must_use]
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Outgoing response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    jsonrpc: &'static str,
    #[serde(flatten)]
    outcome: Outcome,
    id: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
enum Outcome {
    Result { result: Value },
    Error { error: RpcError },
}

/// Error object of a failed request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcError {
    /// Error code
    pub code: i32,
    /// Short description
    pub message: String,
}

impl RpcError {
    /// Create an error
    #[must_use]
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Unknown method
    #[must_use]
    pub fn method_not_found(method: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("Method not found: {method}"))
    }

    /// Bad parameters
    #[must_use]
    pub fn invalid_params(reason: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, reason)
    }
}

impl Response {
    /// Successful response
    #[must_use]
    pub fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            outcome: Outcome::Result { result },
            id,
        }
    }

    /// Error response. Use `null` as the id when the request id is unknown.
    #[must_use]
    pub fn error(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0",
            outcome: Outcome::Error { error },
            id,
        }
    }

    /// Error code, when this is an error response
    #[must_use]
    pub fn error_code(&self) -> Option<i32> {
        match &self.outcome {
            Outcome::Error { error } => Some(error.code),
            Outcome::Result { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_wire_shape() {
        let json = serde_json::to_value(Response::result(Value::from(1), serde_json::json!({}))).unwrap();
        assert_eq!(json, serde_json::json!({"jsonrpc": "2.0", "result": {}, "id": 1}));
    }

    #[test]
    fn test_error_wire_shape() {
        let response = Response::error(Value::Null, RpcError::new(PARSE_ERROR, "Parse error"));
        assert_eq!(response.error_code(), Some(PARSE_ERROR));
        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["error"]["code"], -32700);
        assert!(json["id"].is_null());
    }

    #[test]
    fn test_notification_has_no_id() {
        let request: Request =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).unwrap();
        assert!(request.is_notification());
        assert!(request.params.is_none());
    }
}
