//! Uniform error envelope returned by every failed tool call.

use crate::error::CoreError;
use crate::value::{Mapping, MappingExt, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Closed set of failure categories exposed to the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Backend could not be reached
    ConnectionError,
    /// Operation needs a superuser credential that is not present
    AuthRequired,
    /// Backend rejected the credentials (401)
    AuthFailed,
    /// Resource does not exist (404)
    NotFound,
    /// Input rejected (400 or local parameter validation)
    ValidationError,
    /// Credential lacks access (403)
    PermissionDenied,
    /// Too many requests (429)
    RateLimited,
    /// Anything else
    ServerError,
}

impl ErrorKind {
    /// All kinds, in declaration order
    pub const ALL: [ErrorKind; 8] = [
        Self::ConnectionError,
        Self::AuthRequired,
        Self::AuthFailed,
        Self::NotFound,
        Self::ValidationError,
        Self::PermissionDenied,
        Self::RateLimited,
        Self::ServerError,
    ];

    /// Wire code, e.g. `NOT_FOUND`
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConnectionError => "CONNECTION_ERROR",
            Self::AuthRequired => "AUTH_REQUIRED",
            Self::AuthFailed => "AUTH_FAILED",
            Self::NotFound => "NOT_FOUND",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::RateLimited => "RATE_LIMITED",
            Self::ServerError => "SERVER_ERROR",
        }
    }

    /// Map a backend HTTP status to a kind. Unmapped statuses are server errors.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::ValidationError,
            401 => Self::AuthFailed,
            403 => Self::PermissionDenied,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            _ => Self::ServerError,
        }
    }

    /// Message used when the backend supplies none
    #[must_use]
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ConnectionError => "Cannot connect to PocketBase",
            Self::AuthRequired => "Admin authentication required for this operation",
            Self::AuthFailed => "Authentication failed",
            Self::NotFound => "The requested resource was not found",
            Self::ValidationError => "Validation failed",
            Self::PermissionDenied => "Permission denied",
            Self::RateLimited => "Too many requests",
            Self::ServerError => "PocketBase server error",
        }
    }

    /// Operator-facing remedy
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::ConnectionError => {
                "Check that POCKETBASE_URL is correct and that the PocketBase server is running."
            }
            Self::AuthRequired => {
                "Call the auth_admin tool with superuser credentials before retrying."
            }
            Self::AuthFailed => "Check the email/identity and password, then authenticate again.",
            Self::NotFound => "Verify the record ID and collection name are correct.",
            Self::ValidationError => "Check fieldErrors for details and correct the input.",
            Self::PermissionDenied => {
                "Check the collection API rules or authenticate with sufficient privileges."
            }
            Self::RateLimited => "Wait a moment before retrying the request.",
            Self::ServerError => "Check the PocketBase server logs for details.",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ErrorKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.code() == s)
            .ok_or_else(|| CoreError::UnknownErrorCode {
                code: s.to_string(),
            })
    }
}

/// Classified failure, built once per failed call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    /// Failure category
    #[serde(rename = "code")]
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
    /// Operator-facing remedy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Per-field messages for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<IndexMap<String, String>>,
}

impl ErrorEnvelope {
    /// Create an envelope with an explicit message and no suggestion
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            suggestion: None,
            field_errors: None,
        }
    }

    /// Create an envelope carrying the kind's default message and suggestion
    #[must_use]
    pub fn from_kind(kind: ErrorKind) -> Self {
        Self::new(kind, kind.default_message()).with_suggestion(kind.suggestion())
    }

    /// Connectivity failure against `base_url`
    #[must_use]
    pub fn connection(base_url: &str) -> Self {
        let kind = ErrorKind::ConnectionError;
        Self::new(kind, format!("{} at {}", kind.default_message(), base_url))
            .with_suggestion(kind.suggestion())
    }

    /// Superuser credential missing for a privileged operation
    #[must_use]
    pub fn auth_required() -> Self {
        Self::from_kind(ErrorKind::AuthRequired)
    }

    /// Local parameter validation failure
    #[must_use]
    pub fn validation(message: impl Into<String>, field_errors: IndexMap<String, String>) -> Self {
        let kind = ErrorKind::ValidationError;
        let envelope = Self::new(kind, message).with_suggestion(kind.suggestion());
        if field_errors.is_empty() {
            envelope
        } else {
            envelope.with_field_errors(field_errors)
        }
    }

    /// Attach a suggestion
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach per-field messages
    #[must_use]
    pub fn with_field_errors(mut self, field_errors: IndexMap<String, String>) -> Self {
        self.field_errors = Some(field_errors);
        self
    }

    /// Wire shape: `{ error: { code, message, suggestion?, fieldErrors? } }`
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut inner = Mapping::new();
        inner.insert("code".to_string(), Value::from(self.kind.code()));
        inner.insert("message".to_string(), Value::from(self.message.as_str()));
        inner.insert_opt("suggestion", self.suggestion.as_deref());
        inner.insert_opt(
            "fieldErrors",
            self.field_errors.as_ref().map(|fields| {
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
                    .collect::<Mapping>()
            }),
        );

        let mut outer = Mapping::new();
        outer.insert("error".to_string(), Value::Mapping(inner));
        Value::Mapping(outer)
    }
}

impl std::fmt::Display for ErrorEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ErrorEnvelope {}
