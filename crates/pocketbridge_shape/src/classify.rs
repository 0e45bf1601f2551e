//! Failure classification.
//!
//! Precedence, first match wins: an existing envelope passes through, a
//! connectivity fault names the configured backend, an HTTP status maps to a
//! kind, and anything else is a server error carrying the failure text.

use indexmap::IndexMap;
use pocketbridge_core::{ErrorEnvelope, ErrorKind, RawFailure};

/// Classify a raw failure into an envelope
#[must_use]
pub fn classify(failure: RawFailure, backend_url: &str) -> ErrorEnvelope {
    match failure {
        RawFailure::Envelope(envelope) => envelope,
        RawFailure::Connection { .. } => ErrorEnvelope::connection(backend_url),
        RawFailure::Http { status, body } => from_http(status, body.as_ref()),
        RawFailure::Generic { message } => {
            let kind = ErrorKind::ServerError;
            let message = if message.trim().is_empty() {
                kind.default_message().to_string()
            } else {
                message
            };
            ErrorEnvelope::new(kind, message).with_suggestion(kind.suggestion())
        }
    }
}

/// Build an envelope from a backend status and its optional JSON body
#[must_use]
pub fn from_http(status: u16, body: Option<&serde_json::Value>) -> ErrorEnvelope {
    let kind = ErrorKind::from_status(status);
    let message = body
        .and_then(|b| b.get("message"))
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(kind.default_message());

    let envelope = ErrorEnvelope::new(kind, message).with_suggestion(kind.suggestion());
    if kind != ErrorKind::ValidationError {
        return envelope;
    }

    let fields = body.map(field_errors).unwrap_or_default();
    if fields.is_empty() {
        envelope
    } else {
        envelope.with_field_errors(fields)
    }
}

/// Extract `data.<field>.message` entries from a backend error body
#[must_use]
pub fn field_errors(body: &serde_json::Value) -> IndexMap<String, String> {
    let Some(data) = body.get("data").and_then(serde_json::Value::as_object) else {
        return IndexMap::new();
    };

    data.iter()
        .filter_map(|(field, detail)| {
            let message = match detail {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Object(obj) => obj
                    .get("message")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_string),
                _ => None,
            }?;
            Some((field.clone(), message))
        })
        .collect()
}
