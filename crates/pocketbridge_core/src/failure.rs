//! Failures as they arrive from the backend boundary, before classification.

use crate::envelope::ErrorEnvelope;

/// Unclassified failure of a backend call
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RawFailure {
    /// Already classified by an inner call; passed through unchanged
    #[error(transparent)]
    Envelope(#[from] ErrorEnvelope),

    /// Transport could not reach the backend
    #[error("Connection failed: {reason}")]
    Connection {
        /// Transport-level description
        reason: String,
    },

    /// Backend answered with a non-success status
    #[error("Backend returned HTTP {status}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Decoded error body, when the backend sent JSON
        body: Option<serde_json::Value>,
    },

    /// Any other failure carrying only text
    #[error("{message}")]
    Generic {
        /// Failure text
        message: String,
    },
}

impl RawFailure {
    /// Create a connectivity failure
    #[must_use]
    pub fn connection(reason: impl Into<String>) -> Self {
        Self::Connection {
            reason: reason.into(),
        }
    }

    /// Create an HTTP status failure
    #[must_use]
    pub fn http(status: u16, body: Option<serde_json::Value>) -> Self {
        Self::Http { status, body }
    }

    /// Create a text-only failure
    #[must_use]
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }
}

impl From<String> for RawFailure {
    fn from(message: String) -> Self {
        Self::Generic { message }
    }
}

impl From<&str> for RawFailure {
    fn from(message: &str) -> Self {
        Self::generic(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::ErrorKind;

    #[test]
    fn test_envelope_converts_without_rewrapping() {
        let env = ErrorEnvelope::from_kind(ErrorKind::NotFound);
        let failure: RawFailure = env.clone().into();
        assert_eq!(failure, RawFailure::Envelope(env));
    }

    #[test]
    fn test_raw_string_is_generic() {
        let failure: RawFailure = "socket closed".into();
        assert_eq!(failure.to_string(), "socket closed");
    }

    #[test]
    fn test_http_display() {
        let failure = RawFailure::http(503, None);
        assert_eq!(failure.to_string(), "Backend returned HTTP 503");
    }
}
