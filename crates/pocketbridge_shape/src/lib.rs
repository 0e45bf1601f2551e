//! POCKETBRIDGE Response Shaping
//!
//! Every tool call ends here. Successful payloads are rendered and, when
//! oversized, list payloads get one truncation pass. Failures of any origin are
//! classified into a single [`ErrorEnvelope`] and rendered in the requested
//! format, so the agent always receives well-formed text.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classify;
pub mod guard;
pub mod truncate;

pub use classify::classify;
pub use guard::{require_admin, require_authenticated, unauthenticated};
pub use truncate::{Truncation, halve_items};

use pocketbridge_core::{ErrorEnvelope, OutputFormat, RawFailure, Value};
use pocketbridge_render::serialize;

/// Default maximum rendered size, in characters
pub const DEFAULT_SIZE_LIMIT: usize = 25_000;

/// Shaper configuration, fixed for the process lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaperConfig {
    /// Backend address quoted in connectivity errors
    pub backend_url: String,
    /// Maximum rendered size before truncation kicks in
    pub size_limit: usize,
}

impl ShaperConfig {
    /// Create a config with the default size limit
    #[must_use]
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            size_limit: DEFAULT_SIZE_LIMIT,
        }
    }

    /// Set the size limit
    #[must_use]
    pub fn with_size_limit(mut self, size_limit: usize) -> Self {
        self.size_limit = size_limit;
        self
    }
}

/// Rendered tool output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedResponse {
    /// Text handed to the transport
    pub text: String,
    /// Whether this is an error envelope
    pub is_error: bool,
}

impl RenderedResponse {
    /// Successful output
    #[must_use]
    pub fn ok(text: String) -> Self {
        Self {
            text,
            is_error: false,
        }
    }

    /// Error output
    #[must_use]
    pub fn error(text: String) -> Self {
        Self {
            text,
            is_error: true,
        }
    }
}

/// Turns call outcomes into rendered responses
#[derive(Debug, Clone)]
pub struct ResponseShaper {
    config: ShaperConfig,
}

impl ResponseShaper {
    /// Create a shaper
    #[must_use]
    pub fn new(config: ShaperConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &ShaperConfig {
        &self.config
    }

    /// Shape the outcome of one call
    #[must_use]
    pub fn shape(&self, outcome: Result<Value, RawFailure>, format: OutputFormat) -> RenderedResponse {
        match outcome {
            Ok(value) => self.success(value, format),
            Err(failure) => self.failure(failure, format),
        }
    }

    /// Render a successful payload, truncating an oversized list at most once
    #[must_use]
    pub fn success(&self, mut value: Value, format: OutputFormat) -> RenderedResponse {
        let text = serialize(&value, format);
        let length = text.chars().count();
        if length <= self.config.size_limit {
            return RenderedResponse::ok(text);
        }

        let Some(truncation) = halve_items(&mut value) else {
            tracing::warn!(
                length,
                limit = self.config.size_limit,
                "oversized response is not a list page, returned as is"
            );
            return RenderedResponse::ok(text);
        };

        let text = serialize(&value, format);
        tracing::warn!(
            original = truncation.original,
            kept = truncation.kept,
            length_before = length,
            length_after = text.chars().count(),
            limit = self.config.size_limit,
            "truncated oversized list response"
        );
        RenderedResponse::ok(text)
    }

    /// Classify a failure
    #[must_use]
    pub fn classify(&self, failure: RawFailure) -> ErrorEnvelope {
        classify(failure, &self.config.backend_url)
    }

    /// Classify and render a failure
    #[must_use]
    pub fn failure(&self, failure: RawFailure, format: OutputFormat) -> RenderedResponse {
        let envelope = self.classify(failure);
        tracing::debug!(code = envelope.kind.code(), message = %envelope.message, "call failed");
        self.envelope(&envelope, format)
    }

    /// Render an already-classified envelope
    #[must_use]
    pub fn envelope(&self, envelope: &ErrorEnvelope, format: OutputFormat) -> RenderedResponse {
        RenderedResponse::error(serialize(&envelope.to_value(), format))
    }
}
