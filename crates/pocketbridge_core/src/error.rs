//! Core error types for POCKETBRIDGE.

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while building core values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Unrecognized output format name
    #[error("Unknown output format: {name}")]
    UnknownFormat {
        /// Name that failed to parse
        name: String,
    },

    /// Unrecognized error code
    #[error("Unknown error code: {code}")]
    UnknownErrorCode {
        /// Code that failed to parse
        code: String,
    },

    /// Backend list payload is missing a field or has the wrong type
    #[error("Malformed list response: {field}")]
    MalformedList {
        /// Offending field
        field: String,
    },
}
