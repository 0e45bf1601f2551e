//! Pre-call privilege checks. These run before any backend round trip.

use pocketbridge_core::{AuthContext, ErrorEnvelope, ErrorKind};

/// Require a superuser credential
///
/// # Errors
///
/// Returns an `AUTH_REQUIRED` envelope when no superuser credential is held
pub fn require_admin(auth: &AuthContext) -> Result<(), ErrorEnvelope> {
    if auth.is_superuser() {
        Ok(())
    } else {
        Err(ErrorEnvelope::auth_required())
    }
}

/// Require any credential
///
/// # Errors
///
/// Returns an `AUTH_REQUIRED` envelope when no credential is held
pub fn require_authenticated(auth: &AuthContext) -> Result<(), ErrorEnvelope> {
    if auth.is_authenticated() {
        Ok(())
    } else {
        Err(unauthenticated())
    }
}

/// `AUTH_REQUIRED` envelope for calls that need any credential
#[must_use]
pub fn unauthenticated() -> ErrorEnvelope {
    ErrorEnvelope::new(ErrorKind::AuthRequired, "Authentication required for this operation")
        .with_suggestion("Call auth_user or auth_admin before retrying.")
}
