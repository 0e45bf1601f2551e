//! Shared authentication state.
//!
//! The credential is owned by an explicit [`AuthContext`] handle that is passed
//! to the backend client and to every tool call. It starts empty, is set by a
//! successful authenticate call, and is cleared by logout.

use std::sync::{Arc, PoisonError, RwLock};

/// Token obtained from a successful authenticate call
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    /// Bearer token sent with every request
    pub token: String,
    /// Collection the credential was issued for
    pub collection: String,
    /// Whether the credential belongs to a superuser
    pub superuser: bool,
    /// Authenticated record as returned by the backend
    pub record: Option<serde_json::Value>,
}

impl Credential {
    /// Collection holding superuser accounts
    pub const SUPERUSER_COLLECTION: &'static str = "_superusers";

    /// Create a credential
    #[must_use]
    pub fn new(token: impl Into<String>, collection: impl Into<String>) -> Self {
        let collection = collection.into();
        Self {
            token: token.into(),
            superuser: collection == Self::SUPERUSER_COLLECTION,
            collection,
            record: None,
        }
    }

    /// Attach the authenticated record
    #[must_use]
    pub fn with_record(mut self, record: serde_json::Value) -> Self {
        self.record = Some(record);
        self
    }
}

/// Cloneable handle to the single process credential
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    inner: Arc<RwLock<Option<Credential>>>,
}

impl AuthContext {
    /// Create an unauthenticated context
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored credential
    pub fn set(&self, credential: Credential) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(credential);
    }

    /// Drop the stored credential, returning whether one was present
    pub fn clear(&self) -> bool {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
    }

    /// Snapshot of the stored credential
    #[must_use]
    pub fn credential(&self) -> Option<Credential> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current bearer token
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.credential().map(|c| c.token)
    }

    /// Any credential is present
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// A superuser credential is present
    #[must_use]
    pub fn is_superuser(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|c| c.superuser)
    }
}
