//! In-memory backend for tests.

use async_trait::async_trait;
use pocketbridge_backend::{Backend, Operation};
use pocketbridge_core::{AuthContext, Credential, RawFailure};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays queued responses and records every operation
#[derive(Default)]
pub(crate) struct MockBackend {
    responses: Mutex<VecDeque<Result<serde_json::Value, RawFailure>>>,
    calls: Mutex<Vec<Operation>>,
    auth: AuthContext,
}

impl MockBackend {
    pub(crate) const URL: &'static str = "http://mock:8090";

    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Share the credential store, as the real client does
    pub(crate) fn with_auth(mut self, auth: AuthContext) -> Self {
        self.auth = auth;
        self
    }

    /// Queue the outcome of the next call. Calls past the queue get `null`.
    pub(crate) fn respond(self, outcome: Result<serde_json::Value, RawFailure>) -> Self {
        self.responses.lock().unwrap().push_back(outcome);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Operation> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn base_url(&self) -> &str {
        Self::URL
    }

    async fn call(&self, operation: &Operation) -> Result<serde_json::Value, RawFailure> {
        self.calls.lock().unwrap().push(operation.clone());
        let outcome = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(serde_json::Value::Null));

        if let (Ok(body), Some(collection)) = (&outcome, operation.auth_collection()) {
            if let Some(token) = body.get("token").and_then(serde_json::Value::as_str) {
                self.auth.set(Credential::new(token, collection));
            }
        }
        outcome
    }
}
