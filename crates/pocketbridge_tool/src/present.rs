//! Turning backend JSON into the value handed to the shaper.

use pocketbridge_backend::Operation;
use pocketbridge_core::{Credential, Mapping, PagedResult, RawFailure, Value};

/// How a backend response is presented to the agent
#[derive(Debug, Clone, PartialEq)]
pub enum Present {
    /// The body as is
    Document,
    /// A paged list
    Page,
    /// A bare array, placed under a key
    Under(&'static str),
    /// A fixed acknowledgement, ignoring the (usually empty) body
    Ack(Mapping),
    /// An auth response with the token removed
    Auth,
}

impl Present {
    /// Acknowledgement `{<flag>: true, <key>: <subject>}`
    #[must_use]
    pub fn ack(flag: &str, key: &str, subject: &str) -> Self {
        let mut map = Mapping::new();
        map.insert(flag.to_string(), Value::Bool(true));
        map.insert(key.to_string(), Value::from(subject));
        Self::Ack(map)
    }

    /// Convert the body returned for `operation`
    ///
    /// # Errors
    ///
    /// Returns a generic failure if a list body is malformed
    pub fn render(self, operation: &Operation, body: serde_json::Value) -> Result<Value, RawFailure> {
        match self {
            Self::Document => Ok(Value::from_json(body)),
            Self::Page => {
                let page = PagedResult::from_backend(body).map_err(|e| {
                    RawFailure::generic(format!("Unexpected {} response: {e}", operation.name()))
                })?;
                Ok(page.map(Value::from_json).into_value())
            }
            Self::Under(key) => {
                let mut map = Mapping::new();
                let inner = match body {
                    serde_json::Value::Null => Value::Sequence(Vec::new()),
                    other => Value::from_json(other),
                };
                map.insert(key.to_string(), inner);
                Ok(Value::Mapping(map))
            }
            Self::Ack(map) => Ok(Value::Mapping(map)),
            Self::Auth => {
                let admin = operation.auth_collection() == Some(Credential::SUPERUSER_COLLECTION);
                let mut map = Mapping::new();
                map.insert("authenticated".to_string(), Value::Bool(true));
                map.insert("admin".to_string(), Value::Bool(admin));
                let record = body.get("record").cloned().unwrap_or(serde_json::Value::Null);
                map.insert("record".to_string(), Value::from_json(record));
                Ok(Value::Mapping(map))
            }
        }
    }
}
