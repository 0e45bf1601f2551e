//! Structured rendering as pretty-printed JSON.

use pocketbridge_core::Value;

/// Render a value as JSON with 2-space indentation and insertion key order.
///
/// # Errors
///
/// Returns error if the JSON encoder fails
pub fn render(value: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}
