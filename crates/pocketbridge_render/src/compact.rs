//! Compact rendering as TOML.
//!
//! TOML requires a table at the root, has no null, and its native datetimes
//! carry timezone ambiguity, so the value tree is lowered first:
//!
//! - non-mapping roots are wrapped as `{ value = ... }`
//! - `Null` becomes `""`
//! - timestamps become ISO-8601 strings
//!
//! Sequences of mappings come out as `[[key]]` blocks and nested mappings as
//! `[parent.child]` sections; everything else stays inline.

use pocketbridge_core::value::iso8601;
use pocketbridge_core::{Mapping, Value};

/// Key used to wrap non-mapping roots
pub const ROOT_KEY: &str = "value";

/// Render a value as TOML.
///
/// An empty root mapping renders as the empty string.
///
/// # Errors
///
/// Returns error if the TOML encoder rejects the lowered document
pub fn render(value: &Value) -> Result<String, toml::ser::Error> {
    let table = match value {
        Value::Mapping(map) => lower_mapping(map),
        other => {
            let mut table = toml::Table::new();
            table.insert(ROOT_KEY.to_string(), lower(other));
            table
        }
    };

    if table.is_empty() {
        return Ok(String::new());
    }
    toml::to_string(&table)
}

fn lower_mapping(map: &Mapping) -> toml::Table {
    map.iter().map(|(k, v)| (k.clone(), lower(v))).collect()
}

fn lower(value: &Value) -> toml::Value {
    match value {
        Value::Null => toml::Value::String(String::new()),
        Value::Bool(b) => toml::Value::Boolean(*b),
        Value::Integer(i) => toml::Value::Integer(*i),
        Value::Float(f) => toml::Value::Float(*f),
        Value::String(s) => toml::Value::String(s.clone()),
        Value::Timestamp(ts) => toml::Value::String(iso8601(ts)),
        Value::Sequence(items) => toml::Value::Array(items.iter().map(lower).collect()),
        Value::Mapping(map) => toml::Value::Table(lower_mapping(map)),
    }
}
