//! POCKETBRIDGE Rendering
//!
//! Turns a [`Value`] tree into text in one of two formats:
//! compact TOML for token-constrained consumers, or pretty JSON.
//! Rendering is pure and total.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compact;
pub mod structured;

use pocketbridge_core::{OutputFormat, Value};

/// Rendering failure reported by one of the encoders
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// TOML encoder rejected the document
    #[error("Compact rendering failed: {0}")]
    Compact(#[from] toml::ser::Error),

    /// JSON encoder failed
    #[error("Structured rendering failed: {0}")]
    Structured(#[from] serde_json::Error),
}

/// Render `value` in `format`, reporting encoder failures
///
/// # Errors
///
/// Returns error if the selected encoder fails
pub fn try_serialize(value: &Value, format: OutputFormat) -> Result<String, RenderError> {
    match format {
        OutputFormat::Compact => Ok(compact::render(value)?),
        OutputFormat::Structured => Ok(structured::render(value)?),
    }
}

/// Render `value` in `format`.
///
/// A compact encoder failure falls back to the structured rendering; a
/// structured failure yields a minimal JSON error document.
#[must_use]
pub fn serialize(value: &Value, format: OutputFormat) -> String {
    match try_serialize(value, format) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(%format, error = %err, "rendering failed, falling back");
            match structured::render(value) {
                Ok(text) => text,
                Err(err) => {
                    tracing::error!(error = %err, "structured rendering failed");
                    serde_json::json!({ "error": { "code": "SERVER_ERROR", "message": err.to_string() } })
                        .to_string()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pocketbridge_core::{Mapping, MappingExt, PagedResult};
    use proptest::prelude::*;

    #[test]
    fn test_serialize_scalar_compact() {
        let out = serialize(&Value::from("hi"), OutputFormat::Compact);
        assert!(out.contains("value = \"hi\""));
    }

    #[test]
    fn test_serialize_empty_mapping_compact() {
        assert_eq!(serialize(&Value::mapping(), OutputFormat::Compact), "");
    }

    #[test]
    fn test_timestamp_identical_in_both_formats() {
        let ts = Utc.with_ymd_and_hms(2024, 12, 24, 18, 30, 5).unwrap();
        let mut map = Mapping::new();
        map.insert("updated".to_string(), Value::Timestamp(ts));
        let value = Value::Mapping(map);

        let compact: toml::Table =
            toml::from_str(&serialize(&value, OutputFormat::Compact)).unwrap();
        let structured: serde_json::Value =
            serde_json::from_str(&serialize(&value, OutputFormat::Structured)).unwrap();

        let from_compact = compact.get("updated").and_then(toml::Value::as_str).unwrap();
        let from_structured = structured["updated"].as_str().unwrap();
        assert_eq!(from_compact, from_structured);
        assert_eq!(from_compact, "2024-12-24T18:30:05.000Z");
    }

    #[test]
    fn test_paged_list_scenario() {
        let items = vec![
            serde_json::json!({"id": "a"}),
            serde_json::json!({"id": "b"}),
        ];
        let value = PagedResult::new(1, 2, 5, 3, items)
            .map(Value::from_json)
            .into_value();
        let out = serialize(&value, OutputFormat::Compact);

        assert!(out.contains("page = 1"));
        assert!(out.contains("totalItems = 5"));
        assert!(out.contains("hasMore = true"));
        assert!(out.contains("nextOffset = 2"));
        assert_eq!(out.matches("[[items]]").count(), 2);
    }

    #[test]
    fn test_structured_keeps_null() {
        let mut map = Mapping::new();
        map.insert_opt("n", Some(Value::Null));
        let out = serialize(&Value::Mapping(map), OutputFormat::Structured);
        assert_eq!(out, "{\n  \"n\": null\n}");
    }

    proptest! {
        #[test]
        fn prop_any_string_wraps_and_parses_back(s in ".*") {
            let out = serialize(&Value::String(s.clone()), OutputFormat::Compact);
            let parsed: toml::Table = toml::from_str(&out).unwrap();
            prop_assert_eq!(parsed.get("value").and_then(toml::Value::as_str), Some(s.as_str()));
        }

        #[test]
        fn prop_absent_vs_null_distinct(
            present in proptest::collection::btree_set("[a-z]{1,8}", 1..8),
            absent in proptest::collection::btree_set("[A-Z]{1,8}", 0..8),
        ) {
            let mut map = Mapping::new();
            for key in &present {
                map.insert_opt(key, Some(Value::Null));
            }
            for key in &absent {
                map.insert_opt::<Value>(key, None);
            }
            let out = serialize(&Value::Mapping(map), OutputFormat::Compact);
            let parsed: toml::Table = toml::from_str(&out).unwrap();
            for key in &present {
                prop_assert_eq!(parsed.get(key).and_then(toml::Value::as_str), Some(""));
            }
            for key in &absent {
                prop_assert!(!parsed.contains_key(key));
            }
        }

        #[test]
        fn prop_integers_survive_compact(values in proptest::collection::vec(any::<i64>(), 0..16)) {
            let seq = Value::Sequence(values.iter().copied().map(Value::Integer).collect());
            let out = serialize(&seq, OutputFormat::Compact);
            let parsed: toml::Table = toml::from_str(&out).unwrap();
            let back: Vec<i64> = parsed["value"]
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_integer().unwrap())
                .collect();
            prop_assert_eq!(back, values);
        }
    }
}
