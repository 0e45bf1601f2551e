//! Parameter parsing and validation.
//!
//! Every tool declares a parameter struct implementing [`Params`]. Parsing runs
//! serde first, then the struct's own checks; any violation becomes a single
//! `VALIDATION_ERROR` envelope listing every offending field.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use pocketbridge_backend::ListQuery;
use pocketbridge_core::{ErrorEnvelope, RawFailure};
use regex::Regex;
use serde::Deserialize;
use serde::de::{DeserializeOwned, Deserializer};
use secrecy::SecretString;

static COLLECTION_NAME: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").ok());

static BACKUP_KEY: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+\.zip$").ok());

fn matches(re: &Lazy<Option<Regex>>, value: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(value))
}

/// Typed tool parameters
pub trait Params: DeserializeOwned + Send + 'static {
    /// Record constraint violations not expressible in the type
    fn check(&self, _errors: &mut FieldErrors) {}
}

/// Per-field violations collected during a check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: IndexMap<String, String>,
}

impl FieldErrors {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation. The first message per field wins.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    /// No violations recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of offending fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Collection name: letters, digits and underscores, not starting with a digit
    pub fn collection_name(&mut self, field: &str, value: &str) {
        if value.is_empty() {
            self.add(field, "must not be empty");
        } else if !matches(&COLLECTION_NAME, value) {
            self.add(
                field,
                "must start with a letter or underscore and contain only letters, digits and underscores",
            );
        }
    }

    /// Non-blank string
    pub fn non_empty(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "must not be empty");
        }
    }

    /// JSON object with at least one key
    pub fn object(&mut self, field: &str, value: &serde_json::Value) {
        match value.as_object() {
            Some(map) if !map.is_empty() => {}
            Some(_) => self.add(field, "must not be empty"),
            None => self.add(field, "must be an object"),
        }
    }

    /// Backup archive name
    pub fn backup_key(&mut self, field: &str, value: &str) {
        if !matches(&BACKUP_KEY, value) {
            self.add(field, "must be a file name ending in .zip");
        }
    }

    /// Convert into a validation envelope when anything was recorded
    ///
    /// # Errors
    ///
    /// Returns a `VALIDATION_ERROR` envelope carrying every violation
    pub fn into_result(self) -> Result<(), ErrorEnvelope> {
        if self.errors.is_empty() {
            return Ok(());
        }
        let fields: Vec<&str> = self.errors.keys().map(String::as_str).collect();
        let message = format!("Invalid parameters: {}", fields.join(", "));
        Err(ErrorEnvelope::validation(message, self.errors))
    }
}

/// Parse and check tool parameters. Absent arguments parse as an empty object.
///
/// # Errors
///
/// Returns a `VALIDATION_ERROR` envelope if deserialization or a check fails
pub fn parse_params<P: Params>(arguments: serde_json::Value) -> Result<P, RawFailure> {
    let arguments = match arguments {
        serde_json::Value::Null => serde_json::Value::Object(serde_json::Map::new()),
        other => other,
    };

    let params: P = serde_json::from_value(arguments).map_err(|e| {
        let message = e.to_string();
        let mut errors = FieldErrors::new();
        errors.add(field_of(&message).unwrap_or("arguments"), message.clone());
        ErrorEnvelope::validation(format!("Invalid parameters: {message}"), errors.errors)
    })?;

    let mut errors = FieldErrors::new();
    params.check(&mut errors);
    errors.into_result()?;
    Ok(params)
}

/// Field named in a serde message such as ``missing field `id` ``
fn field_of(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    rest.split('`').next().filter(|f| !f.is_empty())
}

/// Paging, filtering and sorting parameters shared by list tools
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    /// 1-based page
    #[serde(default = "default_page")]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_per_page")]
    pub per_page: i64,
    /// Backend filter expression
    #[serde(default)]
    pub filter: Option<String>,
    /// Sort expression
    #[serde(default)]
    pub sort: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    i64::from(ListQuery::DEFAULT_PER_PAGE)
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
            filter: None,
            sort: None,
        }
    }
}

impl Paging {
    /// Check page bounds
    pub fn check(&self, errors: &mut FieldErrors) {
        if self.page < 1 || self.page > i64::from(u32::MAX) {
            errors.add("page", "must be a positive page number");
        }
        let max = i64::from(ListQuery::MAX_PER_PAGE);
        if !(1..=max).contains(&self.per_page) {
            errors.add("perPage", format!("must be between 1 and {max}"));
        }
    }

    /// Backend query. Out-of-range values are clamped; call [`Paging::check`] first.
    #[must_use]
    pub fn query(&self) -> ListQuery {
        let page = u32::try_from(self.page.max(1)).unwrap_or(u32::MAX);
        let per_page = u32::try_from(self.per_page.clamp(1, i64::from(ListQuery::MAX_PER_PAGE)))
            .unwrap_or(ListQuery::DEFAULT_PER_PAGE);
        ListQuery::new(page, per_page)
            .with_filter(self.filter.clone())
            .with_sort(self.sort.clone())
    }
}

/// Deserialize a password straight into a [`SecretString`]
///
/// # Errors
///
/// Returns the deserializer's error if the value is not a string
pub fn secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}
