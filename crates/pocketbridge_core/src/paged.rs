//! Page-bounded list results.

use crate::error::{CoreError, CoreResult};
use crate::value::{Mapping, MappingExt, Value};
use serde::{Deserialize, Serialize};

/// One page of a list operation, with totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    /// 1-based page number
    pub page: u64,
    /// Page size requested
    pub per_page: u64,
    /// Items across all pages
    pub total_items: u64,
    /// Number of pages
    pub total_pages: u64,
    /// Items on this page
    pub items: Vec<T>,
}

impl<T> PagedResult<T> {
    /// Create a page
    #[must_use]
    pub fn new(page: u64, per_page: u64, total_items: u64, total_pages: u64, items: Vec<T>) -> Self {
        Self {
            page,
            per_page,
            total_items,
            total_pages,
            items,
        }
    }

    /// More pages follow this one
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }

    /// Offset of the first item on the next page, when there is one
    #[must_use]
    pub fn next_offset(&self) -> Option<u64> {
        self.has_more().then(|| self.page.saturating_mul(self.per_page))
    }

    /// Transform the items, keeping the paging metadata
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResult<U> {
        PagedResult {
            page: self.page,
            per_page: self.per_page,
            total_items: self.total_items,
            total_pages: self.total_pages,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

impl<T: Into<Value>> PagedResult<T> {
    /// Render as a mapping with derived `hasMore` and `nextOffset`
    #[must_use]
    pub fn into_value(self) -> Value {
        let has_more = self.has_more();
        let next_offset = self.next_offset();

        let mut map = Mapping::new();
        map.insert("page".to_string(), Value::from(self.page));
        map.insert("perPage".to_string(), Value::from(self.per_page));
        map.insert("totalItems".to_string(), Value::from(self.total_items));
        map.insert("totalPages".to_string(), Value::from(self.total_pages));
        map.insert("hasMore".to_string(), Value::Bool(has_more));
        map.insert_opt("nextOffset", next_offset);
        map.insert(
            "items".to_string(),
            Value::Sequence(self.items.into_iter().map(Into::into).collect()),
        );
        Value::Mapping(map)
    }
}

impl PagedResult<serde_json::Value> {
    /// Read a backend list response.
    ///
    /// Negative totals (the backend reports `-1` when totals are skipped) are
    /// clamped to zero.
    ///
    /// # Errors
    ///
    /// Returns error if a paging field or the `items` array is missing
    pub fn from_backend(json: serde_json::Value) -> CoreResult<Self> {
        let mut object = match json {
            serde_json::Value::Object(object) => object,
            _ => {
                return Err(CoreError::MalformedList {
                    field: "<root>".to_string(),
                });
            }
        };

        let number = |object: &serde_json::Map<String, serde_json::Value>, field: &str| {
            object
                .get(field)
                .and_then(serde_json::Value::as_i64)
                .map(|n| n.max(0) as u64)
                .ok_or_else(|| CoreError::MalformedList {
                    field: field.to_string(),
                })
        };

        let page = number(&object, "page")?;
        let per_page = number(&object, "perPage")?;
        let total_items = number(&object, "totalItems")?;
        let total_pages = number(&object, "totalPages")?;
        let items = match object.remove("items") {
            Some(serde_json::Value::Array(items)) => items,
            _ => {
                return Err(CoreError::MalformedList {
                    field: "items".to_string(),
                });
            }
        };

        Ok(Self::new(page, per_page, total_items, total_pages, items))
    }
}
