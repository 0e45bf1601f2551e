//! Single-pass truncation of oversized list payloads.

use pocketbridge_core::{Mapping, Value};

/// Flag added to a truncated payload
pub const TRUNCATED_KEY: &str = "truncated";
/// Explanation added to a truncated payload
pub const TRUNCATION_MESSAGE_KEY: &str = "truncationMessage";
/// Sequence that gets shortened
pub const ITEMS_KEY: &str = "items";
/// Paging fields a mapping must carry to be treated as a list page
pub const PAGING_KEYS: [&str; 4] = ["page", "perPage", "totalItems", "totalPages"];

/// Outcome of a truncation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncation {
    /// Items before the pass
    pub original: usize,
    /// Items kept
    pub kept: usize,
}

impl Truncation {
    /// Message attached to the payload
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "Response truncated from {} to {} items to fit the output limit. \
             The dropped items were not returned; nextOffset points at the first of them. \
             Use a smaller perPage or a filter to narrow the results.",
            self.original, self.kept
        )
    }
}

/// Halve the `items` sequence of a list page (rounding up) and mark it.
///
/// Returns `None`, leaving the value untouched, unless it is a mapping with an
/// `items` sequence and every paging field. Records that merely own an `items`
/// field are not pages. After the pass `hasMore` is true and `nextOffset` is
/// the offset of the first dropped item.
pub fn halve_items(value: &mut Value) -> Option<Truncation> {
    let map = value.as_mapping_mut()?;
    if !PAGING_KEYS.iter().all(|key| map.contains_key(*key)) {
        return None;
    }
    let Some(Value::Sequence(items)) = map.get_mut(ITEMS_KEY) else {
        return None;
    };

    let original = items.len();
    let kept = original.div_ceil(2);
    items.truncate(kept);

    let truncation = Truncation { original, kept };
    if kept < original {
        resume_after_kept(map, kept);
    }
    map.insert(TRUNCATED_KEY.to_string(), Value::Bool(true));
    map.insert(
        TRUNCATION_MESSAGE_KEY.to_string(),
        Value::String(truncation.message()),
    );
    Some(truncation)
}

fn resume_after_kept(map: &mut Mapping, kept: usize) {
    let integer = |key: &str| match map.get(key) {
        Some(Value::Integer(i)) => Some(*i),
        _ => None,
    };
    let (Some(page), Some(per_page)) = (integer("page"), integer("perPage")) else {
        return;
    };
    let offset = page
        .saturating_sub(1)
        .max(0)
        .saturating_mul(per_page)
        .saturating_add(i64::try_from(kept).unwrap_or(i64::MAX));

    map.insert("hasMore".to_string(), Value::Bool(true));
    map.insert("nextOffset".to_string(), Value::Integer(offset));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(n: usize) -> Value {
        let mut map = Mapping::new();
        map.insert("page".to_string(), Value::from(2i64));
        map.insert("perPage".to_string(), Value::from(10i64));
        map.insert("totalItems".to_string(), Value::from(40i64));
        map.insert("totalPages".to_string(), Value::from(4i64));
        map.insert("hasMore".to_string(), Value::Bool(true));
        map.insert("nextOffset".to_string(), Value::from(20i64));
        map.insert(
            ITEMS_KEY.to_string(),
            Value::Sequence((0..n).map(|i| Value::from(i as i64)).collect()),
        );
        Value::Mapping(map)
    }

    #[test]
    fn test_halves_rounding_up() {
        let mut value = list(5);
        let t = halve_items(&mut value).unwrap();
        assert_eq!(t, Truncation { original: 5, kept: 3 });
        assert_eq!(value.get(ITEMS_KEY).unwrap().as_sequence().unwrap().len(), 3);
        assert_eq!(value.get(TRUNCATED_KEY), Some(&Value::Bool(true)));
        let msg = value.get(TRUNCATION_MESSAGE_KEY).unwrap().as_str().unwrap();
        assert!(msg.contains("from 5 to 3"));
    }

    #[test]
    fn test_next_offset_points_at_first_dropped_item() {
        let mut value = list(10);
        halve_items(&mut value).unwrap();
        // page 2 of 10 starts at offset 10; 5 items kept
        assert_eq!(value.get("nextOffset"), Some(&Value::Integer(15)));
        assert_eq!(value.get("hasMore"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_last_page_gains_next_offset() {
        let mut value = list(4);
        let map = value.as_mapping_mut().unwrap();
        map.insert("hasMore".to_string(), Value::Bool(false));
        map.shift_remove("nextOffset");

        halve_items(&mut value).unwrap();
        assert_eq!(value.get("hasMore"), Some(&Value::Bool(true)));
        assert_eq!(value.get("nextOffset"), Some(&Value::Integer(12)));
    }

    #[test]
    fn test_single_item_kept() {
        let mut value = list(1);
        let t = halve_items(&mut value).unwrap();
        assert_eq!(t.kept, 1);
        assert_eq!(value.get("nextOffset"), Some(&Value::Integer(20)));
    }

    #[test]
    fn test_not_a_list() {
        let mut value = Value::from("plain");
        assert!(halve_items(&mut value).is_none());

        let mut value = list(4);
        value
            .as_mapping_mut()
            .unwrap()
            .insert(ITEMS_KEY.to_string(), Value::from("not a sequence"));
        assert!(halve_items(&mut value).is_none());
        assert!(value.get(TRUNCATED_KEY).is_none());
    }

    #[test]
    fn test_record_with_items_field_untouched() {
        let mut map = Mapping::new();
        map.insert("id".to_string(), Value::from("order1"));
        map.insert(
            ITEMS_KEY.to_string(),
            Value::Sequence((0..10).map(|i| Value::from(i as i64)).collect()),
        );
        let mut value = Value::Mapping(map);
        let before = value.clone();

        assert!(halve_items(&mut value).is_none());
        assert_eq!(value, before);
    }
}
