//! Windowing of oversized result collections.
//!
//! List tools never hand an unbounded collection back to the caller. Anything
//! larger than the page bound is cut down to a [`Page`] carrying the `skip`
//! value for the next request.

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

/// Default message attached to a page.
pub const DEFAULT_REMAINING_MESSAGE: &str =
    "To see more items, please ask me to retrieve the next page.";

/// Options for [`summarize`].
#[derive(Debug, Clone)]
pub struct SummarizeOptions {
    /// Page bound
    pub max_items: usize,
    /// Message telling the caller how to get the next window
    pub remaining_message: String,
}

impl SummarizeOptions {
    /// Create options with the given bound and message.
    pub fn new(max_items: usize, remaining_message: impl Into<String>) -> Self {
        Self {
            max_items,
            remaining_message: remaining_message.into(),
        }
    }
}

impl Default for SummarizeOptions {
    fn default() -> Self {
        Self::new(3, DEFAULT_REMAINING_MESSAGE)
    }
}

/// A bounded window over a larger collection.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// At most `max_items` items
    pub items: Vec<JsonValue>,
    /// Size of the whole collection
    pub total: u64,
    /// Number of items in this window
    pub showing: u64,
    /// Items after this window
    pub remaining: u64,
    /// How to ask for more
    pub message: String,
    /// Offset of the next window
    pub skip: u64,
}

/// Window `data` down to `options.max_items`.
///
/// Accepts a bare array or a `{items, total}` envelope (an envelope's own
/// `skip` is honoured as the window offset). Collections within the bound and
/// non-collection values are returned unchanged.
pub fn summarize(data: JsonValue, options: &SummarizeOptions) -> JsonValue {
    match data {
        JsonValue::Array(items) => {
            if items.len() <= options.max_items {
                return JsonValue::Array(items);
            }
            let total = items.len() as u64;
            page(items, total, 0, options)
        }
        JsonValue::Object(envelope) if is_envelope(&envelope) => {
            let item_count = envelope
                .get("items")
                .and_then(|v| v.as_array())
                .map(|a| a.len())
                .unwrap_or(0);
            let total = envelope.get("total").and_then(|v| v.as_u64()).unwrap_or(item_count as u64);

            if item_count <= options.max_items && total <= options.max_items as u64 {
                return JsonValue::Object(envelope);
            }

            let offset = envelope.get("skip").and_then(|v| v.as_u64()).unwrap_or(0);
            let items = match envelope.get("items") {
                Some(JsonValue::Array(items)) => items.clone(),
                _ => Vec::new(),
            };
            page(items, total, offset, options)
        }
        other => other,
    }
}

fn is_envelope(obj: &Map<String, JsonValue>) -> bool {
    matches!(obj.get("items"), Some(JsonValue::Array(_))) && obj.contains_key("total")
}

fn page(mut items: Vec<JsonValue>, total: u64, offset: u64, options: &SummarizeOptions) -> JsonValue {
    items.truncate(options.max_items);
    let showing = items.len() as u64;
    let page = Page {
        items,
        total,
        showing,
        remaining: total.saturating_sub(offset + showing),
        message: options.remaining_message.clone(),
        skip: offset + showing,
    };
    serde_json::to_value(page).unwrap_or(JsonValue::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn numbers(n: usize) -> Vec<JsonValue> {
        (0..n).map(|i| json!(i)).collect()
    }

    #[test]
    fn test_small_array_is_identity() {
        for n in 0..=3 {
            let data = JsonValue::Array(numbers(n));
            assert_eq!(summarize(data.clone(), &SummarizeOptions::default()), data);
        }
    }

    #[test]
    fn test_small_envelope_is_identity() {
        let data = json!({"items": [1, 2], "total": 2, "skip": 0, "limit": 3, "sys": {"type": "Array"}});
        assert_eq!(summarize(data.clone(), &SummarizeOptions::default()), data);
    }

    #[test]
    fn test_large_array_is_paged() {
        let result = summarize(JsonValue::Array(numbers(7)), &SummarizeOptions::new(3, "more"));
        assert_eq!(result["items"], json!([0, 1, 2]));
        assert_eq!(result["total"], 7);
        assert_eq!(result["showing"], 3);
        assert_eq!(result["remaining"], 4);
        assert_eq!(result["skip"], 3);
        assert_eq!(result["message"], "more");
    }

    #[test]
    fn test_paged_counts_add_up() {
        for n in 4..20 {
            let result = summarize(JsonValue::Array(numbers(n)), &SummarizeOptions::default());
            let showing = result["showing"].as_u64().unwrap();
            let remaining = result["remaining"].as_u64().unwrap();
            assert_eq!(showing + remaining, result["total"].as_u64().unwrap());
            assert_eq!(result["skip"].as_u64().unwrap(), showing);
        }
    }

    #[test]
    fn test_envelope_with_larger_total_is_paged() {
        let data = json!({"items": [1, 2, 3], "total": 5, "skip": 0, "limit": 3});
        let result = summarize(data, &SummarizeOptions::default());
        assert_eq!(result["items"].as_array().unwrap().len(), 3);
        assert_eq!(result["total"], 5);
        assert_eq!(result["remaining"], 2);
        assert_eq!(result["skip"], 3);
    }

    #[test]
    fn test_envelope_offset_advances_skip() {
        let data = json!({"items": [4, 5], "total": 5, "skip": 3, "limit": 3});
        let result = summarize(data, &SummarizeOptions::default());
        assert_eq!(result["showing"], 2);
        assert_eq!(result["remaining"], 0);
        assert_eq!(result["skip"], 5);
    }

    #[test]
    fn test_oversized_envelope_items_truncated() {
        let data = json!({"items": numbers(6), "total": 6});
        let result = summarize(data, &SummarizeOptions::default());
        assert_eq!(result["items"], json!([0, 1, 2]));
        assert_eq!(result["remaining"], 3);
    }

    #[test]
    fn test_non_collections_pass_through() {
        let data = json!({"sys": {"id": "x"}, "fields": {}});
        assert_eq!(summarize(data.clone(), &SummarizeOptions::default()), data);
        assert_eq!(summarize(json!("text"), &SummarizeOptions::default()), json!("text"));
    }
}
