//! # Domain Model
//!
//! Records as they live in the JSON documents on disk.
//!
//! - [`Page`]: one element of the page collection array. Only `id`, `content`
//!   and `last_modified` mean anything to folio; every other field (title,
//!   slug, template, ...) belongs to the templating layer and is carried in
//!   [`Page::extra`] untouched.
//! - [`HistoryEntry`]: one audit record. Page entries and the synthetic
//!   system entries share the same shape and differ by [`HistoryContext`].
//! - [`Draft`]: the autosaved, unpublished state of a page editor.
//!
//! Page ids are positive integers. Legacy collections sometimes store them as
//! numeric strings (`"id": "7"`) or whole floats (`"id": 7.0`), so
//! [`record_id`] and the `Page` deserializer accept those too.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FolioError, Result};

/// Checks that a caller-supplied page id is a positive integer.
pub fn validate_page_id(page_id: i64) -> Result<u64> {
    if page_id > 0 {
        Ok(page_id as u64)
    } else {
        Err(FolioError::InvalidPageId(page_id))
    }
}

/// Extracts the id of a raw page record, if it has a usable one.
pub fn record_id(record: &Value) -> Option<u64> {
    id_value(record.get("id")?)
}

fn id_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f < u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    id_value(&value).ok_or_else(|| de::Error::custom(format!("invalid page id: {}", value)))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(deserialize_with = "lenient_id")]
    pub id: u64,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub last_modified: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryContext {
    Page,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unix timestamp of the change.
    pub time: i64,
    pub user: String,
    pub action: String,
    #[serde(default)]
    pub details: Vec<String>,
    pub context: HistoryContext,
    #[serde(default)]
    pub page_id: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub content: String,
    pub timestamp: i64,
}

/// Outcome of a content update, handed back so callers can diff or undo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageUpdate {
    pub page: Page,
    pub history_entry: HistoryEntry,
    pub timestamp: i64,
    pub previous_content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_page_id() {
        assert_eq!(validate_page_id(7).unwrap(), 7);
        assert!(matches!(
            validate_page_id(0),
            Err(FolioError::InvalidPageId(0))
        ));
        assert!(matches!(
            validate_page_id(-3),
            Err(FolioError::InvalidPageId(-3))
        ));
    }

    #[test]
    fn test_record_id_accepts_numeric_strings_and_whole_floats() {
        assert_eq!(record_id(&json!({"id": 4})), Some(4));
        assert_eq!(record_id(&json!({"id": "12"})), Some(12));
        assert_eq!(record_id(&json!({"id": "home"})), None);
        assert_eq!(record_id(&json!({"id": 7.0})), Some(7));
        assert_eq!(record_id(&json!({"id": 7.5})), None);
        assert_eq!(record_id(&json!({"id": -3.0})), None);
        assert_eq!(record_id(&json!({"title": "no id"})), None);
        assert_eq!(record_id(&json!("not a record")), None);
    }

    #[test]
    fn test_page_keeps_unknown_fields_in_order() {
        let raw = json!({
            "id": "3",
            "title": "About",
            "slug": "about",
            "content": "<p>Hi</p>",
            "last_modified": 100,
            "template": "default"
        });
        let page: Page = serde_json::from_value(raw).unwrap();
        assert_eq!(page.id, 3);
        assert_eq!(page.content, "<p>Hi</p>");
        let keys: Vec<&str> = page.extra.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["title", "slug", "template"]);
    }

    #[test]
    fn test_history_entry_wire_format() {
        let entry = HistoryEntry {
            time: 1_700_000_000,
            user: "alice".to_string(),
            action: "Updated page content".to_string(),
            details: vec!["Words: 1 → 2 (+1)".to_string()],
            context: HistoryContext::Page,
            page_id: 7,
            extra: Map::new(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["context"], "page");
        assert_eq!(value["page_id"], 7);
        assert_eq!(value["details"][0], "Words: 1 → 2 (+1)");
    }
}
