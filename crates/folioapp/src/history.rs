//! # Revision History
//!
//! The history document is a single JSON object:
//!
//! ```text
//! {
//!   "7":          [ {entry}, {entry}, ... ],   // per page, newest last, max 20
//!   "12":         [ ... ],
//!   "__system__": [ ... ]                      // synthetic entries, max 50
//! }
//! ```
//!
//! Lists are append-only. When a list grows past its cap the oldest entries
//! are dropped from the front (FIFO truncation, O(n) per append).
//!
//! ## Change Statistics
//!
//! Page entries describe a content change by comparing the *visible text* of
//! the old and new HTML: tags and comments are stripped before counting.
//!
//! ```text
//! Words: 1 → 2 (+1)
//! Characters: 5 → 11 (+6)
//! ```
//!
//! The signed annotation is omitted when nothing changed.

use crate::error::Result;
use crate::model::{HistoryContext, HistoryEntry};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Key of the synthetic system log inside the history document.
pub const SYSTEM_KEY: &str = "__system__";

pub const PAGE_UPDATE_ACTION: &str = "Updated page content";
pub const SITEMAP_ACTION: &str = "Regenerated sitemap";
pub const SYSTEM_USER: &str = "system";

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->|<[^>]*>").expect("tag pattern is valid"));

/// Removes HTML comments and tags, leaving the text between them.
pub fn strip_tags(html: &str) -> Cow<'_, str> {
    TAG_PATTERN.replace_all(html, "")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentStats {
    pub words: usize,
    pub chars: usize,
}

impl ContentStats {
    pub fn of_html(html: &str) -> Self {
        let text = strip_tags(html);
        Self {
            words: text.split_whitespace().count(),
            chars: text.chars().count(),
        }
    }
}

/// `+N`, `-N`, or an empty string for no change.
pub fn format_delta(old: usize, new: usize) -> String {
    let delta = new as i64 - old as i64;
    match delta {
        0 => String::new(),
        d if d > 0 => format!("+{}", d),
        d => d.to_string(),
    }
}

fn change_line(label: &str, old: usize, new: usize) -> String {
    let delta = format_delta(old, new);
    if delta.is_empty() {
        format!("{}: {} → {}", label, old, new)
    } else {
        format!("{}: {} → {} ({})", label, old, new, delta)
    }
}

/// Builds the entry recorded when a page's content is replaced.
pub fn page_entry(
    page_id: u64,
    user: &str,
    previous: &str,
    current: &str,
    time: i64,
) -> HistoryEntry {
    let before = ContentStats::of_html(previous);
    let after = ContentStats::of_html(current);

    HistoryEntry {
        time,
        user: user.to_string(),
        action: PAGE_UPDATE_ACTION.to_string(),
        details: vec![
            change_line("Words", before.words, after.words),
            change_line("Characters", before.chars, after.chars),
        ],
        context: HistoryContext::Page,
        page_id,
        extra: Map::new(),
    }
}

/// Builds the synthetic entry for the sitemap regeneration that follows
/// every content update.
pub fn sitemap_entry(page_id: u64, time: i64) -> HistoryEntry {
    HistoryEntry {
        time,
        user: SYSTEM_USER.to_string(),
        action: SITEMAP_ACTION.to_string(),
        details: vec![format!(
            "Sitemap regenerated automatically after update of page {}",
            page_id
        )],
        context: HistoryContext::System,
        page_id,
        extra: Map::new(),
    }
}

/// Pushes `entry` and drops the oldest elements until at most `cap` remain.
pub fn append_capped(list: &mut Vec<Value>, entry: Value, cap: usize) {
    list.push(entry);
    if list.len() > cap {
        let excess = list.len() - cap;
        list.drain(..excess);
    }
}

/// In-memory view of the history document.
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    lists: Map<String, Value>,
}

impl HistoryLog {
    /// Anything other than a JSON object is treated as an empty log.
    pub fn from_document(document: Option<Value>) -> Self {
        match document {
            Some(Value::Object(lists)) => Self { lists },
            Some(other) => {
                warn!(
                    "event=history_load module=history status=reset reason=not_an_object kind={}",
                    json_kind(&other)
                );
                Self::default()
            }
            None => Self::default(),
        }
    }

    pub fn page_key(page_id: u64) -> String {
        page_id.to_string()
    }

    /// Appends to the list under `key`. A malformed (non-array) list is
    /// replaced.
    pub fn append(&mut self, key: &str, entry: &HistoryEntry, cap: usize) -> Result<()> {
        let value = serde_json::to_value(entry)?;
        let slot = self
            .lists
            .entry(key.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if !slot.is_array() {
            warn!(
                "event=history_append module=history status=reset reason=not_an_array key={}",
                key
            );
            *slot = Value::Array(Vec::new());
        }
        if let Value::Array(list) = slot {
            append_capped(list, value, cap);
        }
        Ok(())
    }

    /// The last `limit` well-formed entries under `key`, oldest first.
    pub fn recent(&self, key: &str, limit: usize) -> Vec<HistoryEntry> {
        let Some(Value::Array(list)) = self.lists.get(key) else {
            return Vec::new();
        };
        let start = list.len().saturating_sub(limit);
        list[start..]
            .iter()
            .filter_map(|raw| match serde_json::from_value(raw.clone()) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!(
                        "event=history_read module=history status=skip key={} error={}",
                        key, err
                    );
                    None
                }
            })
            .collect()
    }

    /// Number of stored elements under `key`, malformed ones included.
    pub fn len(&self, key: &str) -> usize {
        match self.lists.get(key) {
            Some(Value::Array(list)) => list.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn into_document(self) -> Value {
        Value::Object(self.lists)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>Hello <b>world</b></p>"), "Hello world");
        assert_eq!(strip_tags("a<!-- hidden <b> -->b"), "ab");
        assert_eq!(strip_tags("<div\nclass=\"x\">y</div>"), "y");
        assert_eq!(strip_tags("plain"), "plain");
    }

    #[test]
    fn test_content_stats_ignore_markup() {
        let stats = ContentStats::of_html("<p>Hello world</p>");
        assert_eq!(stats, ContentStats { words: 2, chars: 11 });
        assert_eq!(ContentStats::of_html(""), ContentStats::default());
        assert_eq!(ContentStats::of_html("<p>héllo</p>").chars, 5);
    }

    #[test]
    fn test_format_delta() {
        assert_eq!(format_delta(1, 2), "+1");
        assert_eq!(format_delta(10, 4), "-6");
        assert_eq!(format_delta(3, 3), "");
    }

    #[test]
    fn test_page_entry_details() {
        let entry = page_entry(7, "alice", "<p>Hello</p>", "<p>Hello world</p>", 42);
        assert_eq!(entry.page_id, 7);
        assert_eq!(entry.user, "alice");
        assert_eq!(entry.time, 42);
        assert_eq!(entry.context, HistoryContext::Page);
        assert_eq!(
            entry.details,
            vec!["Words: 1 → 2 (+1)", "Characters: 5 → 11 (+6)"]
        );
    }

    #[test]
    fn test_page_entry_omits_zero_delta() {
        let entry = page_entry(1, "bob", "<p>same</p>", "<h1>same</h1>", 1);
        assert_eq!(entry.details, vec!["Words: 1 → 1", "Characters: 4 → 4"]);
    }

    #[test]
    fn test_sitemap_entry_is_system_context() {
        let entry = sitemap_entry(9, 5);
        assert_eq!(entry.context, HistoryContext::System);
        assert_eq!(entry.user, SYSTEM_USER);
        assert_eq!(entry.action, SITEMAP_ACTION);
        assert_eq!(entry.page_id, 9);
    }

    #[test]
    fn test_append_capped_evicts_oldest() {
        let mut list = Vec::new();
        for i in 0..5 {
            append_capped(&mut list, json!(i), 3);
        }
        assert_eq!(list, vec![json!(2), json!(3), json!(4)]);
    }

    #[test]
    fn test_log_from_non_object_is_empty() {
        assert!(HistoryLog::from_document(Some(json!([1, 2]))).is_empty());
        assert!(HistoryLog::from_document(None).is_empty());
    }

    #[test]
    fn test_append_replaces_malformed_list() {
        let mut log = HistoryLog::from_document(Some(json!({"4": "garbage"})));
        log.append("4", &sitemap_entry(4, 1), 20).unwrap();
        assert_eq!(log.len("4"), 1);
    }

    #[test]
    fn test_recent_skips_malformed_entries() {
        let good = serde_json::to_value(page_entry(2, "a", "", "x", 10)).unwrap();
        let log = HistoryLog::from_document(Some(json!({
            "2": [good.clone(), {"what": "ever"}, good]
        })));
        assert_eq!(log.len("2"), 3);
        assert_eq!(log.recent("2", 20).len(), 2);
        assert_eq!(log.recent("2", 1).len(), 1);
        assert!(log.recent("3", 20).is_empty());
    }
}
