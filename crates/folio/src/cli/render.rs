//! Terminal formatting. Every function returns a `String`; printing is the
//! caller's business.

use chrono::{DateTime, Utc};
use console::style;
use folioapp::model::{Draft, HistoryContext, HistoryEntry, PageUpdate};
use std::time::Duration;

fn relative_time(time: i64, now: i64) -> String {
    let elapsed = Duration::from_secs((now - time).max(0) as u64);
    timeago::Formatter::new().convert(elapsed)
}

fn absolute_time(time: i64) -> String {
    DateTime::<Utc>::from_timestamp(time, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| time.to_string())
}

pub fn render_update(update: &PageUpdate) -> String {
    let mut out = format!(
        "{} Page {} updated\n",
        style("✓").green(),
        style(update.page.id).bold()
    );
    for line in &update.history_entry.details {
        out.push_str(&format!("  {}\n", style(line).dim()));
    }
    out
}

pub fn render_draft(page_id: i64, draft: &Draft, now: i64) -> String {
    if draft.timestamp == 0 && draft.content.is_empty() {
        return format!("No draft saved for page {}\n", page_id);
    }
    let mut out = format!(
        "{} {}\n\n",
        style(format!("Draft for page {}", page_id)).bold(),
        style(format!(
            "saved {} ({})",
            relative_time(draft.timestamp, now),
            absolute_time(draft.timestamp)
        ))
        .dim()
    );
    out.push_str(&draft.content);
    if !draft.content.ends_with('\n') {
        out.push('\n');
    }
    out
}

pub fn render_history(entries: &[HistoryEntry], now: i64) -> String {
    if entries.is_empty() {
        return "No history recorded\n".to_string();
    }

    let mut out = String::new();
    // Newest first reads better in a terminal
    for entry in entries.iter().rev() {
        let marker = match entry.context {
            HistoryContext::Page => style("●").cyan(),
            HistoryContext::System => style("○").yellow(),
        };
        out.push_str(&format!(
            "{} {}  {}  {}\n",
            marker,
            style(relative_time(entry.time, now)).dim(),
            style(&entry.user).bold(),
            entry.action
        ));
        for line in &entry.details {
            out.push_str(&format!("    {}\n", style(line).dim()));
        }
    }
    out
}

pub fn render_blocks(names: &[String]) -> String {
    if names.is_empty() {
        return "No blocks found\n".to_string();
    }
    names.iter().map(|name| format!("{}\n", name)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use console::strip_ansi_codes;
    use folioapp::history::{page_entry, sitemap_entry};
    use folioapp::model::Page;
    use serde_json::Map;

    #[test]
    fn test_render_update_lists_details() {
        let entry = page_entry(7, "alice", "<p>Hello</p>", "<p>Hello world</p>", 100);
        let update = PageUpdate {
            page: Page {
                id: 7,
                content: "<p>Hello world</p>".to_string(),
                last_modified: 100,
                extra: Map::new(),
            },
            history_entry: entry,
            timestamp: 100,
            previous_content: "<p>Hello</p>".to_string(),
        };
        let out = strip_ansi_codes(&render_update(&update)).to_string();
        assert!(out.contains("Page 7 updated"));
        assert!(out.contains("Words: 1 → 2 (+1)"));
        assert!(out.contains("Characters: 5 → 11 (+6)"));
    }

    #[test]
    fn test_render_empty_draft() {
        assert_eq!(
            render_draft(3, &Draft::default(), 1000),
            "No draft saved for page 3\n"
        );
    }

    #[test]
    fn test_render_draft_shows_age_and_content() {
        let draft = Draft {
            content: "<p>wip</p>".to_string(),
            timestamp: 1_700_000_000,
        };
        let out = strip_ansi_codes(&render_draft(3, &draft, 1_700_000_000 + 120)).to_string();
        assert!(out.contains("Draft for page 3"));
        assert!(out.contains("2 minutes ago"));
        assert!(out.ends_with("<p>wip</p>\n"));
    }

    #[test]
    fn test_render_history_newest_first() {
        let entries = vec![
            page_entry(1, "first", "", "a", 10),
            sitemap_entry(1, 10),
            page_entry(1, "last", "a", "a b", 20),
        ];
        let out = strip_ansi_codes(&render_history(&entries, 20)).to_string();
        let last = out.find("last").unwrap();
        let first = out.find("first").unwrap();
        assert!(last < first);
        assert!(out.contains("system"));
    }

    #[test]
    fn test_render_blocks() {
        assert_eq!(render_blocks(&[]), "No blocks found\n");
        assert_eq!(
            render_blocks(&["a.html".to_string(), "b.html".to_string()]),
            "a.html\nb.html\n"
        );
    }
}
