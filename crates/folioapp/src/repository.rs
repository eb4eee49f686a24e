//! # Page Repository
//!
//! The one component in folio with real invariants. It mediates every write
//! to page content and the revision log, owns the draft lifecycle, and hands
//! out template blocks without letting a request escape the blocks directory.
//!
//! ## Content Updates
//!
//! [`PageRepository::update_page_content`] performs two whole-document
//! read-modify-write cycles, in this order:
//!
//! 1. **Pages**: load the collection, replace `content` and `last_modified` on
//!    the matching record, write the collection back.
//! 2. **History**: load the log, append the page entry (cap 20) and a
//!    synthetic sitemap entry under `__system__` (cap 50), write the log back.
//!
//! If step 1 fails, step 2 never runs. If step 2 fails, step 1 is **not**
//! rolled back: the page holds the new content while the log has no entry for
//! it, and the caller gets a storage error. This divergence is the behavior
//! web handlers have always observed; adding a rollback would change it.
//!
//! ## Concurrency
//!
//! There is no locking and no version check. Two requests updating the same
//! page can both read the same collection, and the later write silently
//! discards the earlier one (lost update). History appends and drafts have the
//! same last-writer-wins behavior. Callers must not assume atomicity across
//! concurrent writers.
//!
//! ## Drafts
//!
//! One `{content, timestamp}` document per page. Saving overwrites, loading a
//! missing or corrupt draft yields the zero draft, deleting a missing draft is
//! a no-op. Absence is the normal state, not an error.

use crate::blocks::BlockLibrary;
use crate::config::FolioConfig;
use crate::error::{FolioError, Result};
use crate::history::{self, HistoryLog, SYSTEM_KEY};
use crate::model::{record_id, validate_page_id, Draft, HistoryEntry, Page, PageUpdate};
use crate::store::{FsBackend, StorageBackend};
use chrono::Utc;
use log::{error, info, warn};
use serde_json::Value;
use std::path::{Path, PathBuf};

pub struct PageRepository<B: StorageBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
    pages_file: PathBuf,
    history_file: PathBuf,
    drafts_dir: PathBuf,
    blocks: BlockLibrary,
    history_limit: usize,
    system_history_limit: usize,
}

impl PageRepository<FsBackend> {
    /// Repository over the filesystem locations named in `config`.
    pub fn open(config: &FolioConfig) -> Self {
        Self::with_backend(FsBackend::new(), config)
    }
}

impl<B: StorageBackend> PageRepository<B> {
    pub fn with_backend(backend: B, config: &FolioConfig) -> Self {
        Self {
            backend,
            pages_file: config.pages_path(),
            history_file: config.history_path(),
            drafts_dir: config.drafts_path(),
            blocks: BlockLibrary::new(config.blocks_path(), &config.block_ext()),
            history_limit: config.history_limit.max(1),
            system_history_limit: config.system_history_limit.max(1),
        }
    }

    pub fn pages_file(&self) -> &Path {
        &self.pages_file
    }

    pub fn history_file(&self) -> &Path {
        &self.history_file
    }

    pub fn draft_path(&self, page_id: u64) -> PathBuf {
        self.drafts_dir.join(format!("{}.json", page_id))
    }

    /// Replace a page's content and record the change in the history log.
    pub fn update_page_content(
        &self,
        page_id: i64,
        content: &str,
        username: &str,
    ) -> Result<PageUpdate> {
        let id = validate_page_id(page_id)?;

        let mut pages = match self.backend.read_json(&self.pages_file) {
            Some(Value::Array(pages)) => pages,
            _ => Vec::new(),
        };

        let record = pages
            .iter_mut()
            .find(|record| record.is_object() && record_id(record) == Some(id))
            .ok_or(FolioError::PageNotFound(id))?;

        let previous_content = record
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let timestamp = Utc::now().timestamp();

        if let Some(fields) = record.as_object_mut() {
            fields.insert("content".to_string(), Value::String(content.to_string()));
            fields.insert("last_modified".to_string(), Value::from(timestamp));
        }
        let page: Page = serde_json::from_value(record.clone())?;

        if let Err(err) = self
            .backend
            .write_json(&self.pages_file, &Value::Array(pages))
        {
            error!(
                "event=page_update module=repository status=error stage=pages page_id={} error={}",
                id, err
            );
            return Err(err);
        }

        let history_entry = history::page_entry(id, username, &previous_content, content, timestamp);
        if let Err(err) = self.append_history(&history_entry) {
            error!(
                "event=page_update module=repository status=diverged stage=history page_id={} error={}",
                id, err
            );
            return Err(err);
        }

        info!(
            "event=page_update module=repository status=ok page_id={} user={}",
            id, username
        );

        Ok(PageUpdate {
            page,
            history_entry,
            timestamp,
            previous_content,
        })
    }

    fn append_history(&self, entry: &HistoryEntry) -> Result<()> {
        let mut log = HistoryLog::from_document(self.backend.read_json(&self.history_file));
        log.append(&HistoryLog::page_key(entry.page_id), entry, self.history_limit)?;
        log.append(
            SYSTEM_KEY,
            &history::sitemap_entry(entry.page_id, entry.time),
            self.system_history_limit,
        )?;
        self.backend
            .write_json(&self.history_file, &log.into_document())
    }

    /// Store an autosave snapshot, replacing any earlier one.
    pub fn save_draft(&self, page_id: i64, content: &str, timestamp: Option<i64>) -> Result<()> {
        let id = validate_page_id(page_id)?;
        let draft = Draft {
            content: content.to_string(),
            timestamp: timestamp.unwrap_or_else(|| Utc::now().timestamp()),
        };

        self.backend.ensure_dir(&self.drafts_dir)?;
        self.backend
            .write_json(&self.draft_path(id), &serde_json::to_value(&draft)?)?;

        info!(
            "event=draft_save module=repository status=ok page_id={} timestamp={}",
            id, draft.timestamp
        );
        Ok(())
    }

    /// The saved draft, or the zero draft if there is none.
    pub fn load_draft(&self, page_id: i64) -> Result<Draft> {
        let id = validate_page_id(page_id)?;
        let Some(raw) = self.backend.read_json(&self.draft_path(id)) else {
            return Ok(Draft::default());
        };

        match serde_json::from_value(raw) {
            Ok(draft) => Ok(draft),
            Err(err) => {
                warn!(
                    "event=draft_load module=repository status=corrupt page_id={} error={}",
                    id, err
                );
                Ok(Draft::default())
            }
        }
    }

    pub fn delete_draft(&self, page_id: i64) -> Result<()> {
        let id = validate_page_id(page_id)?;
        self.backend.remove_file(&self.draft_path(id))
    }

    /// Up to `limit` most recent entries for a page, oldest first.
    /// A missing or non-positive limit means the per-page cap.
    pub fn get_history(&self, page_id: i64, limit: Option<i64>) -> Result<Vec<HistoryEntry>> {
        let id = validate_page_id(page_id)?;
        let limit = effective_limit(limit, self.history_limit);
        Ok(self.history_log().recent(&HistoryLog::page_key(id), limit))
    }

    /// Up to `limit` most recent synthetic system entries, oldest first.
    pub fn get_system_history(&self, limit: Option<i64>) -> Vec<HistoryEntry> {
        let limit = effective_limit(limit, self.system_history_limit);
        self.history_log().recent(SYSTEM_KEY, limit)
    }

    fn history_log(&self) -> HistoryLog {
        HistoryLog::from_document(self.backend.read_json_cached(&self.history_file))
    }

    pub fn list_blocks(&self) -> Vec<String> {
        self.blocks.list()
    }

    pub fn load_block(&self, name: &str) -> Result<String> {
        self.blocks.load(name)
    }
}

fn effective_limit(limit: Option<i64>, default: usize) -> usize {
    match limit {
        Some(n) if n > 0 => usize::try_from(n).unwrap_or(usize::MAX),
        _ => default,
    }
}
