use crate::error::Result;
use serde_json::Value;
use std::path::Path;

/// Abstract interface for raw document I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while `PageRepository` handles the "what" (pages, history, drafts).
pub trait StorageBackend {
    /// Read and parse a JSON document.
    /// Returns None if the document is missing, unreadable or not valid JSON.
    fn read_json(&self, path: &Path) -> Option<Value>;

    /// Same contract as `read_json`, but may be served from a cache.
    fn read_json_cached(&self, path: &Path) -> Option<Value>;

    /// Replace the document at `path` with `data`.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn write_json(&self, path: &Path, data: &Value) -> Result<()>;

    /// Create a directory and its parents if missing.
    fn ensure_dir(&self, path: &Path) -> Result<()>;

    /// Remove a document. Absent documents are not an error.
    fn remove_file(&self, path: &Path) -> Result<()>;
}
