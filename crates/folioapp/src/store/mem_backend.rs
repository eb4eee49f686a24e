use super::backend::StorageBackend;
use crate::error::{FolioError, Result};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// In-memory storage backend for testing.
///
/// Documents are kept as serialized text so tests can plant corrupt JSON.
/// Uses `RefCell` for interior mutability since folio is single-threaded.
#[derive(Default)]
pub struct MemBackend {
    files: RefCell<HashMap<PathBuf, String>>,
    dirs: RefCell<HashSet<PathBuf>>,
    failing_paths: RefCell<HashSet<PathBuf>>,
    simulate_write_error: RefCell<bool>,
    writes: RefCell<Vec<PathBuf>>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write and directory creation fail.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Make writes to one path fail while everything else succeeds.
    pub fn fail_writes_to(&self, path: impl Into<PathBuf>) {
        self.failing_paths.borrow_mut().insert(path.into());
    }

    /// Store raw text, bypassing serialization.
    pub fn insert_raw(&self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.files.borrow_mut().insert(path.into(), text.into());
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    pub fn has_dir(&self, path: &Path) -> bool {
        self.dirs.borrow().contains(path)
    }

    /// Paths written so far, in order.
    pub fn writes(&self) -> Vec<PathBuf> {
        self.writes.borrow().clone()
    }

    fn check_writable(&self, path: &Path) -> Result<()> {
        if *self.simulate_write_error.borrow() || self.failing_paths.borrow().contains(path) {
            return Err(FolioError::Storage(format!(
                "Simulated write error: {}",
                path.display()
            )));
        }
        Ok(())
    }
}

impl StorageBackend for MemBackend {
    fn read_json(&self, path: &Path) -> Option<Value> {
        let files = self.files.borrow();
        serde_json::from_str(files.get(path)?).ok()
    }

    fn read_json_cached(&self, path: &Path) -> Option<Value> {
        self.read_json(path)
    }

    fn write_json(&self, path: &Path, data: &Value) -> Result<()> {
        self.check_writable(path)?;
        let text = serde_json::to_string_pretty(data)?;
        self.files.borrow_mut().insert(path.to_path_buf(), text);
        self.writes.borrow_mut().push(path.to_path_buf());
        Ok(())
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        self.check_writable(path)?;
        self.dirs.borrow_mut().insert(path.to_path_buf());
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.files.borrow_mut().remove(path);
        Ok(())
    }
}
