use super::backend::StorageBackend;
use crate::error::{FolioError, Result};
use log::{debug, warn};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use uuid::Uuid;

/// File metadata the cached copy was taken at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    modified: Option<SystemTime>,
    len: u64,
}

impl Fingerprint {
    fn of(path: &Path) -> Option<Self> {
        let meta = fs::metadata(path).ok()?;
        Some(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

struct CachedDocument {
    fingerprint: Fingerprint,
    value: Value,
}

/// Filesystem backend.
///
/// The cache uses `RefCell` since folio is single-threaded per request;
/// `FsBackend` is therefore not `Sync`, and each request should own one.
#[derive(Default)]
pub struct FsBackend {
    cache: RefCell<HashMap<PathBuf, CachedDocument>>,
}

impl FsBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn tmp_path(path: &Path) -> PathBuf {
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        path.with_file_name(format!(".{}-{}.tmp", name, Uuid::new_v4()))
    }
}

impl StorageBackend for FsBackend {
    fn read_json(&self, path: &Path) -> Option<Value> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(
                    "event=json_read module=store status=missing path={}",
                    path.display()
                );
                return None;
            }
            Err(err) => {
                warn!(
                    "event=json_read module=store status=error path={} error={}",
                    path.display(),
                    err
                );
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(
                    "event=json_read module=store status=corrupt path={} error={}",
                    path.display(),
                    err
                );
                None
            }
        }
    }

    fn read_json_cached(&self, path: &Path) -> Option<Value> {
        let Some(fingerprint) = Fingerprint::of(path) else {
            self.cache.borrow_mut().remove(path);
            return None;
        };

        if let Some(cached) = self.cache.borrow().get(path) {
            if cached.fingerprint == fingerprint {
                return Some(cached.value.clone());
            }
        }

        let value = self.read_json(path)?;
        self.cache.borrow_mut().insert(
            path.to_path_buf(),
            CachedDocument {
                fingerprint,
                value: value.clone(),
            },
        );
        Some(value)
    }

    fn write_json(&self, path: &Path, data: &Value) -> Result<()> {
        let content = serde_json::to_string_pretty(data).map_err(FolioError::Serialization)?;

        // Atomic write
        let tmp_path = Self::tmp_path(path);
        fs::write(&tmp_path, content).map_err(FolioError::Io)?;
        if let Err(err) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(FolioError::Io(err));
        }

        let mut cache = self.cache.borrow_mut();
        match Fingerprint::of(path) {
            Some(fingerprint) => {
                cache.insert(
                    path.to_path_buf(),
                    CachedDocument {
                        fingerprint,
                        value: data.clone(),
                    },
                );
            }
            None => {
                cache.remove(path);
            }
        }
        Ok(())
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.is_dir() {
            fs::create_dir_all(path).map_err(|e| {
                FolioError::Storage(format!(
                    "could not create directory {}: {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.cache.borrow_mut().remove(path);
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(FolioError::Io(err)),
        }
    }
}
