//! # Configuration
//!
//! Folio configuration is a [`confique`] struct, loaded in priority order:
//! 1. **Environment variables**: `FOLIO_DATA_DIR`, `FOLIO_PAGES_FILE`, etc.
//! 2. **Config file**: a TOML file passed by the caller (e.g. `folio.toml`).
//! 3. **Compiled defaults**: `#[config(default = ...)]` values below.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `data_dir` | `.` | Root that relative paths resolve against |
//! | `pages_file` | `pages.json` | Page collection (JSON array) |
//! | `history_file` | `history.json` | History log (JSON object keyed by page id) |
//! | `drafts_dir` | `drafts` | One `<id>.json` draft per page |
//! | `blocks_dir` | `blocks` | Template fragments |
//! | `block_ext` | `.html` | Extension listed by `list_blocks` |
//! | `history_limit` | `20` | Entries kept per page |
//! | `system_history_limit` | `50` | Entries kept in the `__system__` log |

use crate::error::{FolioError, Result};
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a folio data root, stored in `folio.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FolioConfig {
    #[config(env = "FOLIO_DATA_DIR", default = ".")]
    pub data_dir: PathBuf,

    #[config(env = "FOLIO_PAGES_FILE", default = "pages.json")]
    pub pages_file: PathBuf,

    #[config(env = "FOLIO_HISTORY_FILE", default = "history.json")]
    pub history_file: PathBuf,

    #[config(env = "FOLIO_DRAFTS_DIR", default = "drafts")]
    pub drafts_dir: PathBuf,

    #[config(env = "FOLIO_BLOCKS_DIR", default = "blocks")]
    pub blocks_dir: PathBuf,

    /// Extension of block files (e.g. ".html", ".php")
    #[config(env = "FOLIO_BLOCK_EXT", default = ".html")]
    pub block_ext: String,

    #[config(default = 20)]
    pub history_limit: usize,

    #[config(default = 50)]
    pub system_history_limit: usize,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            pages_file: PathBuf::from("pages.json"),
            history_file: PathBuf::from("history.json"),
            drafts_dir: PathBuf::from("drafts"),
            blocks_dir: PathBuf::from("blocks"),
            block_ext: ".html".to_string(),
            history_limit: 20,
            system_history_limit: 50,
        }
    }
}

impl FolioConfig {
    /// Defaults rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Layers the environment over an optional TOML file over the defaults.
    /// A file that does not exist is skipped.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = file {
            builder = builder.file(path);
        }
        builder
            .load()
            .map_err(|e| FolioError::Config(e.to_string()))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        // join() keeps absolute paths as they are
        self.data_dir.join(path)
    }

    pub fn pages_path(&self) -> PathBuf {
        self.resolve(&self.pages_file)
    }

    pub fn history_path(&self) -> PathBuf {
        self.resolve(&self.history_file)
    }

    pub fn drafts_path(&self) -> PathBuf {
        self.resolve(&self.drafts_dir)
    }

    pub fn blocks_path(&self) -> PathBuf {
        self.resolve(&self.blocks_dir)
    }

    /// Block extension, normalized to start with a dot.
    pub fn block_ext(&self) -> String {
        if self.block_ext.starts_with('.') {
            self.block_ext.clone()
        } else {
            format!(".{}", self.block_ext)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = FolioConfig::default();
        assert_eq!(config.pages_path(), PathBuf::from("./pages.json"));
        assert_eq!(config.history_limit, 20);
        assert_eq!(config.system_history_limit, 50);
        assert_eq!(config.block_ext(), ".html");
    }

    #[test]
    fn test_paths_resolve_against_data_dir() {
        let config = FolioConfig::with_data_dir("/srv/site");
        assert_eq!(config.pages_path(), PathBuf::from("/srv/site/pages.json"));
        assert_eq!(config.drafts_path(), PathBuf::from("/srv/site/drafts"));
        assert_eq!(config.blocks_path(), PathBuf::from("/srv/site/blocks"));
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let config = FolioConfig {
            history_file: PathBuf::from("/var/log/folio/history.json"),
            ..FolioConfig::with_data_dir("/srv/site")
        };
        assert_eq!(
            config.history_path(),
            PathBuf::from("/var/log/folio/history.json")
        );
    }

    #[test]
    fn test_block_ext_normalization_without_dot() {
        let config = FolioConfig {
            block_ext: "php".to_string(),
            ..Default::default()
        };
        assert_eq!(config.block_ext(), ".php");
    }

    #[test]
    fn test_load_reads_toml_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("folio.toml");
        fs::write(
            &file,
            "data_dir = \"/srv/site\"\nblock_ext = \".php\"\nhistory_limit = 5\n",
        )
        .unwrap();

        let config = FolioConfig::load(Some(&file)).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/site"));
        assert_eq!(config.block_ext, ".php");
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.system_history_limit, 50);
    }
}
