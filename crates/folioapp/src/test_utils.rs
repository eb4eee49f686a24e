use crate::config::FolioConfig;
use crate::repository::PageRepository;
use crate::store::FsBackend;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A throwaway data root with a filesystem-backed repository.
pub struct TestEnv {
    // We keep _temp_dir to ensure the directory is not dropped until the test is done
    pub _temp_dir: TempDir,
    pub config: FolioConfig,
    pub repo: PageRepository<FsBackend>,
    pub root: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let config = FolioConfig::with_data_dir(&root);
        let repo = PageRepository::open(&config);
        Self {
            _temp_dir: temp_dir,
            config,
            repo,
            root,
        }
    }

    pub fn write_pages(&self, pages: &Value) {
        let text = serde_json::to_string_pretty(pages).expect("pages serialize");
        fs::write(self.config.pages_path(), text).expect("failed to write pages");
    }

    pub fn read_pages(&self) -> Value {
        let text = fs::read_to_string(self.config.pages_path()).expect("failed to read pages");
        serde_json::from_str(&text).expect("pages are valid JSON")
    }

    pub fn write_block(&self, name: &str, content: &str) -> PathBuf {
        let dir = self.config.blocks_path();
        fs::create_dir_all(&dir).expect("failed to create blocks dir");
        let path = dir.join(name);
        fs::write(&path, content).expect("failed to write block");
        path
    }
}
