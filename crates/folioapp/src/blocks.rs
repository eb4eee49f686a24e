//! # Blocks
//!
//! Blocks are reusable template fragments, one file each in a flat directory.
//! The filename is the public identifier, which makes [`BlockLibrary::load`]
//! an obvious traversal target: names arrive straight from HTTP requests.
//!
//! ## Sandboxing
//!
//! Loading always **resolves first, then checks containment**:
//!
//! 1. Canonicalize the blocks directory (follows symlinks). Failure is a
//!    storage error: the site is misconfigured.
//! 2. Join the requested name and canonicalize the result. This collapses
//!    `..` components and follows symlinks. Failure (including a missing file)
//!    is `NotFound`.
//! 3. Require the canonical file path to sit under the canonical directory,
//!    compared component-wise, and to be a regular file.
//!
//! Checking containment on the unresolved path would let a symlink inside the
//! directory point anywhere, so the order matters. Listing applies the same
//! rule, so every listed name is loadable.
//!
//! Block content is served as text. Files that are not valid UTF-8 (legacy
//! Latin-1 templates) are decoded lossily, with invalid bytes replaced by
//! U+FFFD, and a warning is logged.

use crate::error::{FolioError, Result};
use log::{debug, error, warn};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct BlockLibrary {
    dir: PathBuf,
    ext: String,
}

impl BlockLibrary {
    pub fn new(dir: impl Into<PathBuf>, ext: &str) -> Self {
        let ext = if ext.starts_with('.') {
            ext.to_string()
        } else {
            format!(".{}", ext)
        };
        Self {
            dir: dir.into(),
            ext,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Basenames of block files, sorted by byte order.
    /// An absent or unreadable directory lists as empty, and entries that
    /// would not load (symlinks leaving the directory) are skipped.
    pub fn list(&self) -> Vec<String> {
        let listing = self
            .canonical_root()
            .and_then(|root| Ok((fs::read_dir(&self.dir)?, root)));
        let (entries, root) = match listing {
            Ok(listing) => listing,
            Err(err) => {
                debug!(
                    "event=blocks_list module=blocks status=empty path={} error={}",
                    self.dir.display(),
                    err
                );
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.len() > self.ext.len() && name.ends_with(&self.ext))
            .filter(|name| Self::contained(&root, name).is_some())
            .collect();
        names.sort();
        names
    }

    /// Raw text of a block, confined to the blocks directory.
    pub fn load(&self, name: &str) -> Result<String> {
        let path = self.resolve(name)?;
        let bytes = fs::read(&path).map_err(|err| {
            error!(
                "event=block_load module=blocks status=error path={} error={}",
                path.display(),
                err
            );
            FolioError::Io(err)
        })?;

        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(err) => {
                warn!(
                    "event=block_load module=blocks status=lossy path={} valid_up_to={}",
                    path.display(),
                    err.utf8_error().valid_up_to()
                );
                Ok(String::from_utf8_lossy(err.as_bytes()).into_owned())
            }
        }
    }

    /// Canonical path of a block inside the directory.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        if name.trim().is_empty() {
            return Err(FolioError::EmptyBlockName);
        }

        let root = self.canonical_root()?;
        Self::contained(&root, name).ok_or_else(|| {
            debug!(
                "event=block_load module=blocks status=rejected name={:?}",
                name
            );
            FolioError::BlockNotFound(name.to_string())
        })
    }

    fn canonical_root(&self) -> Result<PathBuf> {
        fs::canonicalize(&self.dir).map_err(|err| {
            FolioError::Storage(format!(
                "blocks directory {} is not accessible: {}",
                self.dir.display(),
                err
            ))
        })
    }

    /// `name` resolved under `root`, if it lands on a regular file strictly
    /// inside it.
    fn contained(root: &Path, name: &str) -> Option<PathBuf> {
        let resolved = fs::canonicalize(root.join(name)).ok()?;
        if resolved == root || !resolved.starts_with(root) {
            warn!(
                "event=block_resolve module=blocks status=rejected reason=outside_root name={:?}",
                name
            );
            return None;
        }
        resolved.is_file().then_some(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn library_with(files: &[(&str, &str)]) -> (tempfile::TempDir, BlockLibrary) {
        let dir = tempdir().unwrap();
        let blocks = dir.path().join("blocks");
        fs::create_dir_all(&blocks).unwrap();
        for (name, content) in files {
            fs::write(blocks.join(name), content).unwrap();
        }
        (dir, BlockLibrary::new(blocks, "html"))
    }

    #[test]
    fn test_list_filters_extension_and_sorts_bytewise() {
        let (_dir, library) = library_with(&[
            ("hero.html", ""),
            ("Zebra.html", ""),
            ("about.html", ""),
            ("notes.txt", ""),
            (".html", ""),
        ]);
        fs::create_dir(library.dir().join("nested.html")).unwrap();

        // Uppercase sorts before lowercase in byte order
        assert_eq!(library.list(), vec!["Zebra.html", "about.html", "hero.html"]);
    }

    #[test]
    fn test_list_missing_directory_is_empty() {
        let dir = tempdir().unwrap();
        let library = BlockLibrary::new(dir.path().join("absent"), ".html");
        assert!(library.list().is_empty());
    }

    #[test]
    fn test_load_returns_raw_content() {
        let (_dir, library) = library_with(&[("cta.html", "<a href=\"#\">Go</a>\n")]);
        assert_eq!(library.load("cta.html").unwrap(), "<a href=\"#\">Go</a>\n");
    }

    #[test]
    fn test_load_rejects_blank_names() {
        let (_dir, library) = library_with(&[]);
        assert!(matches!(library.load(""), Err(FolioError::EmptyBlockName)));
        assert!(matches!(library.load("  \t"), Err(FolioError::EmptyBlockName)));
    }

    #[test]
    fn test_load_rejects_parent_traversal() {
        let (dir, library) = library_with(&[]);
        fs::write(dir.path().join("secret.txt"), "top secret").unwrap();

        for name in ["../secret.txt", "../../etc/passwd", "..%2f..%2fsecret", "/etc/passwd"] {
            let err = library.load(name).unwrap_err();
            assert!(
                matches!(err, FolioError::BlockNotFound(_)),
                "{} was not rejected: {:?}",
                name,
                err
            );
        }
    }

    #[test]
    fn test_load_rejects_the_directory_itself() {
        let (_dir, library) = library_with(&[]);
        assert!(matches!(
            library.load("."),
            Err(FolioError::BlockNotFound(_))
        ));
    }

    #[test]
    fn test_load_missing_directory_is_storage_failure() {
        let dir = tempdir().unwrap();
        let library = BlockLibrary::new(dir.path().join("absent"), ".html");
        let err = library.load("hero.html").unwrap_err();
        assert_eq!(err.status_code(), 500);
    }

    #[cfg(unix)]
    #[test]
    fn test_load_rejects_symlink_escape() {
        let (dir, library) = library_with(&[("inside.html", "ok")]);
        let outside = dir.path().join("outside.html");
        fs::write(&outside, "leaked").unwrap();
        std::os::unix::fs::symlink(&outside, library.dir().join("link.html")).unwrap();

        assert!(matches!(
            library.load("link.html"),
            Err(FolioError::BlockNotFound(_))
        ));
        assert_eq!(library.load("inside.html").unwrap(), "ok");
    }

    #[cfg(unix)]
    #[test]
    fn test_list_skips_symlink_escape() {
        let (dir, library) = library_with(&[("inside.html", "ok")]);
        let outside = dir.path().join("outside.html");
        fs::write(&outside, "leaked").unwrap();
        std::os::unix::fs::symlink(&outside, library.dir().join("link.html")).unwrap();
        std::os::unix::fs::symlink(
            library.dir().join("inside.html"),
            library.dir().join("alias.html"),
        )
        .unwrap();

        assert_eq!(library.list(), vec!["alias.html", "inside.html"]);
        for name in library.list() {
            assert!(library.load(&name).is_ok(), "{} listed but not loadable", name);
        }
    }

    #[test]
    fn test_load_decodes_legacy_bytes_lossily() {
        let (_dir, library) = library_with(&[]);
        fs::write(library.dir().join("legacy.html"), b"<p>caf\xe9</p>").unwrap();

        assert_eq!(library.list(), vec!["legacy.html"]);
        assert_eq!(library.load("legacy.html").unwrap(), "<p>caf\u{FFFD}</p>");
    }

    #[cfg(unix)]
    #[test]
    fn test_load_unreadable_block_is_storage_failure() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, library) = library_with(&[("locked.html", "secret")]);
        let path = library.dir().join("locked.html");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read(&path).is_ok() {
            // Running with privileges that ignore file modes
            return;
        }

        let err = library.load("locked.html").unwrap_err();
        assert!(matches!(err, FolioError::Io(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[cfg(unix)]
    #[test]
    fn test_load_follows_symlink_within_directory() {
        let (_dir, library) = library_with(&[("real.html", "shared")]);
        std::os::unix::fs::symlink(
            library.dir().join("real.html"),
            library.dir().join("alias.html"),
        )
        .unwrap();
        assert_eq!(library.load("alias.html").unwrap(), "shared");
    }
}
