//! # Storage Layer
//!
//! Folio persists everything as whole JSON documents. The [`StorageBackend`]
//! trait is the seam between the repository (which decides *what* to read and
//! write) and the medium (which decides *how*).
//!
//! ## Contract
//!
//! - **Reads never fail.** A missing, unreadable or corrupt document reads as
//!   `None`; the caller decides what an absent document means (usually "empty").
//! - **Writes replace the whole document.** There is no partial update and no
//!   locking, so two writers racing on one file lose the first write.
//! - **Cached reads** may be served from a process-local cache, but must never
//!   return a document older than the last write made through the same backend.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: production. Atomic writes (temp file + rename)
//!   and an mtime-validated read-through cache.
//! - [`mem_backend::MemBackend`]: for testing repository logic without the
//!   filesystem, with write-failure injection.
//!
//! ## Storage Layout
//!
//! ```text
//! <data_dir>/
//! ├── pages.json          # Page collection (array)
//! ├── history.json        # History log (object keyed by page id + __system__)
//! ├── drafts/
//! │   └── {id}.json       # {content, timestamp}
//! └── blocks/
//!     └── {name}.html     # Template fragments (read-only)
//! ```

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;

pub use backend::StorageBackend;
pub use fs_backend::FsBackend;
pub use mem_backend::MemBackend;
