//! # Folio Architecture
//!
//! Folio is the storage core of a flat-file CMS. Pages live in one JSON
//! document, revisions in another, drafts in one file per page, and reusable
//! template fragments ("blocks") in a plain directory. Everything else a site
//! needs (templating, menus, auth, routing) sits outside this crate and talks
//! to it through the API facade.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Clients (web handlers, the `folio` CLI)                    │
//! │  - Authenticate, build a RequestContext, map status codes   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Tagged JSON requests → repository calls → ApiResponse    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Repository (repository.rs, history.rs, blocks.rs)          │
//! │  - Content updates + history, drafts, sandboxed blocks      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - StorageBackend trait: FsBackend (production),            │
//! │    MemBackend (testing)                                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions Above the Store
//!
//! From `api.rs` down to the repository, code takes regular Rust values and
//! returns `Result<T, FolioError>`. It never writes to stdout/stderr and never
//! exits the process; diagnostics go through the `log` facade.
//!
//! ## Module Overview
//!
//! - [`api`]: request facade and [`api::RequestContext`]
//! - [`repository`]: [`repository::PageRepository`]
//! - [`history`]: change statistics and the bounded history log
//! - [`blocks`]: block listing and traversal-safe loading
//! - [`store`]: storage abstraction and implementations
//! - [`model`]: `Page`, `HistoryEntry`, `Draft`
//! - [`config`]: configuration
//! - [`error`]: error types and HTTP status mapping

pub mod api;
pub mod blocks;
pub mod config;
pub mod error;
pub mod history;
pub mod model;
pub mod repository;
pub mod store;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
