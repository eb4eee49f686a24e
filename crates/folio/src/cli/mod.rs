//! # CLI Behavior
//!
//! This is **one possible client** for folio, not the application itself.
//! The CLI is the only place that knows about terminal I/O, exit codes, and
//! output formatting.
//!
//! ## Identity
//!
//! History entries record who made a change. The CLI builds an explicit
//! `RequestContext` from `--user`, falling back to `$USER` and then `admin`.
//!
//! ## Content Input
//!
//! `update` and `draft save` read content from `--file` when given,
//! otherwise from stdin:
//!
//! ```text
//! folio update 7 --file about.html
//! echo '<p>wip</p>' | folio draft save 7
//! ```
//!
//! ## Replaying Requests
//!
//! `folio request` reads one builder request from stdin and prints the JSON
//! response. The exit code is 0 for a 2xx status and 1 otherwise:
//!
//! ```text
//! echo '{"action": "history", "page_id": 7}' | folio request
//! ```
//!
//! ## Module Structure
//!
//! - `setup`: Argument parsing via clap
//! - `commands`: Context setup and dispatch
//! - `render`: Output formatting

mod commands;
mod render;
pub mod setup;

pub use commands::run;
