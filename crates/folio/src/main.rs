//! # Folio CLI
//!
//! An administrative client for a folio data root: the same repository the
//! web handlers use, driven from a terminal. Useful for scripted content
//! updates, inspecting history and drafts, and replaying builder requests.
//!
//! The binary is intentionally thin. Argument parsing lives in
//! `cli/setup.rs`, dispatch in `cli/commands.rs`, and terminal formatting in
//! `cli/render.rs`. Everything from `folioapp` inward is UI agnostic.

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
