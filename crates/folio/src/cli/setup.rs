use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "folio",
    bin_name = "folio",
    version,
    disable_help_subcommand = true
)]
#[command(about = "Manage pages, drafts, history and blocks of a folio site", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./folio.toml, then the user config dir)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub config: Option<PathBuf>,

    /// Data directory, overriding the configuration
    #[arg(short, long, global = true, help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// User recorded in history entries
    #[arg(short, long, global = true, help_heading = "Options")]
    pub user: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace a page's content (from --file or stdin)
    Update {
        #[arg(allow_negative_numbers = true)]
        id: i64,

        /// Read content from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Manage autosaved drafts
    Draft {
        #[command(subcommand)]
        action: DraftCommands,
    },

    /// Show revision history for a page, or the system log
    History {
        #[arg(allow_negative_numbers = true)]
        id: Option<i64>,

        /// Show the system log instead of a page's history
        #[arg(long, conflicts_with = "id")]
        system: bool,

        /// Maximum number of entries (non-positive means the default)
        #[arg(short, long, allow_negative_numbers = true)]
        limit: Option<i64>,
    },

    /// List or print template blocks
    Blocks {
        #[command(subcommand)]
        action: BlockCommands,
    },

    /// Handle one JSON builder request read from stdin
    Request,
}

#[derive(Subcommand, Debug)]
pub enum DraftCommands {
    /// Save a draft (from --file or stdin)
    Save {
        #[arg(allow_negative_numbers = true)]
        id: i64,

        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Unix timestamp to store (defaults to now)
        #[arg(short, long)]
        timestamp: Option<i64>,
    },

    /// Print the saved draft
    Show {
        #[arg(allow_negative_numbers = true)]
        id: i64,
    },

    /// Discard the saved draft
    Delete {
        #[arg(allow_negative_numbers = true)]
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum BlockCommands {
    /// List block files
    List,

    /// Print a block's source
    Show { name: String },
}
