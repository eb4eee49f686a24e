//! # CLI Layer
//!
//! The only place that:
//! - Knows about terminal I/O (stdout, stderr, stdin)
//! - Decides exit codes
//! - Installs the logger
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: clap, see `setup.rs`
//! 2. **Context Setup**: configuration, repository and `RequestContext`
//! 3. **Dispatch**: one handler per subcommand
//! 4. **Output Formatting**: `render.rs`

use super::render;
use super::setup::{BlockCommands, Cli, Commands, DraftCommands};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use directories::ProjectDirs;
use flexi_logger::{Logger, LoggerHandle};
use folioapp::api::{FolioApi, RequestContext};
use folioapp::config::FolioConfig;
use folioapp::repository::PageRepository;
use folioapp::store::FsBackend;
use log::debug;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const CONFIG_FILE_NAME: &str = "folio.toml";
const FALLBACK_USER: &str = "admin";

pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _logger = init_logging(cli.verbose)?;

    let config = load_config(&cli)?;
    debug!(
        "event=cli_start module=cli data_dir={}",
        config.data_dir.display()
    );
    let repo = PageRepository::open(&config);
    let ctx = RequestContext::new(resolve_user(cli.user.as_deref()));

    match cli.command {
        Commands::Update { id, file } => {
            let content = read_content(file.as_deref())?;
            let update = repo.update_page_content(id, &content, ctx.username())?;
            print!("{}", render::render_update(&update));
        }
        Commands::Draft { action } => handle_draft(&repo, action)?,
        Commands::History { id, system, limit } => {
            let entries = if system {
                repo.get_system_history(limit)
            } else {
                let Some(id) = id else {
                    bail!("a page id is required unless --system is given");
                };
                repo.get_history(id, limit)?
            };
            print!(
                "{}",
                render::render_history(&entries, Utc::now().timestamp())
            );
        }
        Commands::Blocks { action } => match action {
            BlockCommands::List => print!("{}", render::render_blocks(&repo.list_blocks())),
            BlockCommands::Show { name } => print!("{}", repo.load_block(&name)?),
        },
        Commands::Request => return handle_request(FolioApi::new(repo), &ctx),
    }

    Ok(ExitCode::SUCCESS)
}

fn handle_draft(repo: &PageRepository<FsBackend>, action: DraftCommands) -> Result<()> {
    match action {
        DraftCommands::Save {
            id,
            file,
            timestamp,
        } => {
            let content = read_content(file.as_deref())?;
            repo.save_draft(id, &content, timestamp)?;
            println!("Draft saved for page {}", id);
        }
        DraftCommands::Show { id } => {
            let draft = repo.load_draft(id)?;
            print!(
                "{}",
                render::render_draft(id, &draft, Utc::now().timestamp())
            );
        }
        DraftCommands::Delete { id } => {
            repo.delete_draft(id)?;
            println!("Draft deleted for page {}", id);
        }
    }
    Ok(())
}

fn handle_request(api: FolioApi<FsBackend>, ctx: &RequestContext) -> Result<ExitCode> {
    let body = read_content(None)?;
    let response = api.handle_json(ctx, &body);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_logging(verbose: bool) -> Result<LoggerHandle> {
    let level = if verbose { "debug" } else { "warn" };
    let handle = Logger::try_with_env_or_str(level)
        .context("invalid log specification")?
        .log_to_stderr()
        .start()
        .context("failed to start logger")?;
    Ok(handle)
}

fn load_config(cli: &Cli) -> Result<FolioConfig> {
    let file = match &cli.config {
        Some(path) if !path.is_file() => {
            bail!("config file not found: {}", path.display())
        }
        Some(path) => Some(path.clone()),
        None => default_config_file(),
    };

    let mut config = FolioConfig::load(file.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    Ok(config)
}

fn default_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    ProjectDirs::from("", "", "folio")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
}

fn resolve_user(flag: Option<&str>) -> String {
    flag.map(str::to_string)
        .or_else(|| std::env::var("USER").ok())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_USER.to_string())
}

fn read_content(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("reading stdin")?;
            Ok(buffer)
        }
    }
}
