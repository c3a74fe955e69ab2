//! projsync CLI - Mirror a local directory into a Claude.ai project
//!
//! Provides commands for:
//! - Initializing a project directory
//! - Creating a remote project from the directory
//! - Updating the remote project (full replace or incremental)
//! - Showing pending local changes and project details

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use projsync_core::config::Config;

mod commands;
mod output;

use commands::{
    create::CreateCommand, info::InfoCommand, init::InitCommand, status::StatusCommand,
    update::UpdateCommand, CliContext,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "projsync",
    version,
    about = "Sync a local directory into a Claude.ai project"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Project root directory (defaults to the current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Initialize the project directory and store the session key
    Init(InitCommand),
    /// Create a remote project and upload the directory
    Create(CreateCommand),
    /// Push the directory to the existing remote project
    Update(UpdateCommand),
    /// Show local changes since the last sync
    Status(StatusCommand),
    /// Show project configuration and state
    Info(InfoCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let (config, load_error) = match Config::load(&config_path) {
        Ok(config) => (config, None),
        Err(e) if config_path.exists() => (Config::default(), Some(e)),
        Err(_) => (Config::default(), None),
    };

    // Setup tracing
    let filter = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => config.logging.level.as_str(),
        (false, 1) => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Some(e) = load_error {
        warn!(
            path = %config_path.display(),
            error = ?e,
            "Ignoring unreadable config file; using defaults"
        );
    }

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let root = std::fs::canonicalize(&root)
        .with_context(|| format!("Project root {} is not accessible", root.display()))?;

    let ctx = CliContext {
        format,
        quiet: cli.quiet,
        config,
        config_path,
        root,
    };

    match cli.command {
        Commands::Init(cmd) => cmd.execute(&ctx).await,
        Commands::Create(cmd) => cmd.execute(&ctx).await,
        Commands::Update(cmd) => cmd.execute(&ctx).await,
        Commands::Status(cmd) => cmd.execute(&ctx).await,
        Commands::Info(cmd) => cmd.execute(&ctx).await,
    }
}
