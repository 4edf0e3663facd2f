//! Ferry CLI - Command-line interface for Ferry
//!
//! Provides `ferry backup`, `ferry recover`, `ferry inspect` and
//! `ferry profile`.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ferry_core::storage::Database;
use ferry_core::FerryConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use commands::archive::{BackupArgs, InspectArgs, RecoverArgs};
use commands::profile::ProfileCommands;

#[derive(Parser)]
#[command(name = "ferry")]
#[command(about = "Ferry - browser profile backup and recovery")]
#[command(version)]
struct Cli {
    /// Data directory holding config.toml and the profile registry
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Back up a profile into a portable archive
    Backup(BackupArgs),
    /// Restore an archive into a new profile
    Recover(RecoverArgs),
    /// Show an archive's manifest without restoring it
    Inspect(InspectArgs),
    /// Manage selectable profiles
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
}

/// Data directory, configuration and registry shared by every command
pub struct App {
    pub data_dir: PathBuf,
    pub config: FerryConfig,
    pub db: Database,
}

impl App {
    fn open(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.unwrap_or_else(FerryConfig::default_data_dir);
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let config = FerryConfig::load(&FerryConfig::config_path(&data_dir))?;
        let db_path = FerryConfig::database_path(&data_dir);
        let db = Database::open(&db_path)
            .with_context(|| format!("Failed to open registry {}", db_path.display()))?;

        tracing::debug!(data_dir = %data_dir.display(), "Opened data directory");
        Ok(Self {
            data_dir,
            config,
            db,
        })
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Backup(args) => {
            commands::archive::execute_backup(&App::open(cli.data_dir)?, args)
        }
        Commands::Recover(args) => {
            commands::archive::execute_recover(&App::open(cli.data_dir)?, args)
        }
        // Inspecting an archive needs no data directory
        Commands::Inspect(args) => commands::archive::execute_inspect(&args),
        Commands::Profile { action } => {
            commands::profile::execute(&App::open(cli.data_dir)?, action)
        }
    }
}
