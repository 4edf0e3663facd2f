//! Archive CLI commands
//!
//! Handles: ferry backup/recover/inspect

use anyhow::{Context as _, Result};
use clap::Args;
use ferry_core::archive::read_archive;
use ferry_core::backup::KeepRecord;
use ferry_core::host::{HostSession, NoopHost, ProcessHost};
use ferry_core::planner::plan_recovery;
use ferry_core::provider::DirectoryProvider;
use ferry_core::{BackupService, RecoverOptions};
use std::path::PathBuf;

use super::resolve_dir;
use crate::App;

/// Arguments for `ferry backup`
#[derive(Args)]
pub struct BackupArgs {
    /// Directory of the profile to back up
    #[arg(long, value_name = "DIR")]
    pub profile_dir: PathBuf,

    /// Directory that receives the archive (defaults to <data dir>/backups)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Encrypt the payload with this password
    #[arg(long)]
    pub password: Option<String>,
}

/// Arguments for `ferry recover`
#[derive(Args)]
pub struct RecoverArgs {
    /// Archive to restore
    pub archive: PathBuf,

    /// Directory of the profile currently in use
    #[arg(long, value_name = "DIR")]
    pub profile_dir: PathBuf,

    /// Directory that receives the new profile (defaults to <data dir>/profiles)
    #[arg(long, value_name = "DIR")]
    pub profile_root: Option<PathBuf>,

    /// Scratch directory for unpacking (defaults to <data dir>/recovery)
    #[arg(long, value_name = "DIR")]
    pub recovery_dir: Option<PathBuf>,

    /// Password for encrypted archives
    #[arg(long)]
    pub password: Option<String>,

    /// Retire the current profile and switch to the recovered one
    #[arg(long)]
    pub replace: bool,

    /// Open the recovered profile in the browser
    #[arg(long)]
    pub launch: bool,

    /// Keep the current profile's record when replacing it
    #[arg(long, requires = "replace")]
    pub keep_current_record: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `ferry inspect`
#[derive(Args)]
pub struct InspectArgs {
    /// Archive to inspect
    pub archive: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute_backup(app: &App, args: BackupArgs) -> Result<()> {
    let profile_dir = resolve_dir(&args.profile_dir)?;
    let output = args.output.unwrap_or_else(|| app.data_dir.join("backups"));

    let service = BackupService::new(
        &app.db,
        DirectoryProvider::new(profile_dir.clone()),
        profile_dir.clone(),
        app.config.clone(),
    );

    println!("Backing up profile: {}", profile_dir.display());
    let archive = service
        .create_backup(&output, args.password.as_deref())
        .context("Backup failed")?;
    println!("Created backup: {}", archive.display());

    Ok(())
}

pub fn execute_recover(app: &App, args: RecoverArgs) -> Result<()> {
    let host: Box<dyn HostSession> = match &app.config.browser_binary {
        Some(binary) => Box::new(ProcessHost::new(binary.clone())),
        None => Box::new(NoopHost),
    };

    let current_dir = resolve_dir(&args.profile_dir)?;
    let mut service = BackupService::new(
        &app.db,
        DirectoryProvider::new(current_dir.clone()),
        current_dir,
        app.config.clone(),
    )
    .with_host(host.as_ref());
    if args.keep_current_record {
        service = service.with_retirement(KeepRecord);
    }

    let mut options = RecoverOptions::new(
        args.recovery_dir
            .unwrap_or_else(|| app.data_dir.join("recovery")),
        args.profile_root
            .unwrap_or_else(|| app.data_dir.join("profiles")),
    )
    .launch_browser(args.launch)
    .replace_current_profile(args.replace);
    if let Some(password) = args.password {
        options = options.with_password(password);
    }

    let profile_dir = service
        .recover_from_backup_archive(&args.archive, &options)
        .with_context(|| format!("Failed to recover {}", args.archive.display()))?;
    let record = service.store().get_by_path(&profile_dir)?;

    if args.json {
        let output = serde_json::json!({
            "profile_dir": profile_dir,
            "profile": record,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Recovered profile to: {}", profile_dir.display());
    match record {
        Some(profile) => println!("Registered profile: {} ({})", profile.name, profile.id),
        None => println!("Recovered as a legacy profile (no registry record)"),
    }
    if args.replace {
        println!("Current profile replaced.");
    }

    Ok(())
}

pub fn execute_inspect(args: &InspectArgs) -> Result<()> {
    let reader = read_archive(&args.archive)
        .with_context(|| format!("Failed to read {}", args.archive.display()))?;
    let manifest = reader.manifest();

    if args.json {
        println!("{}", serde_json::to_string_pretty(manifest)?);
        return Ok(());
    }

    println!("Archive: {}", args.archive.display());
    println!("Format version: {}", manifest.version);
    println!("Created: {}", manifest.created_at);
    println!("Written by: ferry {}", manifest.app_version);
    match manifest.source.metadata() {
        Some(metadata) => {
            println!("Source: selectable profile");
            println!("  Name: {}", metadata.name);
            println!("  Avatar: {}", metadata.avatar);
            println!(
                "  Theme: {} on {}",
                metadata.theme.foreground, metadata.theme.background
            );
        }
        None => println!("Source: legacy profile"),
    }
    println!("Encrypted: {}", manifest.is_encrypted());

    let sections: Vec<_> = manifest.sections.iter().map(ToString::to_string).collect();
    println!("Sections: {}", sections.join(", "));
    println!(
        "Files: {} ({} bytes)",
        manifest.entries.len(),
        manifest.payload_size()
    );

    // Without a current record only selectable archives register
    let plan = plan_recovery(&manifest.source, false, None);
    let registers = if plan.create_new_profile_record {
        "always"
    } else {
        "only when a selectable profile is current"
    };
    println!("Creates a profile record: {registers}");

    Ok(())
}
