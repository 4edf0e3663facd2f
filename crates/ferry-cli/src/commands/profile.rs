//! Profile registry CLI commands
//!
//! Handles: ferry profile list/show/add/rename/avatar/theme/remove

use anyhow::{anyhow, Result};
use clap::Subcommand;
use ferry_core::profile::{Avatar, Profile, Theme};
use ferry_core::storage::ProfileStore;
use std::io::{self, Write};
use std::path::PathBuf;
use uuid::Uuid;

use super::resolve_dir;
use crate::App;

/// Profile registry commands
#[derive(Subcommand)]
pub enum ProfileCommands {
    /// List all selectable profiles
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show profile details
    Show {
        /// Profile ID or directory
        profile: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Register an existing profile directory
    Add {
        /// Profile directory
        path: PathBuf,
        /// Display name
        #[arg(long)]
        name: String,
        /// Avatar (book, briefcase, flower, heart, shopping, star)
        #[arg(long, default_value = "star")]
        avatar: Avatar,
        /// Theme background color (#rrggbb)
        #[arg(long)]
        background: Option<String>,
        /// Theme foreground color (#rrggbb)
        #[arg(long)]
        foreground: Option<String>,
    },
    /// Rename a profile
    Rename {
        /// Profile ID or directory
        profile: String,
        /// New display name
        name: String,
    },
    /// Change a profile's avatar
    Avatar {
        /// Profile ID or directory
        profile: String,
        /// Avatar (book, briefcase, flower, heart, shopping, star)
        avatar: Avatar,
    },
    /// Change a profile's theme colors
    Theme {
        /// Profile ID or directory
        profile: String,
        /// Background color (#rrggbb)
        background: String,
        /// Foreground color (#rrggbb)
        foreground: String,
    },
    /// Remove a profile's record (the directory is left in place)
    Remove {
        /// Profile ID or directory
        profile: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

pub fn execute(app: &App, cmd: ProfileCommands) -> Result<()> {
    let store = ProfileStore::new(app.db.connection());

    match cmd {
        ProfileCommands::List { json } => execute_list(&store, json),
        ProfileCommands::Show { profile, json } => execute_show(&store, &profile, json),
        ProfileCommands::Add {
            path,
            name,
            avatar,
            background,
            foreground,
        } => {
            let defaults = Theme::default();
            let theme = Theme::new(
                background.as_deref().unwrap_or(&defaults.background),
                foreground.as_deref().unwrap_or(&defaults.foreground),
            )?;
            validate_name(&name)?;
            let path = resolve_dir(&path)?;

            let id = store.insert(&path, &name, avatar, &theme)?;
            println!("Registered profile '{name}': {id}");
            Ok(())
        }
        ProfileCommands::Rename { profile, name } => {
            validate_name(&name)?;
            let prof = find_profile(&store, &profile)?;
            store.set_name(prof.id, &name)?;
            println!("Renamed '{}' to '{name}'", prof.name);
            Ok(())
        }
        ProfileCommands::Avatar { profile, avatar } => {
            let prof = find_profile(&store, &profile)?;
            store.set_avatar(prof.id, avatar)?;
            println!("Set avatar of '{}' to {avatar}", prof.name);
            Ok(())
        }
        ProfileCommands::Theme {
            profile,
            background,
            foreground,
        } => {
            let theme = Theme::new(&background, &foreground)?;
            let prof = find_profile(&store, &profile)?;
            store.set_theme(prof.id, &theme)?;
            println!(
                "Set theme of '{}' to {} on {}",
                prof.name, theme.foreground, theme.background
            );
            Ok(())
        }
        ProfileCommands::Remove { profile, force } => execute_remove(&store, &profile, force),
    }
}

fn execute_list(store: &ProfileStore<'_>, json_output: bool) -> Result<()> {
    let profiles = store.list_all()?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&profiles)?);
        return Ok(());
    }

    if profiles.is_empty() {
        println!("No profiles found.");
    } else {
        println!("Profiles:");
        for p in profiles {
            println!("  {} - {} [{}] ({})", p.id, p.name, p.avatar, p.path.display());
        }
    }
    Ok(())
}

fn execute_show(store: &ProfileStore<'_>, identifier: &str, json_output: bool) -> Result<()> {
    let prof = find_profile(store, identifier)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&prof)?);
        return Ok(());
    }

    println!("Profile: {}", prof.name);
    println!("ID: {}", prof.id);
    println!("Path: {}", prof.path.display());
    println!("Avatar: {}", prof.avatar);
    println!(
        "Theme: {} on {}",
        prof.theme.foreground, prof.theme.background
    );
    println!("Created: {}", prof.created_at);
    println!("Updated: {}", prof.updated_at);
    Ok(())
}

fn execute_remove(store: &ProfileStore<'_>, identifier: &str, force: bool) -> Result<()> {
    let prof = find_profile(store, identifier)?;

    if !force {
        print!("Remove profile '{}' (ID: {})? [y/N] ", prof.name, prof.id);
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.delete(prof.id)?;
    println!("Removed profile: {}", prof.name);
    Ok(())
}

/// Look up a profile by UUID or directory
fn find_profile(store: &ProfileStore<'_>, identifier: &str) -> Result<Profile> {
    let profile = if let Ok(id) = Uuid::parse_str(identifier) {
        store.get(id)?
    } else {
        let path = PathBuf::from(identifier);
        let path = path.canonicalize().unwrap_or(path);
        store.get_by_path(&path)?
    };
    profile.ok_or_else(|| anyhow!("Profile not found: {identifier}"))
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(anyhow!("Name cannot be empty"));
    }
    if name.contains('\0') {
        return Err(anyhow!("Name cannot contain null bytes"));
    }
    Ok(())
}
