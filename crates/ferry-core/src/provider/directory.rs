//! Provider backed by a profile directory on disk

use super::{staged_path, Payload, ProfileDataProvider, ProviderError, ResourceKind};
use crate::util::safe_join;
use rusqlite::{Connection, DatabaseName, OpenFlags};
use std::fs::{self, File};
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::{DirEntry, WalkDir};

/// Directories that only hold caches or crash data
const SKIPPED_DIRS: &[&str] = &[
    "cache2",
    "startupCache",
    "thumbnails",
    "shader-cache",
    "crashes",
    "minidumps",
    "saved-telemetry-pings",
    "datareporting",
];

/// Files that only make sense inside a running session
const SKIPPED_FILES: &[&str] = &["parent.lock", "lock", ".parentlock"];

/// First bytes of every `SQLite` database file
const SQLITE_HEADER: &[u8; 16] = b"SQLite format 3\0";

/// Snapshots and restores a profile directory file by file
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    profile_dir: PathBuf,
}

impl DirectoryProvider {
    /// Provider for the profile living in `profile_dir`
    #[must_use]
    pub fn new(profile_dir: PathBuf) -> Self {
        Self { profile_dir }
    }

    /// Directory this provider exports from
    #[must_use]
    pub fn profile_dir(&self) -> &Path {
        &self.profile_dir
    }
}

impl ProfileDataProvider for DirectoryProvider {
    fn export(&self, staging_dir: &Path) -> Result<Payload, ProviderError> {
        let mut payload = Payload::new(staging_dir.to_path_buf());
        for section in ResourceKind::ALL {
            payload.declare(section);
        }

        let walker = WalkDir::new(&self.profile_dir)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e));

        for entry in walker {
            let entry = entry?;
            // Symlinks could point outside the profile
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if SKIPPED_FILES.contains(&name.as_ref()) || is_sqlite_sidecar(&name) {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&self.profile_dir)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            let section = classify(relative);

            let destination = staged_path(staging_dir, section, relative);
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)?;
            }
            stage_file(entry.path(), &destination)?;
            payload.add_file(section, relative)?;
        }

        tracing::debug!(
            profile = %self.profile_dir.display(),
            files = payload.files().len(),
            "Staged profile data"
        );
        Ok(payload)
    }

    fn import(&self, payload: &Payload, target_dir: &Path) -> Result<(), ProviderError> {
        for file in payload.files() {
            let destination = safe_join(target_dir, &file.path)?;
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(payload.staged_path(file), &destination)?;
        }

        tracing::debug!(
            target = %target_dir.display(),
            files = payload.files().len(),
            "Imported profile data"
        );
        Ok(())
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && SKIPPED_DIRS.contains(&entry.file_name().to_string_lossy().as_ref())
}

/// Journals are folded into the database snapshot instead
fn is_sqlite_sidecar(name: &str) -> bool {
    name.ends_with("-wal") || name.ends_with("-shm") || name.ends_with("-journal")
}

fn stage_file(source: &Path, destination: &Path) -> Result<(), ProviderError> {
    if is_sqlite_database(source)? {
        snapshot_database(source, destination)
    } else {
        fs::copy(source, destination)?;
        Ok(())
    }
}

fn is_sqlite_database(path: &Path) -> std::io::Result<bool> {
    let mut header = [0u8; 16];
    match File::open(path)?.read_exact(&mut header) {
        Ok(()) => Ok(&header == SQLITE_HEADER),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}

/// Copy a database that may still be open in the browser
///
/// The online backup API reads through the WAL, so transactions that were
/// committed but not yet checkpointed end up in the copy.
fn snapshot_database(source: &Path, destination: &Path) -> Result<(), ProviderError> {
    let conn = Connection::open_with_flags(
        source,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(Duration::from_secs(5))?;
    conn.backup(DatabaseName::Main, destination, None)?;

    tracing::debug!(database = %source.display(), "Snapshotted database");
    Ok(())
}

/// Assign a profile file to its section
fn classify(relative: &Path) -> ResourceKind {
    let top = relative
        .components()
        .next()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .unwrap_or_default();
    let nested = relative.components().count() > 1;

    if nested {
        return match top.as_str() {
            "bookmarkbackups" => ResourceKind::Places,
            "sessionstore-backups" => ResourceKind::Session,
            "extensions" | "browser-extension-data" => ResourceKind::Addons,
            _ => ResourceKind::Misc,
        };
    }

    match top.as_str() {
        "prefs.js" | "user.js" | "xulstore.json" | "containers.json" | "handlers.json"
        | "search.json.mozlz4" | "permissions.sqlite" | "content-prefs.sqlite" => {
            ResourceKind::Preferences
        }
        "places.sqlite" | "favicons.sqlite" => ResourceKind::Places,
        "logins.json" | "logins-backup.json" | "key4.db" | "cert9.db" | "pkcs11.txt" => {
            ResourceKind::Credentials
        }
        "sessionstore.jsonlz4" => ResourceKind::Session,
        "cookies.sqlite" => ResourceKind::Cookies,
        "formhistory.sqlite" | "autofill-profiles.json" => ResourceKind::FormHistory,
        "extensions.json" | "extension-settings.json" | "extension-preferences.json"
        | "addons.json" => ResourceKind::Addons,
        _ => ResourceKind::Misc,
    }
}
