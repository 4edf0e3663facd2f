//! Backup creation

use super::BackupService;
use crate::archive::{write_archive, ArchiveError, ArchiveSource, ProfileSnapshot};
use crate::profile::legacy_profile_name;
use crate::provider::ProviderError;
use crate::storage::RegistryError;
use crate::util::sanitize_file_component;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors during backup creation
#[derive(Error, Debug)]
pub enum BackupError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("Failed to read profile data: {0}")]
    Provider(#[from] ProviderError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackupService<'_> {
    /// Back up the running profile into `destination_dir`
    ///
    /// Returns the archive path. Either a complete archive is written or
    /// nothing is; the staging area is always removed.
    ///
    /// # Errors
    /// Returns an error if the profile cannot be staged or the archive
    /// cannot be written
    pub fn create_backup(
        &self,
        destination_dir: &Path,
        password: Option<&str>,
    ) -> Result<PathBuf, BackupError> {
        fs::create_dir_all(destination_dir)?;

        let current = self.current_profile()?;
        let (source, display_name) = match current {
            Some(profile) => {
                let metadata = profile.metadata();
                let name = metadata.name.clone();
                (ArchiveSource::Selectable { metadata }, name)
            }
            None => (
                ArchiveSource::Legacy,
                legacy_profile_name(self.current_profile_dir()),
            ),
        };

        let staging = tempfile::Builder::new()
            .prefix(".ferry-staging-")
            .tempdir_in(destination_dir)?;
        let payload = self.provider.export(staging.path())?;

        let archive_path = unique_archive_path(destination_dir, &display_name);
        let snapshot = ProfileSnapshot { source, payload };
        write_archive(&snapshot, &archive_path, password)?;

        // The archive is already complete at this point
        if let Err(e) = staging.close() {
            tracing::warn!(error = %e, "Failed to clean up staging directory");
        }
        Ok(archive_path)
    }
}

/// `ProfileBackup_<name>_<timestamp>.zip`, suffixed if already taken
fn unique_archive_path(dir: &Path, profile_name: &str) -> PathBuf {
    let stem = format!(
        "ProfileBackup_{}_{}",
        sanitize_file_component(profile_name),
        chrono::Utc::now().format("%Y%m%d-%H%M%S")
    );

    let mut candidate = dir.join(format!("{stem}.zip"));
    let mut n = 1;
    while candidate.exists() {
        candidate = dir.join(format!("{stem}-{n}.zip"));
        n += 1;
    }
    candidate
}
