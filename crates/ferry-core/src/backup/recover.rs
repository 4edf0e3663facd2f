//! Recovery from backup archives

use super::BackupService;
use crate::archive::{read_archive, ArchiveError, ArchiveSource};
use crate::planner::{plan_recovery, MetadataSource};
use crate::profile::{Profile, ProfileMetadata};
use crate::provider::ProviderError;
use crate::storage::RegistryError;
use crate::util::salted_dir_name;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors during recovery
#[derive(Error, Debug)]
pub enum RecoveryError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Recovery target already exists: {}", .0.display())]
    TargetExists(PathBuf),

    #[error("Failed to import profile data: {0}")]
    Provider(#[from] ProviderError),

    /// The profile directory is complete but has no registry record
    #[error("Recovered profile at {} could not be registered: {source}", .path.display())]
    Registration {
        path: PathBuf,
        source: RegistryError,
    },

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Options for [`BackupService::recover_from_backup_archive`]
#[derive(Debug, Clone)]
pub struct RecoverOptions {
    /// Password for encrypted archives
    pub password: Option<String>,
    /// Open the recovered profile when not replacing the current one
    pub should_launch_browser: bool,
    /// Scratch directory the payload is unpacked into
    pub recovery_dir: PathBuf,
    /// Directory that receives the new profile directory
    pub profile_root_dir: PathBuf,
    /// Retire the current profile and end its session
    pub replace_current_profile: bool,
}

impl RecoverOptions {
    #[must_use]
    pub fn new(recovery_dir: PathBuf, profile_root_dir: PathBuf) -> Self {
        Self {
            password: None,
            should_launch_browser: false,
            recovery_dir,
            profile_root_dir,
            replace_current_profile: false,
        }
    }

    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn launch_browser(mut self, launch: bool) -> Self {
        self.should_launch_browser = launch;
        self
    }

    #[must_use]
    pub fn replace_current_profile(mut self, replace: bool) -> Self {
        self.replace_current_profile = replace;
        self
    }
}

impl BackupService<'_> {
    /// Restore `archive_path` into a new profile directory
    ///
    /// Returns the new profile directory, always an absolute path. On success
    /// the profile root holds exactly one new directory and the registry
    /// reflects the recovery plan.
    ///
    /// # Errors
    /// `TargetExists` if the profile root is not empty. Archive errors
    /// propagate unchanged. If importing fails, the new
    /// directory is removed first. If registration fails, the directory is
    /// kept and `Registration` carries its path.
    pub fn recover_from_backup_archive(
        &self,
        archive_path: &Path,
        options: &RecoverOptions,
    ) -> Result<PathBuf, RecoveryError> {
        let mut reader = read_archive(archive_path)?;
        let source = reader.source().clone();
        let current = self.current_profile()?;

        tracing::info!(
            archive = %archive_path.display(),
            selectable = source.is_selectable(),
            replace = options.replace_current_profile,
            "Recovering profile from backup"
        );

        let profile_root = prepare_profile_root(&options.profile_root_dir)?;

        fs::create_dir_all(&options.recovery_dir)?;
        let unpack_dir = tempfile::Builder::new()
            .prefix("recovery-")
            .tempdir_in(&options.recovery_dir)?;
        let payload = reader.unpack(unpack_dir.path(), options.password.as_deref())?;

        let label = source
            .metadata()
            .map_or_else(|| "recovered".to_string(), |m| m.name.clone());
        let profile_dir = create_profile_dir(&profile_root, &label)?;

        if let Err(e) = self.provider.import(&payload, &profile_dir) {
            remove_partial_profile(&profile_dir);
            return Err(e.into());
        }
        if let Err(e) = unpack_dir.close() {
            tracing::warn!(error = %e, "Failed to clean up unpacked payload");
        }

        let plan = plan_recovery(&source, options.replace_current_profile, current.as_ref());
        tracing::debug!(?plan, profile = %profile_dir.display(), "Planned recovery");

        let store = self.store();
        if plan.create_new_profile_record {
            let metadata = self.resolve_metadata(plan.metadata_source, &source, current.as_ref());
            store
                .insert(&profile_dir, &metadata.name, metadata.avatar, &metadata.theme)
                .map_err(|e| RecoveryError::Registration {
                    path: profile_dir.clone(),
                    source: e,
                })?;
        }

        if plan.delete_current_profile_record {
            if let Some(current) = &current {
                self.retirement.retire(&store, current)?;
            }
        }

        if options.replace_current_profile {
            self.host.quit_and_replace(&profile_dir);
        } else if options.should_launch_browser {
            self.host.launch(&profile_dir);
        }

        tracing::info!(profile = %profile_dir.display(), "Recovered profile");
        Ok(profile_dir)
    }

    fn resolve_metadata(
        &self,
        metadata_source: MetadataSource,
        source: &ArchiveSource,
        current: Option<&Profile>,
    ) -> ProfileMetadata {
        let inherited = match metadata_source {
            MetadataSource::Archive => source.metadata().cloned(),
            MetadataSource::CurrentProfile => current.map(Profile::metadata),
            MetadataSource::Defaults => None,
        };
        inherited.unwrap_or_else(|| self.config().default_profile.metadata())
    }
}

/// Create `root` if needed and return its canonical form
///
/// A root that already holds anything is rejected so a recovery never merges
/// into existing profile data.
fn prepare_profile_root(root: &Path) -> Result<PathBuf, RecoveryError> {
    fs::create_dir_all(root)?;
    let root = root.canonicalize()?;
    if fs::read_dir(&root)?.next().is_some() {
        return Err(RecoveryError::TargetExists(root));
    }
    Ok(root)
}

/// Create a new, uniquely named directory under `root`
fn create_profile_dir(root: &Path, label: &str) -> Result<PathBuf, RecoveryError> {
    let dir = root.join(salted_dir_name(label));
    match fs::create_dir(&dir) {
        Ok(()) => Ok(dir),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(RecoveryError::TargetExists(dir)),
        Err(e) => Err(e.into()),
    }
}

fn remove_partial_profile(dir: &Path) {
    match fs::remove_dir_all(dir) {
        Ok(()) => tracing::warn!(profile = %dir.display(), "Removed partially recovered profile"),
        Err(e) => tracing::error!(
            profile = %dir.display(),
            error = %e,
            "Failed to remove partially recovered profile"
        ),
    }
}
