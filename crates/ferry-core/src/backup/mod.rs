//! Backup and recovery orchestration

pub mod create;
pub mod recover;
mod retire;

pub use create::BackupError;
pub use recover::{RecoverOptions, RecoveryError};
pub use retire::{DeleteRecord, KeepRecord, ProfileRetirement};

use crate::config::FerryConfig;
use crate::host::{HostSession, NoopHost};
use crate::profile::Profile;
use crate::provider::ProfileDataProvider;
use crate::storage::{Database, ProfileStore, RegistryError};
use std::path::{Path, PathBuf};

/// Creates backups of the running profile and recovers archives
///
/// The registry handle, data provider, host session and retirement strategy
/// are all injected; the service holds no global state.
pub struct BackupService<'a> {
    db: &'a Database,
    provider: Box<dyn ProfileDataProvider + 'a>,
    host: Box<dyn HostSession + 'a>,
    retirement: Box<dyn ProfileRetirement + 'a>,
    current_profile_dir: PathBuf,
    config: FerryConfig,
}

impl<'a> BackupService<'a> {
    /// Service for the profile running from `current_profile_dir`
    ///
    /// Uses [`NoopHost`] and [`DeleteRecord`] until replaced.
    pub fn new(
        db: &'a Database,
        provider: impl ProfileDataProvider + 'a,
        current_profile_dir: PathBuf,
        config: FerryConfig,
    ) -> Self {
        Self {
            db,
            provider: Box::new(provider),
            host: Box::new(NoopHost),
            retirement: Box::new(DeleteRecord),
            current_profile_dir,
            config,
        }
    }

    /// Use `host` for quit-and-replace and launch signals
    #[must_use]
    pub fn with_host(mut self, host: impl HostSession + 'a) -> Self {
        self.host = Box::new(host);
        self
    }

    /// Use `retirement` for the current record when replacing it
    #[must_use]
    pub fn with_retirement(mut self, retirement: impl ProfileRetirement + 'a) -> Self {
        self.retirement = Box::new(retirement);
        self
    }

    /// Directory of the running profile
    #[must_use]
    pub fn current_profile_dir(&self) -> &Path {
        &self.current_profile_dir
    }

    #[must_use]
    pub fn config(&self) -> &FerryConfig {
        &self.config
    }

    /// Registry view over the service's database
    #[must_use]
    pub fn store(&self) -> ProfileStore<'a> {
        ProfileStore::new(self.db.connection())
    }

    /// Record of the running profile, if it is a selectable profile
    ///
    /// # Errors
    /// Returns an error if the registry cannot be queried
    pub fn current_profile(&self) -> Result<Option<Profile>, RegistryError> {
        if !self.config.selectable_profiles_enabled {
            return Ok(None);
        }
        self.store().get_by_path(&self.current_profile_dir)
    }
}
