//! What happens to the outgoing profile's record on replace

use crate::profile::Profile;
use crate::storage::{ProfileStore, RegistryError};

/// Strategy for retiring the current profile's record during a replace
pub trait ProfileRetirement {
    /// Retire `profile`'s record
    ///
    /// # Errors
    /// Returns an error if the registry refuses the change
    fn retire(&self, store: &ProfileStore<'_>, profile: &Profile) -> Result<(), RegistryError>;
}

/// Delete the record; a record that is already gone counts as deleted
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteRecord;

impl ProfileRetirement for DeleteRecord {
    fn retire(&self, store: &ProfileStore<'_>, profile: &Profile) -> Result<(), RegistryError> {
        match store.delete(profile.id) {
            Ok(()) => Ok(()),
            Err(RegistryError::NotFound(id)) => {
                tracing::warn!(%id, "Current profile record already removed");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// Leave the record in place, for inspecting a recovery without tearing
/// down the active session
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepRecord;

impl ProfileRetirement for KeepRecord {
    fn retire(&self, _store: &ProfileStore<'_>, profile: &Profile) -> Result<(), RegistryError> {
        tracing::info!(id = %profile.id, "Keeping current profile record");
        Ok(())
    }
}
