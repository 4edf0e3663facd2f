//! Recovery planning
//!
//! Pure decision logic: given what the archive is and what the recovery site
//! looks like, decide which registry mutations recovery performs.

use crate::archive::ArchiveSource;
use crate::profile::Profile;
use serde::Serialize;

/// Where the recovered profile's name, avatar and theme come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataSource {
    /// Metadata embedded in the archive
    Archive,
    /// The outgoing current profile's metadata
    CurrentProfile,
    /// No source; configured defaults apply
    Defaults,
}

/// Registry mutations a recovery performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecoveryPlan {
    /// Register the recovered directory as a selectable profile
    pub create_new_profile_record: bool,
    pub metadata_source: MetadataSource,
    /// Remove the current profile's record once the new one is registered
    pub delete_current_profile_record: bool,
}

/// Decide how to recover `source`
///
/// `current_profile` is `None` when the running profile is legacy or
/// selectable profiles are disabled.
#[must_use]
pub fn plan_recovery(
    source: &ArchiveSource,
    replace_current_profile: bool,
    current_profile: Option<&Profile>,
) -> RecoveryPlan {
    let has_current = current_profile.is_some();

    let (metadata_source, delete_current_profile_record) =
        match (source, replace_current_profile, has_current) {
            (ArchiveSource::Selectable { .. }, false, _) => (MetadataSource::Archive, false),
            (ArchiveSource::Selectable { .. }, true, present) => (MetadataSource::Archive, present),
            (ArchiveSource::Legacy, false, _) => (MetadataSource::Defaults, false),
            (ArchiveSource::Legacy, true, true) => (MetadataSource::CurrentProfile, true),
            // No current record to carry over or delete
            (ArchiveSource::Legacy, true, false) => (MetadataSource::Defaults, false),
        };

    RecoveryPlan {
        create_new_profile_record: source.is_selectable() || has_current,
        metadata_source,
        delete_current_profile_record,
    }
}
