//! Archive manifest

use super::crypto::EncryptionParams;
use super::{payload_entry_name, ArchiveError};
use crate::profile::ProfileMetadata;
use crate::provider::ResourceKind;
use crate::util::{normalize_relative, to_portable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Newest format this build writes and reads
pub const ARCHIVE_FORMAT_VERSION: u32 = 1;

/// Which profile model produced the archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ArchiveSource {
    /// A registered profile; its display metadata travels with the archive
    Selectable { metadata: ProfileMetadata },
    /// A profile without a registry record
    Legacy,
}

impl ArchiveSource {
    /// Embedded metadata, if any
    #[must_use]
    pub fn metadata(&self) -> Option<&ProfileMetadata> {
        match self {
            ArchiveSource::Selectable { metadata } => Some(metadata),
            ArchiveSource::Legacy => None,
        }
    }

    #[must_use]
    pub fn is_selectable(&self) -> bool {
        matches!(self, ArchiveSource::Selectable { .. })
    }
}

/// One payload file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub section: ResourceKind,
    /// Path relative to the profile directory, `/`-separated
    pub path: String,
    /// Size of the stored bytes
    pub size: u64,
    /// SHA-256 of the stored bytes (ciphertext when encrypted)
    pub sha256: String,
    /// Hex nonce for encrypted entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

impl ManifestEntry {
    /// Zip entry holding this file
    #[must_use]
    pub fn entry_name(&self) -> String {
        payload_entry_name(self.section.as_str(), &self.path)
    }
}

/// The archive's self-describing header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveManifest {
    /// Format version
    pub version: u32,
    /// When the backup was taken
    pub created_at: DateTime<Utc>,
    /// Version of the engine that wrote the archive
    pub app_version: String,
    /// Source profile kind and metadata
    pub source: ArchiveSource,
    /// Declared sections, including empty ones
    pub sections: Vec<ResourceKind>,
    /// Encryption parameters for password-protected archives
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<EncryptionParams>,
    /// Payload files
    pub entries: Vec<ManifestEntry>,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

impl ArchiveManifest {
    /// Whether the payload is password protected
    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        self.encryption.is_some()
    }

    /// Total stored payload size
    #[must_use]
    pub fn payload_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }

    /// Parse and validate manifest JSON
    ///
    /// The version is checked before the rest of the document so that newer
    /// archives are rejected as unsupported rather than corrupt.
    ///
    /// # Errors
    /// Returns `UnsupportedVersion` for newer formats and `Corrupt` for
    /// anything unparsable or structurally inconsistent
    pub fn parse(json: &[u8]) -> Result<Self, ArchiveError> {
        let probe: VersionProbe = serde_json::from_slice(json)
            .map_err(|e| ArchiveError::Corrupt(format!("Unreadable manifest: {e}")))?;
        if probe.version == 0 {
            return Err(ArchiveError::Corrupt("Manifest version 0".to_string()));
        }
        if probe.version > ARCHIVE_FORMAT_VERSION {
            return Err(ArchiveError::UnsupportedVersion {
                found: probe.version,
                supported: ARCHIVE_FORMAT_VERSION,
            });
        }

        let manifest: ArchiveManifest = serde_json::from_slice(json)
            .map_err(|e| ArchiveError::Corrupt(format!("Invalid manifest: {e}")))?;
        manifest.validate().map_err(ArchiveError::Corrupt)?;
        Ok(manifest)
    }

    /// Structural checks shared by the writer and the reader
    pub(crate) fn validate(&self) -> Result<(), String> {
        for required in ResourceKind::REQUIRED {
            if !self.sections.contains(&required) {
                return Err(format!("Missing required section: {required}"));
            }
        }

        if let Some(metadata) = self.source.metadata() {
            metadata
                .theme
                .validate()
                .map_err(|e| format!("Invalid embedded metadata: {e}"))?;
        }

        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !self.sections.contains(&entry.section) {
                return Err(format!(
                    "Entry {} belongs to undeclared section {}",
                    entry.path, entry.section
                ));
            }
            let normalized = normalize_relative(Path::new(&entry.path))
                .and_then(|p| to_portable(&p))
                .map_err(|e| e.to_string())?;
            if normalized != entry.path {
                return Err(format!("Entry path is not canonical: {}", entry.path));
            }
            if !seen.insert(entry.path.as_str()) {
                return Err(format!("Duplicate entry path: {}", entry.path));
            }
            if self.is_encrypted() != entry.nonce.is_some() {
                return Err(format!("Entry {} has inconsistent encryption", entry.path));
            }
        }

        Ok(())
    }
}
