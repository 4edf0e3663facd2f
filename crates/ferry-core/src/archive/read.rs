//! Archive reading and verification

use super::crypto::PayloadCipher;
use super::manifest::{ArchiveManifest, ArchiveSource, ManifestEntry};
use super::{ArchiveError, MANIFEST_NAME};
use crate::provider::{staged_path, Payload};
use crate::util::normalize_relative;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::ZipArchive;

/// Upper bound for the manifest entry
const MAX_MANIFEST_SIZE: u64 = 16 * 1024 * 1024;

/// An opened, verified archive
///
/// Reading never modifies the archive file.
pub struct ArchiveReader {
    path: PathBuf,
    manifest: ArchiveManifest,
    zip: ZipArchive<File>,
}

impl std::fmt::Debug for ArchiveReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveReader")
            .field("path", &self.path)
            .field("manifest", &self.manifest)
            .finish_non_exhaustive()
    }
}

/// Open an archive, parse its manifest, and verify every payload digest
///
/// # Errors
/// Returns `Io` if the file cannot be read, `UnsupportedVersion` for newer
/// formats, and `Corrupt` for damaged zips, manifests or payload entries
pub fn read_archive(archive_path: &Path) -> Result<ArchiveReader, ArchiveError> {
    let file = File::open(archive_path)?;
    let mut zip = ZipArchive::new(file).map_err(zip_error)?;

    let manifest_bytes = {
        let entry = zip.by_name(MANIFEST_NAME).map_err(|e| match e {
            ZipError::FileNotFound => ArchiveError::Corrupt("Archive has no manifest".to_string()),
            other => zip_error(other),
        })?;
        if entry.size() > MAX_MANIFEST_SIZE {
            return Err(ArchiveError::Corrupt("Manifest is too large".to_string()));
        }
        let mut bytes = Vec::new();
        entry.take(MAX_MANIFEST_SIZE).read_to_end(&mut bytes)?;
        bytes
    };
    let manifest = ArchiveManifest::parse(&manifest_bytes)?;

    let mut reader = ArchiveReader {
        path: archive_path.to_path_buf(),
        manifest,
        zip,
    };
    let entries = reader.manifest.entries.clone();
    for entry in &entries {
        reader.read_verified(entry)?;
    }

    tracing::debug!(
        archive = %archive_path.display(),
        entries = entries.len(),
        "Verified backup archive"
    );
    Ok(reader)
}

impl ArchiveReader {
    /// Archive location
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parsed manifest
    #[must_use]
    pub fn manifest(&self) -> &ArchiveManifest {
        &self.manifest
    }

    /// Source profile kind
    #[must_use]
    pub fn source(&self) -> &ArchiveSource {
        &self.manifest.source
    }

    /// Write the payload beneath `dir` in staging layout
    ///
    /// Callers own `dir` and remove it on failure.
    ///
    /// # Errors
    /// Returns `PasswordRequired` or `Decryption` for encrypted archives
    /// opened without the right password, and `Io` on write failures
    pub fn unpack(&mut self, dir: &Path, password: Option<&str>) -> Result<Payload, ArchiveError> {
        let cipher = match (&self.manifest.encryption, password) {
            (Some(params), Some(password)) => Some(PayloadCipher::open_existing(password, params)?),
            (Some(_), None) => return Err(ArchiveError::PasswordRequired),
            (None, _) => None,
        };

        let mut payload = Payload::new(dir.to_path_buf());
        for section in &self.manifest.sections {
            payload.declare(*section);
        }

        let entries = self.manifest.entries.clone();
        for entry in &entries {
            let stored = self.read_verified(entry)?;
            let content = match (&cipher, &entry.nonce) {
                (Some(cipher), Some(nonce)) => {
                    cipher.open(nonce, &stored, entry.entry_name().as_bytes())?
                }
                _ => stored,
            };

            let relative = normalize_relative(Path::new(&entry.path))?;
            let destination = staged_path(dir, entry.section, &relative);
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&destination, content)?;
            payload.add_file(entry.section, &relative)?;
        }

        Ok(payload)
    }

    fn read_verified(&mut self, entry: &ManifestEntry) -> Result<Vec<u8>, ArchiveError> {
        let name = entry.entry_name();
        let file = self.zip.by_name(&name).map_err(|e| match e {
            ZipError::FileNotFound => ArchiveError::Corrupt(format!("Missing payload entry {name}")),
            other => zip_error(other),
        })?;
        if file.size() != entry.size {
            return Err(ArchiveError::Corrupt(format!(
                "Size mismatch for {name}: manifest says {}, archive has {}",
                entry.size,
                file.size()
            )));
        }

        let mut bytes = Vec::new();
        file.take(entry.size).read_to_end(&mut bytes).map_err(|e| {
            // zip surfaces CRC and inflate failures as IO errors
            if e.kind() == std::io::ErrorKind::InvalidData {
                ArchiveError::Corrupt(format!("Damaged payload entry {name}: {e}"))
            } else {
                ArchiveError::Io(e)
            }
        })?;

        let actual = hex::encode(Sha256::digest(&bytes));
        if actual != entry.sha256 {
            return Err(ArchiveError::Corrupt(format!(
                "Checksum mismatch for {name}: expected {}, got {actual}",
                entry.sha256
            )));
        }
        Ok(bytes)
    }
}

fn zip_error(e: ZipError) -> ArchiveError {
    match e {
        ZipError::Io(e) => ArchiveError::Io(e),
        other => ArchiveError::Corrupt(format!("ZIP error: {other}")),
    }
}
