//! Archive writing

use super::crypto::PayloadCipher;
use super::manifest::{ArchiveManifest, ArchiveSource, ManifestEntry, ARCHIVE_FORMAT_VERSION};
use super::{payload_entry_name, ArchiveError, MANIFEST_NAME};
use crate::provider::Payload;
use crate::util::to_portable;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::ZipWriter;

/// Engine version recorded in new manifests
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything a backup captures
#[derive(Debug, Clone)]
pub struct ProfileSnapshot {
    /// Source profile kind and metadata
    pub source: ArchiveSource,
    /// Staged profile data
    pub payload: Payload,
}

/// Write a snapshot to `archive_path`
///
/// The archive is assembled in a temporary file next to `archive_path` and
/// renamed into place, so a failure never leaves a partial file behind.
///
/// # Errors
/// Returns `Encoding` if the snapshot is structurally invalid and `Io` if
/// the archive cannot be written
pub fn write_archive(
    snapshot: &ProfileSnapshot,
    archive_path: &Path,
    password: Option<&str>,
) -> Result<ArchiveManifest, ArchiveError> {
    let (cipher, encryption) = match password {
        Some(password) => {
            let (cipher, params) = PayloadCipher::create(password)?;
            (Some(cipher), Some(params))
        }
        None => (None, None),
    };

    let mut manifest = ArchiveManifest {
        version: ARCHIVE_FORMAT_VERSION,
        created_at: Utc::now(),
        app_version: APP_VERSION.to_string(),
        source: snapshot.source.clone(),
        sections: snapshot.payload.sections().collect(),
        encryption,
        entries: Vec::with_capacity(snapshot.payload.files().len()),
    };

    // Paths are checked before any bytes are read
    let mut portable_paths = Vec::with_capacity(snapshot.payload.files().len());
    for file in snapshot.payload.files() {
        portable_paths.push(
            to_portable(&file.path).map_err(|e| ArchiveError::Encoding(e.to_string()))?,
        );
    }
    for (file, path) in snapshot.payload.files().iter().zip(&portable_paths) {
        manifest.entries.push(ManifestEntry {
            section: file.section,
            path: path.clone(),
            size: 0,
            sha256: String::new(),
            nonce: cipher.as_ref().map(|_| String::new()),
        });
    }
    manifest.validate().map_err(ArchiveError::Encoding)?;

    let parent = match archive_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(parent)?;

    {
        let mut zip = ZipWriter::new(temp.as_file_mut());
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for (file, entry) in snapshot.payload.files().iter().zip(manifest.entries.iter_mut()) {
            let source = snapshot.payload.staged_path(file);
            let content = fs::read(&source).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ArchiveError::Encoding(format!("Staged file missing: {}", source.display()))
                } else {
                    ArchiveError::Io(e)
                }
            })?;

            let entry_name = payload_entry_name(file.section.as_str(), &entry.path);
            let stored = match &cipher {
                Some(cipher) => {
                    let (ciphertext, nonce) = cipher.seal(&content, entry_name.as_bytes())?;
                    entry.nonce = Some(hex::encode(nonce));
                    ciphertext
                }
                None => content,
            };

            entry.size = stored.len() as u64;
            entry.sha256 = hex::encode(Sha256::digest(&stored));

            zip.start_file(entry_name, options)
                .map_err(zip_error)?;
            zip.write_all(&stored)?;
        }

        let manifest_json = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| ArchiveError::Encoding(format!("Failed to serialize manifest: {e}")))?;
        zip.start_file(MANIFEST_NAME, options).map_err(zip_error)?;
        zip.write_all(&manifest_json)?;
        zip.finish().map_err(zip_error)?;
    }

    temp.as_file().sync_all()?;
    temp.persist(archive_path).map_err(|e| ArchiveError::Io(e.error))?;

    tracing::info!(
        archive = %archive_path.display(),
        entries = manifest.entries.len(),
        bytes = manifest.payload_size(),
        encrypted = manifest.is_encrypted(),
        "Wrote backup archive"
    );
    Ok(manifest)
}

fn zip_error(e: ZipError) -> ArchiveError {
    match e {
        ZipError::Io(e) => ArchiveError::Io(e),
        other => ArchiveError::Encoding(format!("ZIP error: {other}")),
    }
}
