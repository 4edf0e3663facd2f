//! Portable backup archives
//!
//! An archive is a zip file holding `manifest.json` and one
//! `payload/<section>/<path>` entry per profile file. The manifest carries
//! the format version, the source kind and a SHA-256 digest for every entry,
//! which readers verify before any payload is handed out.

mod crypto;
pub mod manifest;
pub mod read;
pub mod write;

pub use crypto::EncryptionParams;
pub use manifest::{ArchiveManifest, ArchiveSource, ManifestEntry, ARCHIVE_FORMAT_VERSION};
pub use read::{read_archive, ArchiveReader};
pub use write::{write_archive, ProfileSnapshot};

use crate::util::PathError;
use thiserror::Error;

/// Name of the manifest entry
pub const MANIFEST_NAME: &str = "manifest.json";

/// Prefix of payload entries
pub const PAYLOAD_PREFIX: &str = "payload";

/// Errors from writing or reading archives
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt archive: {0}")]
    Corrupt(String),

    #[error("Unsupported archive format version {found} (this build reads up to {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Invalid profile snapshot: {0}")]
    Encoding(String),

    #[error("Archive is encrypted and no password was given")]
    PasswordRequired,

    #[error("Could not decrypt archive: wrong password or damaged data")]
    Decryption,

    #[error("Path security error: {0}")]
    Path(#[from] PathError),
}

/// Entry name for a payload file
#[must_use]
pub fn payload_entry_name(section: &str, portable_path: &str) -> String {
    format!("{PAYLOAD_PREFIX}/{section}/{portable_path}")
}
