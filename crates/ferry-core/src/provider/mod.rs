//! Profile-data providers
//!
//! A provider turns a live profile into a staged [`Payload`] for backup and
//! writes a staged payload into a fresh profile directory during recovery.
//! The staging layout is `<root>/<section>/<relative path>` on both sides.

mod directory;

pub use directory::DirectoryProvider;

use crate::util::{normalize_relative, PathError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by profile-data providers
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Path security error: {0}")]
    Path(#[from] PathError),

    #[error("Database snapshot failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Section of profile data inside an archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Preferences, permissions, containers, search settings
    Preferences,
    /// History and bookmarks
    Places,
    /// Saved logins and the key/certificate databases
    Credentials,
    /// Session restore state
    Session,
    Cookies,
    FormHistory,
    Addons,
    /// Anything not claimed by another section
    Misc,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 8] = [
        ResourceKind::Preferences,
        ResourceKind::Places,
        ResourceKind::Credentials,
        ResourceKind::Session,
        ResourceKind::Cookies,
        ResourceKind::FormHistory,
        ResourceKind::Addons,
        ResourceKind::Misc,
    ];

    /// Sections every snapshot must declare
    pub const REQUIRED: [ResourceKind; 1] = [ResourceKind::Preferences];

    /// Directory name used in staging areas and archives
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Preferences => "preferences",
            ResourceKind::Places => "places",
            ResourceKind::Credentials => "credentials",
            ResourceKind::Session => "session",
            ResourceKind::Cookies => "cookies",
            ResourceKind::FormHistory => "form_history",
            ResourceKind::Addons => "addons",
            ResourceKind::Misc => "misc",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file inside a staged payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadFile {
    pub section: ResourceKind,
    /// Path relative to the profile directory
    pub path: PathBuf,
}

/// Profile data staged on disk, grouped into sections
#[derive(Debug, Clone)]
pub struct Payload {
    root: PathBuf,
    sections: BTreeSet<ResourceKind>,
    files: Vec<PayloadFile>,
}

impl Payload {
    /// Create an empty payload staged under `root`
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            sections: BTreeSet::new(),
            files: Vec::new(),
        }
    }

    /// Declare a section, even if it ends up holding no files
    pub fn declare(&mut self, section: ResourceKind) {
        self.sections.insert(section);
    }

    /// Record a file already staged at [`Payload::staged_path`]
    ///
    /// # Errors
    /// Returns an error if the relative path is unsafe
    pub fn add_file(&mut self, section: ResourceKind, path: &Path) -> Result<(), PathError> {
        let path = normalize_relative(path)?;
        self.sections.insert(section);
        self.files.push(PayloadFile { section, path });
        Ok(())
    }

    /// Staging root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Declared sections
    pub fn sections(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.sections.iter().copied()
    }

    /// Whether a section was declared
    #[must_use]
    pub fn has_section(&self, section: ResourceKind) -> bool {
        self.sections.contains(&section)
    }

    /// Staged files
    #[must_use]
    pub fn files(&self) -> &[PayloadFile] {
        &self.files
    }

    /// Where a file lives inside the staging root
    #[must_use]
    pub fn staged_path(&self, file: &PayloadFile) -> PathBuf {
        staged_path(&self.root, file.section, &file.path)
    }
}

/// Location of a section file inside a staging root
#[must_use]
pub fn staged_path(root: &Path, section: ResourceKind, relative: &Path) -> PathBuf {
    root.join(section.as_str()).join(relative)
}

/// Supplies profile data for backups and consumes it during recovery
pub trait ProfileDataProvider {
    /// Stage the profile's backup-relevant data under `staging_dir`
    ///
    /// # Errors
    /// Returns an error if the profile cannot be read or staged
    fn export(&self, staging_dir: &Path) -> Result<Payload, ProviderError>;

    /// Write a staged payload into `target_dir`, which already exists
    ///
    /// # Errors
    /// Returns an error if any file cannot be written
    fn import(&self, payload: &Payload, target_dir: &Path) -> Result<(), ProviderError>;
}
