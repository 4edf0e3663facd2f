//! CLI command handlers
//!
//! Archive commands (backup, recover, inspect) live in `archive`; registry
//! management lives in `profile`.

pub mod archive;
pub mod profile;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Canonical form of an existing directory, as stored in the registry
pub fn resolve_dir(dir: &Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        anyhow::bail!("Directory does not exist: {}", dir.display());
    }
    dir.canonicalize()
        .with_context(|| format!("Failed to resolve {}", dir.display()))
}
