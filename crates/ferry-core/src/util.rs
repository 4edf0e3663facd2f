//! Path helpers shared by the archive codec and profile-data providers

use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Errors related to path validation
#[derive(Error, Debug)]
pub enum PathError {
    #[error("Path traversal attempt detected: {0}")]
    TraversalAttempt(String),

    #[error("Invalid path component: {0}")]
    InvalidComponent(String),

    #[error("Path is not valid UTF-8: {0}")]
    NotUtf8(String),
}

/// Join an untrusted relative path onto `root`
///
/// The relative path must not be absolute and must not climb above `root`.
///
/// # Errors
/// Returns an error if the path would escape the root directory
pub fn safe_join(root: &Path, untrusted_path: &Path) -> Result<PathBuf, PathError> {
    let normalized = normalize_relative(untrusted_path)?;
    Ok(root.join(normalized))
}

/// Normalize a relative path, rejecting anything that escapes its base
///
/// # Errors
/// Returns an error for absolute paths, `..` above the base, null bytes, or
/// paths that normalize to nothing
pub fn normalize_relative(path: &Path) -> Result<PathBuf, PathError> {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Normal(c) => {
                if c.to_string_lossy().contains('\0') {
                    return Err(PathError::InvalidComponent(
                        "Null byte in path".to_string(),
                    ));
                }
                normalized.push(c);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return Err(PathError::TraversalAttempt(path.display().to_string()));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(PathError::InvalidComponent(format!(
                    "Absolute path not allowed: {}",
                    path.display()
                )));
            }
        }
    }

    if normalized.as_os_str().is_empty() {
        return Err(PathError::InvalidComponent(format!(
            "Empty relative path: {}",
            path.display()
        )));
    }

    Ok(normalized)
}

/// Render a relative path with `/` separators for storage inside archives
///
/// # Errors
/// Returns an error if the path is unsafe or not valid UTF-8
pub fn to_portable(path: &Path) -> Result<String, PathError> {
    let normalized = normalize_relative(path)?;
    let mut parts = Vec::new();
    for component in normalized.components() {
        let part = component
            .as_os_str()
            .to_str()
            .ok_or_else(|| PathError::NotUtf8(path.display().to_string()))?;
        parts.push(part);
    }
    Ok(parts.join("/"))
}

/// Normalize a profile path into the key used by the registry
///
/// Drops `.` components and trailing separators so `a/b/` and `a/./b` map to
/// the same record.
#[must_use]
pub fn registry_key(path: &Path) -> String {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect::<PathBuf>()
        .to_string_lossy()
        .into_owned()
}

/// Reduce a display name to something safe inside a file name
#[must_use]
pub fn sanitize_file_component(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' => c,
            _ => '-',
        })
        .collect();
    let cleaned = cleaned.trim_matches('-');

    if cleaned.is_empty() {
        "profile".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Build a salted profile directory name like `k3j9x0qa.work`
#[must_use]
pub fn salted_dir_name(label: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{}.{}", &salt[..8], sanitize_file_component(label))
}
