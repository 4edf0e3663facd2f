//! Engine configuration (`<data dir>/config.toml`)

use crate::profile::{Avatar, InvalidColor, ProfileMetadata, Theme};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid default theme: {0}")]
    Theme(#[from] InvalidColor),
}

/// Metadata given to recovered profiles that inherit nothing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultProfile {
    pub name: String,
    pub avatar: Avatar,
    pub theme_background: String,
    pub theme_foreground: String,
}

impl Default for DefaultProfile {
    fn default() -> Self {
        let theme = Theme::default();
        Self {
            name: "Recovered profile".to_string(),
            avatar: Avatar::default(),
            theme_background: theme.background,
            theme_foreground: theme.foreground,
        }
    }
}

impl DefaultProfile {
    /// Defaults as profile metadata
    #[must_use]
    pub fn metadata(&self) -> ProfileMetadata {
        ProfileMetadata {
            name: self.name.clone(),
            avatar: self.avatar,
            theme: Theme {
                background: self.theme_background.clone(),
                foreground: self.theme_foreground.clone(),
            },
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FerryConfig {
    /// When false, every profile is treated as legacy
    pub selectable_profiles_enabled: bool,
    /// Browser binary used to relaunch into recovered profiles
    pub browser_binary: Option<PathBuf>,
    /// Metadata for recovered profiles without inherited metadata
    pub default_profile: DefaultProfile,
}

impl Default for FerryConfig {
    fn default() -> Self {
        Self {
            selectable_profiles_enabled: true,
            browser_binary: None,
            default_profile: DefaultProfile::default(),
        }
    }
}

impl FerryConfig {
    /// Load configuration, falling back to defaults if the file is missing
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: FerryConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.default_profile.metadata().theme.validate()?;

        Ok(config)
    }

    /// Default data directory (`~/.ferry`)
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".ferry"))
            .unwrap_or_else(|| PathBuf::from(".ferry"))
    }

    /// Config file inside a data directory
    #[must_use]
    pub fn config_path(data_dir: &Path) -> PathBuf {
        data_dir.join("config.toml")
    }

    /// Registry database inside a data directory
    #[must_use]
    pub fn database_path(data_dir: &Path) -> PathBuf {
        data_dir.join("profiles.db")
    }
}
