//! Selectable profile records and their display metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Avatar identifier from the fixed icon set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Avatar {
    Book,
    Briefcase,
    Flower,
    Heart,
    Shopping,
    #[default]
    Star,
}

impl Avatar {
    /// Every avatar in the icon set
    pub const ALL: [Avatar; 6] = [
        Avatar::Book,
        Avatar::Briefcase,
        Avatar::Flower,
        Avatar::Heart,
        Avatar::Shopping,
        Avatar::Star,
    ];

    /// Identifier as stored in the registry and in archives
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Avatar::Book => "book",
            Avatar::Briefcase => "briefcase",
            Avatar::Flower => "flower",
            Avatar::Heart => "heart",
            Avatar::Shopping => "shopping",
            Avatar::Star => "star",
        }
    }
}

impl fmt::Display for Avatar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an avatar identifier outside the icon set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown avatar: {0}")]
pub struct UnknownAvatar(pub String);

impl FromStr for Avatar {
    type Err = UnknownAvatar;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Avatar::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownAvatar(s.to_string()))
    }
}

/// Error for a theme color that is not `#rrggbb`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid theme color: {0} (expected #rrggbb)")]
pub struct InvalidColor(pub String);

/// Profile theme as a background/foreground color pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Background color, `#rrggbb`
    pub background: String,
    /// Foreground color, `#rrggbb`
    pub foreground: String,
}

impl Theme {
    /// Create a validated theme
    ///
    /// # Errors
    /// Returns an error if either color is not `#rrggbb`
    pub fn new(background: &str, foreground: &str) -> Result<Self, InvalidColor> {
        let theme = Self {
            background: background.to_ascii_lowercase(),
            foreground: foreground.to_ascii_lowercase(),
        };
        theme.validate()?;
        Ok(theme)
    }

    /// Check both colors are `#rrggbb`
    ///
    /// # Errors
    /// Returns the first invalid color
    pub fn validate(&self) -> Result<(), InvalidColor> {
        for color in [&self.background, &self.foreground] {
            let valid = color.len() == 7
                && color.starts_with('#')
                && color[1..].chars().all(|c| c.is_ascii_hexdigit());
            if !valid {
                return Err(InvalidColor(color.clone()));
            }
        }
        Ok(())
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: "#f9f9fb".to_string(),
            foreground: "#15141a".to_string(),
        }
    }
}

/// The user-visible identity of a profile
///
/// This is the part of a record that travels inside archives; `id` and
/// `path` belong to the site where the profile lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileMetadata {
    pub name: String,
    pub avatar: Avatar,
    pub theme: Theme,
}

/// A selectable profile record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique identifier, never reused
    pub id: Uuid,
    /// Profile directory
    pub path: PathBuf,
    /// Display name
    pub name: String,
    /// Avatar from the fixed icon set
    pub avatar: Avatar,
    /// Theme colors
    pub theme: Theme,
    /// When created
    pub created_at: DateTime<Utc>,
    /// When last updated
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Display metadata of this record
    #[must_use]
    pub fn metadata(&self) -> ProfileMetadata {
        ProfileMetadata {
            name: self.name.clone(),
            avatar: self.avatar,
            theme: self.theme.clone(),
        }
    }
}

/// Implicit name of a legacy profile, derived from its directory
///
/// Salted directory names like `x8e2k1pq.default-release` drop the salt.
#[must_use]
pub fn legacy_profile_name(dir: &Path) -> String {
    let dir_name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let name = match dir_name.split_once('.') {
        Some((salt, rest))
            if salt.len() == 8 && !rest.is_empty() && salt.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            rest.to_string()
        }
        _ => dir_name,
    };

    if name.is_empty() {
        "default".to_string()
    } else {
        name
    }
}
