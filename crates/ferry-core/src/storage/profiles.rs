//! Selectable profile registry (CRUD keyed by profile path)

use crate::profile::{Avatar, InvalidColor, Profile, Theme};
use crate::storage::db::DatabaseError;
use crate::util::registry_key;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Registry errors
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("A profile is already registered at {}", .0.display())]
    DuplicatePath(PathBuf),

    #[error("Profile not found: {0}")]
    NotFound(Uuid),

    #[error(transparent)]
    InvalidTheme(#[from] InvalidColor),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<rusqlite::Error> for RegistryError {
    fn from(e: rusqlite::Error) -> Self {
        RegistryError::Database(DatabaseError::Sqlite(e))
    }
}

const SELECT_COLUMNS: &str = "id, path, name, avatar, theme_background, theme_foreground, created_at, updated_at";

/// Profile registry operations
///
/// Each mutation commits its own transaction before returning.
pub struct ProfileStore<'a> {
    conn: &'a Connection,
}

impl<'a> ProfileStore<'a> {
    /// Create a new profile store
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Register a profile directory
    ///
    /// # Errors
    /// Returns `InvalidTheme` if a color is not `#rrggbb` and `DuplicatePath`
    /// if the path is already registered
    pub fn insert(
        &self,
        path: &Path,
        name: &str,
        avatar: Avatar,
        theme: &Theme,
    ) -> Result<Uuid, RegistryError> {
        theme.validate()?;
        let key = registry_key(path);
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let taken: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM profiles WHERE path = ?1)",
            params![key],
            |row| row.get(0),
        )?;
        if taken {
            return Err(RegistryError::DuplicatePath(path.to_path_buf()));
        }

        let id = loop {
            let candidate = Uuid::new_v4();
            let used: bool = tx.query_row(
                r"
                SELECT EXISTS(SELECT 1 FROM profiles WHERE id = ?1)
                    OR EXISTS(SELECT 1 FROM retired_profile_ids WHERE id = ?1)
                ",
                params![candidate.to_string()],
                |row| row.get(0),
            )?;
            if !used {
                break candidate;
            }
        };

        let now = Utc::now().to_rfc3339();
        tx.execute(
            r"
            INSERT INTO profiles
                (id, path, name, avatar, theme_background, theme_foreground, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            ",
            params![
                id.to_string(),
                key,
                name,
                avatar.as_str(),
                theme.background,
                theme.foreground,
                now,
            ],
        )?;
        tx.commit()?;

        tracing::info!(%id, path = %path.display(), name, "Registered profile");
        Ok(id)
    }

    /// Delete a profile record and retire its id
    ///
    /// # Errors
    /// Returns `NotFound` if no record has this id
    pub fn delete(&self, id: Uuid) -> Result<(), RegistryError> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let deleted = tx.execute("DELETE FROM profiles WHERE id = ?1", params![id.to_string()])?;
        if deleted == 0 {
            return Err(RegistryError::NotFound(id));
        }

        tx.execute(
            "INSERT OR IGNORE INTO retired_profile_ids (id, retired_at) VALUES (?1, ?2)",
            params![id.to_string(), Utc::now().to_rfc3339()],
        )?;
        tx.commit()?;

        tracing::info!(%id, "Deleted profile record");
        Ok(())
    }

    /// Get a profile by ID
    ///
    /// # Errors
    /// Returns an error if the profile cannot be retrieved
    pub fn get(&self, id: Uuid) -> Result<Option<Profile>, RegistryError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM profiles WHERE id = ?1");
        let profile = self
            .conn
            .query_row(&sql, params![id.to_string()], profile_from_row)
            .optional()?;
        Ok(profile)
    }

    /// Get the profile registered for a directory
    ///
    /// # Errors
    /// Returns an error if the profile cannot be retrieved
    pub fn get_by_path(&self, path: &Path) -> Result<Option<Profile>, RegistryError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM profiles WHERE path = ?1");
        let profile = self
            .conn
            .query_row(&sql, params![registry_key(path)], profile_from_row)
            .optional()?;
        Ok(profile)
    }

    /// List all profiles
    ///
    /// # Errors
    /// Returns an error if the profiles cannot be listed
    pub fn list_all(&self) -> Result<Vec<Profile>, RegistryError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM profiles ORDER BY name");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], profile_from_row)?;

        let mut profiles = Vec::new();
        for row in rows {
            profiles.push(row?);
        }
        Ok(profiles)
    }

    /// Rename a profile
    ///
    /// # Errors
    /// Returns `NotFound` if no record has this id
    pub fn set_name(&self, id: Uuid, name: &str) -> Result<(), RegistryError> {
        self.update_columns(id, "name = ?2", params![id.to_string(), name])
    }

    /// Change a profile's avatar
    ///
    /// # Errors
    /// Returns `NotFound` if no record has this id
    pub fn set_avatar(&self, id: Uuid, avatar: Avatar) -> Result<(), RegistryError> {
        self.update_columns(id, "avatar = ?2", params![id.to_string(), avatar.as_str()])
    }

    /// Change a profile's theme
    ///
    /// # Errors
    /// Returns `InvalidTheme` if a color is not `#rrggbb` and `NotFound` if no
    /// record has this id
    pub fn set_theme(&self, id: Uuid, theme: &Theme) -> Result<(), RegistryError> {
        theme.validate()?;
        self.update_columns(
            id,
            "theme_background = ?2, theme_foreground = ?3",
            params![id.to_string(), theme.background, theme.foreground],
        )
    }

    fn update_columns(
        &self,
        id: Uuid,
        assignments: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<(), RegistryError> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let sql = format!("UPDATE profiles SET {assignments} WHERE id = ?1");
        let updated = tx.execute(&sql, params)?;
        if updated == 0 {
            return Err(RegistryError::NotFound(id));
        }

        tx.execute(
            "UPDATE profiles SET updated_at = ?2 WHERE id = ?1",
            params![id.to_string(), Utc::now().to_rfc3339()],
        )?;
        tx.commit()?;
        Ok(())
    }
}

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<Profile> {
    let id: String = row.get(0)?;
    let path: String = row.get(1)?;
    let avatar: String = row.get(3)?;
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;

    Ok(Profile {
        id: Uuid::parse_str(&id).map_err(|e| conversion_error(0, e))?,
        path: PathBuf::from(path),
        name: row.get(2)?,
        avatar: avatar.parse().map_err(|e| conversion_error(3, e))?,
        theme: Theme {
            background: row.get(4)?,
            foreground: row.get(5)?,
        },
        created_at: parse_timestamp(6, &created_at)?,
        updated_at: parse_timestamp(7, &updated_at)?,
    })
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn conversion_error<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}
