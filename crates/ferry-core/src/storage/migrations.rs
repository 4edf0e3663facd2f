//! Database migrations

use rusqlite::Connection;

use super::db::DatabaseError;

const CURRENT_VERSION: i32 = 1;

/// Run all pending migrations
///
/// # Errors
/// Returns an error if migrations fail or the database is newer than this build
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version > CURRENT_VERSION {
        return Err(DatabaseError::Migration(format!(
            "Registry schema version {version} is newer than supported version {CURRENT_VERSION}"
        )));
    }

    if version < 1 {
        migrate_v1(conn)?;
    }

    conn.pragma_update(None, "user_version", CURRENT_VERSION)?;
    Ok(())
}

fn migrate_v1(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        r"
        -- Selectable profiles, one row per profile directory
        CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            path TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            avatar TEXT NOT NULL,
            theme_background TEXT NOT NULL,
            theme_foreground TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        -- Ids of deleted profiles; never handed out again
        CREATE TABLE IF NOT EXISTS retired_profile_ids (
            id TEXT PRIMARY KEY,
            retired_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_profiles_name ON profiles(name);
        ",
    )?;

    Ok(())
}
