//! CRUD operations for [`Profile`] records.

use rusqlite::params;
use uuid::Uuid;

use murmur_shared::cursor::format_sort_key;
use murmur_shared::Profile;

use crate::database::{now_stored, parse_row_timestamp, Database};
use crate::error::{Result, StoreError};

impl Database {
    /// Insert a new profile with a fresh UUID.
    ///
    /// Username uniqueness is enforced by the schema; a duplicate surfaces as
    /// [`StoreError::UsernameTaken`].
    pub fn create_profile(&self, username: &str) -> Result<Profile> {
        let id = Uuid::new_v4().to_string();
        let now = now_stored();

        self.conn()
            .execute(
                "INSERT INTO profiles (id, username, created_at) VALUES (?1, ?2, ?3)",
                params![id, username, format_sort_key(now)],
            )
            .map_err(map_username_conflict)?;

        tracing::debug!(%id, username, "profile created");

        Ok(Profile {
            id,
            username: username.to_string(),
            created_at: now,
        })
    }

    /// Fetch a single profile by id.
    pub fn get_profile(&self, id: &str) -> Result<Profile> {
        self.conn()
            .query_row(
                "SELECT id, username, created_at FROM profiles WHERE id = ?1",
                params![id],
                row_to_profile,
            )
            .map_err(not_found)
    }

    /// Fetch a single profile by username.
    pub fn get_profile_by_username(&self, username: &str) -> Result<Profile> {
        self.conn()
            .query_row(
                "SELECT id, username, created_at FROM profiles WHERE username = ?1",
                params![username],
                row_to_profile,
            )
            .map_err(not_found)
    }
}

fn row_to_profile(row: &rusqlite::Row<'_>) -> rusqlite::Result<Profile> {
    let ts_str: String = row.get(2)?;
    Ok(Profile {
        id: row.get(0)?,
        username: row.get(1)?,
        created_at: parse_row_timestamp(2, &ts_str)?,
    })
}

fn not_found(e: rusqlite::Error) -> StoreError {
    match e {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
        other => StoreError::Sqlite(other),
    }
}

fn map_username_conflict(e: rusqlite::Error) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(err, Some(msg))
            if err.code == rusqlite::ErrorCode::ConstraintViolation
                && msg.contains("profiles.username") =>
        {
            StoreError::UsernameTaken
        }
        _ => StoreError::Sqlite(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_fetch() {
        let db = Database::in_memory().unwrap();

        let created = db.create_profile("alice").unwrap();
        let by_id = db.get_profile(&created.id).unwrap();
        let by_name = db.get_profile_by_username("alice").unwrap();

        assert_eq!(created, by_id);
        assert_eq!(created, by_name);
    }

    #[test]
    fn duplicate_username_is_conflict() {
        let db = Database::in_memory().unwrap();
        db.create_profile("alice").unwrap();

        let err = db.create_profile("alice").unwrap_err();
        assert!(matches!(err, StoreError::UsernameTaken));
    }

    #[test]
    fn missing_profile_is_not_found() {
        let db = Database::in_memory().unwrap();
        assert!(matches!(
            db.get_profile("nope").unwrap_err(),
            StoreError::NotFound
        ));
    }
}
