//! Like relation: `(post_id, user_id)` rows, existence means "liked".

use rusqlite::params;

use murmur_shared::cursor::format_sort_key;

use crate::database::{now_stored, Database};
use crate::error::{Result, StoreError};

impl Database {
    /// Number of likes on a post.
    pub fn count_likes(&self, post_id: &str) -> Result<u64> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM likes WHERE post_id = ?1",
            params![post_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Whether the given user has liked the given post.
    pub fn like_exists(&self, post_id: &str, user_id: &str) -> Result<bool> {
        let exists: bool = self.conn().query_row(
            "SELECT EXISTS(SELECT 1 FROM likes WHERE post_id = ?1 AND user_id = ?2)",
            params![post_id, user_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Insert a like.  Idempotent; returns whether a new row was created.
    /// A missing post or user trips the foreign key and surfaces as
    /// [`StoreError::NotFound`].
    pub fn insert_like(&self, post_id: &str, user_id: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute(
                "INSERT OR IGNORE INTO likes (post_id, user_id, created_at)
                 VALUES (?1, ?2, ?3)",
                params![post_id, user_id, format_sort_key(now_stored())],
            )
            .map_err(|e| match e {
                // OR IGNORE swallows the primary-key conflict, so any
                // remaining constraint violation is a foreign key.
                rusqlite::Error::SqliteFailure(err, _)
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    StoreError::NotFound
                }
                other => StoreError::Sqlite(other),
            })?;
        Ok(affected > 0)
    }

    /// Remove a like.  Returns whether a row was removed.
    pub fn delete_like(&self, post_id: &str, user_id: &str) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM likes WHERE post_id = ?1 AND user_id = ?2",
            params![post_id, user_id],
        )?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_lifecycle() {
        let db = Database::in_memory().unwrap();
        let alice = db.create_profile("alice").unwrap();
        let bob = db.create_profile("bob").unwrap();
        let post = db.insert_post(&alice.id, "likeable").unwrap();

        assert_eq!(db.count_likes(&post.id).unwrap(), 0);
        assert!(!db.like_exists(&post.id, &bob.id).unwrap());

        assert!(db.insert_like(&post.id, &bob.id).unwrap());
        // Double insert is a no-op, count never double-counts.
        assert!(!db.insert_like(&post.id, &bob.id).unwrap());

        assert_eq!(db.count_likes(&post.id).unwrap(), 1);
        assert!(db.like_exists(&post.id, &bob.id).unwrap());

        assert!(db.delete_like(&post.id, &bob.id).unwrap());
        assert!(!db.delete_like(&post.id, &bob.id).unwrap());
        assert_eq!(db.count_likes(&post.id).unwrap(), 0);
    }
}
