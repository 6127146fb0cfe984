//! CRUD operations for [`Post`] records.
//!
//! Update and delete are owner-scoped at the query level: the author id is
//! part of the WHERE clause, so a mutation against somebody else's post (or a
//! missing one) affects zero rows and surfaces as [`StoreError::NotFound`].
//! The two cases are deliberately indistinguishable.

use rusqlite::params;
use uuid::Uuid;

use murmur_shared::cursor::format_sort_key;
use murmur_shared::Post;

use crate::database::{now_stored, parse_row_timestamp, Database};
use crate::error::{Result, StoreError};

impl Database {
    /// Insert a new post with a fresh UUID and both timestamps set to now.
    pub fn insert_post(&self, author_id: &str, content: &str) -> Result<Post> {
        let id = Uuid::new_v4().to_string();
        let now = now_stored();
        let key = format_sort_key(now);

        self.conn().execute(
            "INSERT INTO posts (id, author_id, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, author_id, content, key, key],
        )?;

        tracing::debug!(%id, author = author_id, "post inserted");

        Ok(Post {
            id,
            author_id: author_id.to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Fetch a single post by id.
    pub fn get_post(&self, id: &str) -> Result<Post> {
        self.conn()
            .query_row(
                "SELECT id, author_id, content, created_at, updated_at
                 FROM posts WHERE id = ?1",
                params![id],
                row_to_post,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Replace a post's content, scoped to its author.  Bumps `updated_at`.
    pub fn update_post(&self, id: &str, author_id: &str, content: &str) -> Result<Post> {
        let now = now_stored();

        let affected = self.conn().execute(
            "UPDATE posts SET content = ?1, updated_at = ?2
             WHERE id = ?3 AND author_id = ?4",
            params![content, format_sort_key(now), id, author_id],
        )?;

        if affected == 0 {
            return Err(StoreError::NotFound);
        }

        self.get_post(id)
    }

    /// Delete a post, scoped to its author.  Returns whether a row was
    /// removed; `false` covers both "absent" and "not owned".
    pub fn delete_post(&self, id: &str, author_id: &str) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM posts WHERE id = ?1 AND author_id = ?2",
            params![id, author_id],
        )?;
        Ok(affected > 0)
    }
}

fn row_to_post(row: &rusqlite::Row<'_>) -> rusqlite::Result<Post> {
    let created_str: String = row.get(3)?;
    let updated_str: String = row.get(4)?;

    Ok(Post {
        id: row.get(0)?,
        author_id: row.get(1)?,
        content: row.get(2)?,
        created_at: parse_row_timestamp(3, &created_str)?,
        updated_at: parse_row_timestamp(4, &updated_str)?,
    })
}
