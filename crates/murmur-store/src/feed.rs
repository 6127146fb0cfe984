//! The paginated feed query.
//!
//! One statement answers a whole page: posts joined with their author
//! profiles, decorated with like aggregates, ordered by the strict total
//! order `(created_at DESC, id DESC)`.  The id tie-break makes the cursor
//! stable even when several posts share a timestamp, and keeping the same
//! order across the whole scan means concurrent inserts never shift
//! previously-seen items backward on resume.

use rusqlite::types::ToSql;
use rusqlite::params_from_iter;

use murmur_shared::{Cursor, FeedFilter, FeedPost, PageRequest, PostPage, Profile};

use crate::database::{parse_row_timestamp, Database};
use crate::error::Result;

impl Database {
    /// Fetch one feed page for the given (possibly anonymous) viewer.
    ///
    /// - `search` matches anywhere in the content, ignoring ASCII case.
    ///   Both sides fold through SQLite's `lower()`, which only folds ASCII,
    ///   so non-ASCII letters match exactly.
    /// - `Mine` restricts to the viewer's own posts; without a viewer it
    ///   returns an empty page.
    /// - A malformed cursor means "start from the beginning".
    /// - One row beyond `limit` is fetched to compute `has_more` without a
    ///   separate count query, then trimmed before returning.
    ///
    /// Any SQLite failure propagates whole; a partial page is never returned.
    pub fn fetch_feed_page(
        &self,
        request: &PageRequest,
        viewer: Option<&str>,
    ) -> Result<PostPage> {
        let mut sql = String::from(
            "SELECT p.id, p.author_id, p.content, p.created_at, p.updated_at,
                    pr.username, pr.created_at,
                    (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id),
                    EXISTS(SELECT 1 FROM likes l
                           WHERE l.post_id = p.id AND l.user_id = ?1)
             FROM posts p
             JOIN profiles pr ON pr.id = p.author_id",
        );

        // A NULL user_id never matches a like row, so is_liked is false for
        // anonymous viewers without a separate query shape.
        let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(viewer.map(str::to_string))];
        let mut clauses: Vec<String> = Vec::new();

        if let Some(search) = request.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            params.push(Box::new(search.to_ascii_lowercase()));
            clauses.push(format!("instr(lower(p.content), ?{}) > 0", params.len()));
        }

        match (request.filter, viewer) {
            (FeedFilter::Mine, None) => {
                // "mine" without an authenticated identity matches nothing.
                return Ok(PostPage {
                    posts: Vec::new(),
                    next_cursor: None,
                    has_more: false,
                });
            }
            (FeedFilter::Mine, Some(viewer_id)) => {
                params.push(Box::new(viewer_id.to_string()));
                clauses.push(format!("p.author_id = ?{}", params.len()));
            }
            (FeedFilter::All, _) => {}
        }

        if let Some(cursor) = Cursor::parse(request.cursor.as_deref()) {
            let key = cursor.created_at_key();
            params.push(Box::new(key.clone()));
            let lt = params.len();
            params.push(Box::new(key));
            let eq = params.len();
            params.push(Box::new(cursor.id));
            let id_lt = params.len();
            clauses.push(format!(
                "(p.created_at < ?{lt} OR (p.created_at = ?{eq} AND p.id < ?{id_lt}))"
            ));
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        // Over-fetch by one to learn whether another page exists.
        params.push(Box::new(i64::from(request.limit) + 1));
        sql.push_str(&format!(
            " ORDER BY p.created_at DESC, p.id DESC LIMIT ?{}",
            params.len()
        ));

        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params), row_to_feed_post)?;

        let mut posts = Vec::new();
        for row in rows {
            posts.push(row?);
        }

        let has_more = posts.len() > request.limit as usize;
        posts.truncate(request.limit as usize);

        let next_cursor = if has_more {
            posts
                .last()
                .map(|last| Cursor::new(last.created_at, last.id.clone()))
        } else {
            None
        };

        tracing::debug!(
            returned = posts.len(),
            has_more,
            filter = ?request.filter,
            "feed page fetched"
        );

        Ok(PostPage {
            posts,
            next_cursor,
            has_more,
        })
    }
}

fn row_to_feed_post(row: &rusqlite::Row<'_>) -> rusqlite::Result<FeedPost> {
    let author_id: String = row.get(1)?;
    let created_str: String = row.get(3)?;
    let updated_str: String = row.get(4)?;
    let profile_created_str: String = row.get(6)?;
    let likes_count: i64 = row.get(7)?;

    Ok(FeedPost {
        id: row.get(0)?,
        author_id: author_id.clone(),
        content: row.get(2)?,
        created_at: parse_row_timestamp(3, &created_str)?,
        updated_at: parse_row_timestamp(4, &updated_str)?,
        profile: Profile {
            id: author_id,
            username: row.get(5)?,
            created_at: parse_row_timestamp(6, &profile_created_str)?,
        },
        likes_count: likes_count.max(0) as u64,
        is_liked: row.get(8)?,
    })
}
