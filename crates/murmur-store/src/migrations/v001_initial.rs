//! v001 -- Initial schema creation.
//!
//! Creates the three core tables: `profiles`, `posts`, and `likes`.
//!
//! Timestamps are stored as fixed-width RFC 3339 text (microsecond precision,
//! `Z` suffix) so that lexicographic comparison agrees with chronological
//! order; the feed's cursor predicate relies on this.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Profiles
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS profiles (
    id         TEXT PRIMARY KEY NOT NULL,    -- UUID v4
    username   TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL                 -- ISO-8601 / RFC-3339
);

-- ----------------------------------------------------------------
-- Posts
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS posts (
    id         TEXT PRIMARY KEY NOT NULL,    -- UUID v4
    author_id  TEXT NOT NULL,                -- FK -> profiles(id)
    content    TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,                -- >= created_at

    FOREIGN KEY (author_id) REFERENCES profiles(id) ON DELETE CASCADE
);

-- Feed scan order: (created_at DESC, id DESC).
CREATE INDEX IF NOT EXISTS idx_posts_created_id
    ON posts(created_at DESC, id DESC);

CREATE INDEX IF NOT EXISTS idx_posts_author_id ON posts(author_id);

-- ----------------------------------------------------------------
-- Likes
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS likes (
    post_id    TEXT NOT NULL,                -- FK -> posts(id)
    user_id    TEXT NOT NULL,                -- FK -> profiles(id)
    created_at TEXT NOT NULL,

    PRIMARY KEY (post_id, user_id),
    FOREIGN KEY (post_id) REFERENCES posts(id)    ON DELETE CASCADE,
    FOREIGN KEY (user_id) REFERENCES profiles(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_likes_post_id ON likes(post_id);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
