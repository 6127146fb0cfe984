//! Domain model structs.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to a presentation layer over IPC or HTTP.  Post and profile ids
//! are UUID v4 strings as assigned by the store; the client layer additionally
//! uses `temp-`-prefixed placeholder ids for unconfirmed creates, which is why
//! ids are plain strings rather than `uuid::Uuid`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::cursor::Cursor;

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// A user profile.  One per authenticated account; the account itself lives
/// in the external auth collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    /// Unique handle, enforced at write time by the store.
    pub username: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Post
// ---------------------------------------------------------------------------

/// A stored post row, without any viewer-dependent decoration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Equals `created_at` until the first edit; never earlier than it.
    pub updated_at: DateTime<Utc>,
}

/// The display unit of the feed: a post joined with its author profile and
/// the viewer-relative like aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedPost {
    pub id: String,
    pub author_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub profile: Profile,
    pub likes_count: u64,
    pub is_liked: bool,
}

// ---------------------------------------------------------------------------
// Like
// ---------------------------------------------------------------------------

/// A like row.  Composite key `(post_id, user_id)`; existence means "liked".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Like {
    pub post_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Feed queries
// ---------------------------------------------------------------------------

/// Which posts a feed query returns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeedFilter {
    #[default]
    All,
    /// Only the authenticated viewer's own posts.  Without a viewer this
    /// yields an empty page.
    Mine,
}

/// Parameters for one feed page fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageRequest {
    /// Case-insensitive substring match over post content.
    pub search: Option<String>,
    pub filter: FeedFilter,
    /// Opaque cursor token from a previous page, wire form.
    pub cursor: Option<String>,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(search: Option<String>, filter: FeedFilter, limit: u32) -> Self {
        Self {
            search,
            filter,
            cursor: None,
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn with_cursor(mut self, cursor: Option<String>) -> Self {
        self.cursor = cursor;
        self
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, FeedFilter::All, DEFAULT_PAGE_SIZE)
    }
}

/// One page of feed results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostPage {
    pub posts: Vec<FeedPost>,
    /// Resumption point, present only when `has_more` is true.
    pub next_cursor: Option<Cursor>,
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_clamps_limit() {
        assert_eq!(PageRequest::new(None, FeedFilter::All, 0).limit, 1);
        assert_eq!(PageRequest::new(None, FeedFilter::All, 10).limit, 10);
        assert_eq!(PageRequest::new(None, FeedFilter::All, 999).limit, 50);
    }
}
