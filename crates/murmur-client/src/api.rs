//! The service boundary the feed session talks to.
//!
//! Authentication, permission enforcement and persistence all live behind
//! this trait; the session only issues owner-scoped requests and interprets
//! the error taxonomy coming back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use murmur_shared::{FeedError, FeedPost, PageRequest, PostPage};

/// The authenticated viewer, as reported by the auth collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
}

/// Everything the feed needs from the auth/storage collaborator.
///
/// Every mutation is a single independent round trip; there is no
/// cross-call transaction and no automatic retry.
#[async_trait]
pub trait FeedApi: Send + Sync {
    /// The current authenticated identity, if any.
    fn current_identity(&self) -> Option<Identity>;

    /// Fetch one feed page.  Fails whole; never returns a partial page.
    async fn fetch_page(&self, request: PageRequest) -> Result<PostPage, FeedError>;

    /// Create a post authored by the current identity.
    async fn create_post(&self, content: String) -> Result<FeedPost, FeedError>;

    /// Replace the content of one of the caller's own posts.
    async fn update_post(&self, post_id: &str, content: String) -> Result<FeedPost, FeedError>;

    /// Delete one of the caller's own posts.
    async fn delete_post(&self, post_id: &str) -> Result<(), FeedError>;

    /// Flip the like relation between the current identity and a post.
    /// Returns the new state: `true` if the post is now liked.
    async fn toggle_like(&self, post_id: &str) -> Result<bool, FeedError>;
}
