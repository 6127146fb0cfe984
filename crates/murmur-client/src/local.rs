//! In-process [`FeedApi`] implementation over `murmur-store`.
//!
//! This is the mutation dispatch boundary: input validation and identity
//! checks happen here, store errors are mapped into the user-facing taxonomy,
//! and unexpected failures are logged at error level and surfaced as generic
//! messages rather than internal detail.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use murmur_shared::validate::{validate_post_content, validate_username};
use murmur_shared::{FeedError, FeedPost, PageRequest, PostPage};
use murmur_store::{Database, StoreError};

use crate::api::{FeedApi, Identity};

/// Feed API backed by the local store, acting for one (optional) identity.
pub struct LocalFeedApi {
    db: Arc<Mutex<Database>>,
    identity: Option<Identity>,
}

impl LocalFeedApi {
    /// Wrap an open database, acting as the given identity (or anonymously).
    pub fn new(db: Arc<Mutex<Database>>, identity: Option<Identity>) -> Self {
        Self { db, identity }
    }

    /// Create a profile for a new account and return an API handle
    /// authenticated as it.  Duplicate usernames surface as a field-scoped
    /// conflict, matching sign-up behavior.
    pub fn sign_up(db: Arc<Mutex<Database>>, username: &str) -> Result<Self, FeedError> {
        validate_username(username)?;

        let profile = {
            let guard = lock(&db)?;
            guard.create_profile(username).map_err(|e| match e {
                StoreError::UsernameTaken => {
                    FeedError::conflict("username", "Username is already taken")
                }
                other => unexpected(other, "sign up"),
            })?
        };

        tracing::info!(user = %profile.id, username, "profile created");

        Ok(Self {
            db,
            identity: Some(Identity {
                user_id: profile.id,
                username: profile.username,
            }),
        })
    }

    fn require_identity(&self) -> Result<&Identity, FeedError> {
        self.identity.as_ref().ok_or(FeedError::Unauthorized)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Database>, FeedError> {
        lock(&self.db)
    }
}

fn lock(db: &Arc<Mutex<Database>>) -> Result<MutexGuard<'_, Database>, FeedError> {
    db.lock().map_err(|e| {
        tracing::error!(error = %e, "store lock poisoned");
        FeedError::MutationFailed("access storage")
    })
}

/// Log an unexpected store failure and degrade it to a generic message.
fn unexpected(e: StoreError, op: &'static str) -> FeedError {
    tracing::error!(error = %e, op, "storage failure");
    FeedError::MutationFailed(op)
}

#[async_trait]
impl FeedApi for LocalFeedApi {
    fn current_identity(&self) -> Option<Identity> {
        self.identity.clone()
    }

    async fn fetch_page(&self, request: PageRequest) -> Result<PostPage, FeedError> {
        let db = self.lock().map_err(|_| FeedError::FetchFailed)?;
        db.fetch_feed_page(&request, self.identity.as_ref().map(|i| i.user_id.as_str()))
            .map_err(|e| {
                tracing::error!(error = %e, "feed query failed");
                FeedError::FetchFailed
            })
    }

    async fn create_post(&self, content: String) -> Result<FeedPost, FeedError> {
        let identity = self.require_identity()?;
        let content = validate_post_content(&content)?;

        let db = self.lock()?;
        let post = db
            .insert_post(&identity.user_id, &content)
            .map_err(|e| unexpected(e, "create post"))?;
        let profile = db
            .get_profile(&identity.user_id)
            .map_err(|e| unexpected(e, "create post"))?;

        Ok(FeedPost {
            id: post.id,
            author_id: post.author_id,
            content: post.content,
            created_at: post.created_at,
            updated_at: post.updated_at,
            profile,
            likes_count: 0,
            is_liked: false,
        })
    }

    async fn update_post(&self, post_id: &str, content: String) -> Result<FeedPost, FeedError> {
        let identity = self.require_identity()?;
        let content = validate_post_content(&content)?;

        let db = self.lock()?;
        let post = db
            .update_post(post_id, &identity.user_id, &content)
            .map_err(|e| match e {
                StoreError::NotFound => FeedError::NotFoundOrForbidden,
                other => unexpected(other, "update post"),
            })?;
        let profile = db
            .get_profile(&identity.user_id)
            .map_err(|e| unexpected(e, "update post"))?;
        let likes_count = db
            .count_likes(&post.id)
            .map_err(|e| unexpected(e, "update post"))?;
        let is_liked = db
            .like_exists(&post.id, &identity.user_id)
            .map_err(|e| unexpected(e, "update post"))?;

        Ok(FeedPost {
            id: post.id,
            author_id: post.author_id,
            content: post.content,
            created_at: post.created_at,
            updated_at: post.updated_at,
            profile,
            likes_count,
            is_liked,
        })
    }

    async fn delete_post(&self, post_id: &str) -> Result<(), FeedError> {
        let identity = self.require_identity()?;

        let db = self.lock()?;
        let removed = db
            .delete_post(post_id, &identity.user_id)
            .map_err(|e| unexpected(e, "delete post"))?;

        if !removed {
            return Err(FeedError::NotFoundOrForbidden);
        }
        Ok(())
    }

    async fn toggle_like(&self, post_id: &str) -> Result<bool, FeedError> {
        let identity = self.require_identity()?;

        let db = self.lock()?;
        if db
            .like_exists(post_id, &identity.user_id)
            .map_err(|e| unexpected(e, "toggle like"))?
        {
            db.delete_like(post_id, &identity.user_id)
                .map_err(|e| unexpected(e, "toggle like"))?;
            Ok(false)
        } else {
            // A like on a missing post is the post being gone, not an
            // internal error.
            db.insert_like(post_id, &identity.user_id).map_err(|e| match e {
                StoreError::NotFound => FeedError::NotFoundOrForbidden,
                other => unexpected(other, "toggle like"),
            })?;
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_shared::{FeedFilter, PageRequest};

    fn open_db() -> Arc<Mutex<Database>> {
        Arc::new(Mutex::new(Database::in_memory().unwrap()))
    }

    #[tokio::test]
    async fn anonymous_mutations_are_unauthorized() {
        let api = LocalFeedApi::new(open_db(), None);

        assert_eq!(
            api.create_post("hi".into()).await.unwrap_err(),
            FeedError::Unauthorized
        );
        assert_eq!(
            api.delete_post("whatever").await.unwrap_err(),
            FeedError::Unauthorized
        );
        assert_eq!(
            api.toggle_like("whatever").await.unwrap_err(),
            FeedError::Unauthorized
        );
    }

    #[tokio::test]
    async fn sign_up_conflicts_are_field_scoped() {
        let db = open_db();
        LocalFeedApi::sign_up(db.clone(), "alice").unwrap();

        let err = LocalFeedApi::sign_up(db, "alice").err().unwrap();
        assert_eq!(err.field(), Some("username"));
        assert_eq!(err.to_string(), "Username is already taken");
    }

    #[tokio::test]
    async fn create_validates_and_stores_trimmed_content() {
        let api = LocalFeedApi::sign_up(open_db(), "alice").unwrap();

        let err = api.create_post("   ".into()).await.unwrap_err();
        assert_eq!(err.field(), Some("content"));

        let post = api.create_post("  hello  ".into()).await.unwrap();
        assert_eq!(post.content, "hello");
        assert_eq!(post.profile.username, "alice");
        assert_eq!(post.likes_count, 0);
        assert!(!post.is_liked);
    }

    #[tokio::test]
    async fn foreign_mutations_are_not_found_or_forbidden() {
        let db = open_db();
        let alice = LocalFeedApi::sign_up(db.clone(), "alice").unwrap();
        let mallory = LocalFeedApi::sign_up(db, "mallory").unwrap();

        let post = alice.create_post("mine".into()).await.unwrap();

        assert_eq!(
            mallory
                .update_post(&post.id, "hijacked".into())
                .await
                .unwrap_err(),
            FeedError::NotFoundOrForbidden
        );
        assert_eq!(
            mallory.delete_post(&post.id).await.unwrap_err(),
            FeedError::NotFoundOrForbidden
        );
        // Missing post looks exactly the same.
        assert_eq!(
            mallory.delete_post("no-such-id").await.unwrap_err(),
            FeedError::NotFoundOrForbidden
        );
    }

    #[tokio::test]
    async fn like_toggle_round_trip() {
        let db = open_db();
        let alice = LocalFeedApi::sign_up(db.clone(), "alice").unwrap();
        let bob = LocalFeedApi::sign_up(db.clone(), "bob").unwrap();
        let carol = LocalFeedApi::sign_up(db.clone(), "carol").unwrap();
        let dave = LocalFeedApi::sign_up(db, "dave").unwrap();

        let post = alice.create_post("popular".into()).await.unwrap();
        for api in [&alice, &bob, &carol] {
            assert!(api.toggle_like(&post.id).await.unwrap());
        }

        // Viewer dave: 3 likes, not liked; toggling goes 3 -> 4 -> 3.
        let page = dave.fetch_page(PageRequest::default()).await.unwrap();
        assert_eq!(page.posts[0].likes_count, 3);
        assert!(!page.posts[0].is_liked);

        assert!(dave.toggle_like(&post.id).await.unwrap());
        let page = dave.fetch_page(PageRequest::default()).await.unwrap();
        assert_eq!(page.posts[0].likes_count, 4);
        assert!(page.posts[0].is_liked);

        assert!(!dave.toggle_like(&post.id).await.unwrap());
        let page = dave.fetch_page(PageRequest::default()).await.unwrap();
        assert_eq!(page.posts[0].likes_count, 3);
        assert!(!page.posts[0].is_liked);
    }

    #[tokio::test]
    async fn like_on_missing_post_reports_not_found() {
        let api = LocalFeedApi::sign_up(open_db(), "alice").unwrap();
        assert_eq!(
            api.toggle_like("no-such-post").await.unwrap_err(),
            FeedError::NotFoundOrForbidden
        );
    }

    #[tokio::test]
    async fn mine_filter_through_the_boundary() {
        let db = open_db();
        let alice = LocalFeedApi::sign_up(db.clone(), "alice").unwrap();
        let bob = LocalFeedApi::sign_up(db.clone(), "bob").unwrap();
        alice.create_post("a post".into()).await.unwrap();
        bob.create_post("b post".into()).await.unwrap();

        let mine = PageRequest::new(None, FeedFilter::Mine, 10);

        let page = alice.fetch_page(mine.clone()).await.unwrap();
        assert_eq!(page.posts.len(), 1);
        assert_eq!(page.posts[0].profile.username, "alice");

        let anonymous = LocalFeedApi::new(db, None);
        let page = anonymous.fetch_page(mine).await.unwrap();
        assert!(page.posts.is_empty());
    }
}
