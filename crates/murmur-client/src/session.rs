//! The feed session: pagination, search/filter, mutation dispatch and the
//! displayed list.
//!
//! Completion handling is split from issuance (`begin_fetch` /
//! `complete_fetch`) and every fetch carries a monotonic sequence number.
//! A completion whose number is no longer the latest issued is discarded:
//! superseding calls are the only form of cancellation, and the last issued
//! fetch wins the slot.  The async methods are thin wrappers that issue,
//! await and complete in one go.
//!
//! Overlay precedence: until a mutation is explicitly reconciled or rolled
//! back, its overlay entry wins over the base list for matching ids, so a
//! fetch that completes mid-flight can never transiently undo it.

use std::collections::HashSet;

use chrono::Utc;

use murmur_shared::{Cursor, FeedError, FeedFilter, FeedPost, PageRequest, PostPage, Profile};

use crate::api::FeedApi;
use crate::likes::LikeOverlay;
use crate::overlay::{temp_post_id, PostOverlay};

/// Per-dispatcher request state: `loading` is true only while that
/// dispatcher's own request is outstanding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationState {
    pub loading: bool,
    pub error: Option<FeedError>,
}

impl MutationState {
    fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    fn finish(&mut self, error: Option<FeedError>) {
        self.loading = false;
        self.error = error;
    }
}

/// One viewer's live view of the feed.
pub struct FeedSession<A: FeedApi> {
    api: A,

    search: Option<String>,
    filter: FeedFilter,
    limit: u32,

    /// Server-confirmed posts accumulated across pages, scan order.
    base: Vec<FeedPost>,
    next_cursor: Option<Cursor>,
    has_more: bool,

    fetch_seq: u64,
    loading: bool,
    fetch_error: Option<FeedError>,

    overlay: PostOverlay,
    likes: LikeOverlay,

    create: MutationState,
    update: MutationState,
    delete: MutationState,
    like: MutationState,
}

impl<A: FeedApi> FeedSession<A> {
    pub fn new(api: A, limit: u32) -> Self {
        Self {
            api,
            search: None,
            filter: FeedFilter::All,
            limit,
            base: Vec::new(),
            next_cursor: None,
            has_more: false,
            fetch_seq: 0,
            loading: false,
            fetch_error: None,
            overlay: PostOverlay::new(),
            likes: LikeOverlay::new(),
            create: MutationState::default(),
            update: MutationState::default(),
            delete: MutationState::default(),
            like: MutationState::default(),
        }
    }

    // ------------------------------------------------------------------
    // Fetching
    // ------------------------------------------------------------------

    /// Issue a fetch: bump the sequence and snapshot the request parameters.
    pub fn begin_fetch(&mut self, cursor: Option<&Cursor>) -> (u64, PageRequest) {
        self.fetch_seq += 1;
        self.loading = true;
        let request = PageRequest::new(self.search.clone(), self.filter, self.limit)
            .with_cursor(cursor.map(Cursor::encode));
        (self.fetch_seq, request)
    }

    /// Apply a completed fetch.  Stale completions (an intervening
    /// `begin_fetch` bumped the sequence) are discarded.
    pub fn complete_fetch(
        &mut self,
        seq: u64,
        append: bool,
        result: Result<PostPage, FeedError>,
    ) {
        if seq != self.fetch_seq {
            tracing::debug!(seq, latest = self.fetch_seq, "discarding superseded fetch");
            return;
        }
        self.loading = false;

        match result {
            Ok(page) => {
                if append {
                    self.base.extend(page.posts);
                } else {
                    self.base = page.posts;
                }
                self.has_more = page.has_more;
                self.next_cursor = page.next_cursor;
                self.fetch_error = None;

                let server_ids: HashSet<String> =
                    self.base.iter().map(|p| p.id.clone()).collect();
                self.overlay = self.overlay.reconcile(&server_ids);
                self.likes = self.likes.reconcile(&self.base);
            }
            Err(e) => {
                // The current display stays intact; the caller retries
                // manually.
                self.fetch_error = Some(e);
            }
        }
    }

    /// Reload the first page with the current search and filter.
    pub async fn refresh(&mut self) {
        let (seq, request) = self.begin_fetch(None);
        let result = self.api.fetch_page(request).await;
        self.complete_fetch(seq, false, result);
    }

    /// Fetch the next page and append it.  No-op while loading, at the end
    /// of the scan, or without a resumption cursor.
    pub async fn load_more(&mut self) {
        if self.loading || !self.has_more {
            return;
        }
        let Some(cursor) = self.next_cursor.clone() else {
            return;
        };
        let (seq, request) = self.begin_fetch(Some(&cursor));
        let result = self.api.fetch_page(request).await;
        self.complete_fetch(seq, true, result);
    }

    /// Change the search needle and reload from the top.
    pub async fn set_search(&mut self, search: Option<String>) {
        self.search = search.filter(|s| !s.trim().is_empty());
        self.next_cursor = None;
        self.refresh().await;
    }

    /// Change the feed filter and reload from the top.
    pub async fn set_filter(&mut self, filter: FeedFilter) {
        self.filter = filter;
        self.next_cursor = None;
        self.refresh().await;
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Create a post: show it immediately under a temporary id, then swap in
    /// the server row or roll the entry back.
    pub async fn create_post(&mut self, content: String) {
        self.create.begin();

        let Some(identity) = self.api.current_identity() else {
            self.create.finish(Some(FeedError::Unauthorized));
            return;
        };

        let now = Utc::now();
        let temp_id = temp_post_id(now);
        let placeholder = FeedPost {
            id: temp_id.clone(),
            author_id: identity.user_id.clone(),
            content: content.clone(),
            created_at: now,
            updated_at: now,
            profile: Profile {
                id: identity.user_id,
                username: identity.username,
                created_at: now,
            },
            likes_count: 0,
            is_liked: false,
        };
        self.overlay = self.overlay.with_added(placeholder);

        match self.api.create_post(content).await {
            Ok(real) => {
                self.overlay = self
                    .overlay
                    .confirm_added(&temp_id, real)
                    .sweep_stale(Utc::now());
                self.create.finish(None);
            }
            Err(e) => {
                self.overlay = self.overlay.without_added(&temp_id);
                self.create.finish(Some(e));
            }
        }
    }

    /// Edit a post: substitute the content immediately, roll back on failure.
    pub async fn edit_post(&mut self, post_id: &str, content: String) {
        self.update.begin();
        self.overlay = self.overlay.with_updated(post_id, &content);

        match self.api.update_post(post_id, content).await {
            Ok(_) => self.update.finish(None),
            Err(e) => {
                self.overlay = self.overlay.without_updated(post_id);
                self.update.finish(Some(e));
            }
        }
    }

    /// Delete a post: hide it immediately, un-hide on failure.
    pub async fn delete_post(&mut self, post_id: &str) {
        self.delete.begin();
        self.overlay = self.overlay.with_deleted(post_id);

        match self.api.delete_post(post_id).await {
            Ok(()) => self.delete.finish(None),
            Err(e) => {
                self.overlay = self.overlay.without_deleted(post_id);
                self.delete.finish(Some(e));
            }
        }
    }

    /// Toggle a like: flip immediately, revert on failure unless a newer
    /// toggle superseded this one.
    pub async fn toggle_like(&mut self, post: &FeedPost) {
        self.like.begin();
        let (likes, ticket) = self.likes.begin_toggle(post);
        self.likes = likes;

        match self.api.toggle_like(&post.id).await {
            Ok(_) => {
                self.likes = self.likes.settle_ok(&ticket);
                self.like.finish(None);
            }
            Err(e) => {
                self.likes = self.likes.settle_err(ticket);
                self.like.finish(Some(e));
            }
        }
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// The list to render: the last fetched pages with every outstanding
    /// overlay applied.
    pub fn display(&self) -> Vec<FeedPost> {
        let now = Utc::now();
        self.overlay
            .apply(&self.base, now)
            .into_iter()
            .map(|mut post| {
                let like = self.likes.state_of(&post);
                post.is_liked = like.is_liked;
                post.likes_count = like.likes_count;
                post
            })
            .collect()
    }

    /// Whether a created post is still waiting for server acknowledgement.
    pub fn is_publishing(&self, post_id: &str) -> bool {
        self.overlay.is_publishing(post_id)
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn fetch_error(&self) -> Option<&FeedError> {
        self.fetch_error.as_ref()
    }

    pub fn create_state(&self) -> &MutationState {
        &self.create
    }

    pub fn update_state(&self) -> &MutationState {
        &self.update
    }

    pub fn delete_state(&self) -> &MutationState {
        &self.delete
    }

    pub fn like_state(&self) -> &MutationState {
        &self.like
    }
}
