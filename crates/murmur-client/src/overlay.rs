//! Optimistic post overlay.
//!
//! [`PostOverlay`] holds every locally-initiated mutation that the server has
//! not yet confirmed, layered on top of the last fetched page.  It is an
//! immutable value: every transition returns a new overlay, so the session
//! can apply completed requests in whatever order they settle without hidden
//! temporal coupling.
//!
//! Overlay entries are retired in exactly three ways: [`PostOverlay::reconcile`]
//! against a fresh server page, explicit rollback by the caller on mutation
//! failure, or the stale-entry sweep for temporary creates that outlived the
//! grace window.  Failed creates are never auto-expired before the window so
//! genuine in-flight latency is not masked.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, TimeZone, Utc};

use murmur_shared::constants::{TEMP_ID_PREFIX, TEMP_POST_GRACE_MS};
use murmur_shared::FeedPost;

/// Generate a placeholder id for an unconfirmed create.
pub fn temp_post_id(now: DateTime<Utc>) -> String {
    format!("{TEMP_ID_PREFIX}{}", now.timestamp_millis())
}

/// Whether an id is a client-generated placeholder.
pub fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// Age of a temporary id, derived from its timestamp suffix.  `None` for
/// real ids or unparseable placeholders.
pub fn temp_id_age(id: &str, now: DateTime<Utc>) -> Option<Duration> {
    let millis: i64 = id.strip_prefix(TEMP_ID_PREFIX)?.parse().ok()?;
    let created = Utc.timestamp_millis_opt(millis).single()?;
    Some(now - created)
}

/// Unconfirmed local mutations, newest create first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostOverlay {
    /// Locally-created posts not yet seen in a server page, newest first.
    added: Vec<FeedPost>,
    /// Pending content replacement per post id; last writer wins.
    updated: HashMap<String, String>,
    /// Post ids hidden locally pending delete confirmation.
    deleted: HashSet<String>,
    /// Ids whose create has been acknowledged by the server.  Advisory UI
    /// state only; the merge ignores it.
    published: HashSet<String>,
}

impl PostOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Record an optimistic create.  The post carries a temporary id.
    pub fn with_added(&self, post: FeedPost) -> Self {
        let mut next = self.clone();
        next.added.insert(0, post);
        next
    }

    /// Swap a temporary entry for the server-confirmed post, keeping the
    /// optimistic author profile, and mark the real id as published.
    pub fn confirm_added(&self, temp_id: &str, real: FeedPost) -> Self {
        let mut next = self.clone();
        next.published.insert(real.id.clone());
        for entry in &mut next.added {
            if entry.id == temp_id {
                *entry = FeedPost {
                    profile: entry.profile.clone(),
                    ..real
                };
                break;
            }
        }
        next
    }

    /// Roll back a failed create.
    pub fn without_added(&self, id: &str) -> Self {
        let mut next = self.clone();
        next.added.retain(|p| p.id != id);
        next
    }

    /// Record a pending edit.  A second edit before the first confirms
    /// overwrites the pending replacement.
    pub fn with_updated(&self, id: &str, content: &str) -> Self {
        let mut next = self.clone();
        next.updated.insert(id.to_string(), content.to_string());
        next
    }

    /// Roll back a failed edit.
    pub fn without_updated(&self, id: &str) -> Self {
        let mut next = self.clone();
        next.updated.remove(id);
        next
    }

    /// Hide a post pending delete confirmation.
    pub fn with_deleted(&self, id: &str) -> Self {
        let mut next = self.clone();
        next.deleted.insert(id.to_string());
        next
    }

    /// Roll back a failed delete.
    pub fn without_deleted(&self, id: &str) -> Self {
        let mut next = self.clone();
        next.deleted.remove(id);
        next
    }

    // ------------------------------------------------------------------
    // Reconciliation
    // ------------------------------------------------------------------

    /// Retire overlay entries a fresh server page has caught up with.
    ///
    /// - creates whose id now appears server-side have round-tripped, along
    ///   with their published marks;
    /// - pending edits keyed by an id that exists neither server-side nor in
    ///   `added` point at a post that is gone;
    /// - hidden ids that no longer appear server-side are confirmed deletes
    ///   (the delete overlay only bridges the gap until the next fetch).
    ///
    /// Reconciling the same page twice is a no-op the second time.
    pub fn reconcile(&self, server_ids: &HashSet<String>) -> Self {
        let mut next = self.clone();

        next.added.retain(|p| !server_ids.contains(&p.id));
        next.published.retain(|id| !server_ids.contains(id));

        let added_ids: HashSet<&str> = next.added.iter().map(|p| p.id.as_str()).collect();
        next.updated
            .retain(|id, _| server_ids.contains(id) || added_ids.contains(id.as_str()));

        next.deleted.retain(|id| server_ids.contains(id));

        next
    }

    /// Drop temporary creates older than the grace window.  Confirmed
    /// entries (real ids) are never swept here; [`Self::reconcile`] owns those.
    pub fn sweep_stale(&self, now: DateTime<Utc>) -> Self {
        let grace = Duration::milliseconds(TEMP_POST_GRACE_MS);
        let mut next = self.clone();
        next.added
            .retain(|p| temp_id_age(&p.id, now).map_or(true, |age| age < grace));
        next
    }

    // ------------------------------------------------------------------
    // Merge
    // ------------------------------------------------------------------

    /// Produce the displayed list: base page minus deletions, with pending
    /// content substituted, and unconfirmed creates prepended.
    pub fn apply(&self, base: &[FeedPost], now: DateTime<Utc>) -> Vec<FeedPost> {
        let mut result = Vec::with_capacity(self.added.len() + base.len());

        for post in &self.added {
            result.push(self.with_pending_content(post.clone(), now));
        }

        for post in base {
            if self.deleted.contains(&post.id) {
                continue;
            }
            // The base can already contain a confirmed create between the
            // fetch that returned it and the reconcile that retires it.
            if self.added.iter().any(|a| a.id == post.id) {
                continue;
            }
            result.push(self.with_pending_content(post.clone(), now));
        }

        result
    }

    /// Whether a create is still waiting for server acknowledgement
    /// (drives the "publishing" indicator).
    pub fn is_publishing(&self, id: &str) -> bool {
        self.added.iter().any(|p| p.id == id) && !self.published.contains(id)
    }

    fn with_pending_content(&self, mut post: FeedPost, now: DateTime<Utc>) -> FeedPost {
        if let Some(content) = self.updated.get(&post.id) {
            post.content = content.clone();
            post.updated_at = now;
        }
        post
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_shared::Profile;

    fn feed_post(id: &str, content: &str) -> FeedPost {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        FeedPost {
            id: id.to_string(),
            author_id: "author".to_string(),
            content: content.to_string(),
            created_at: ts,
            updated_at: ts,
            profile: Profile {
                id: "author".to_string(),
                username: "alice".to_string(),
                created_at: ts,
            },
            likes_count: 0,
            is_liked: false,
        }
    }

    fn ids(posts: &[FeedPost]) -> Vec<&str> {
        posts.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn merge_order_and_substitution() {
        let base = vec![feed_post("b1", "one"), feed_post("b2", "two")];
        let now = Utc::now();

        let overlay = PostOverlay::new()
            .with_added(feed_post("temp-1", "fresh"))
            .with_updated("b2", "edited")
            .with_deleted("b1");

        let shown = overlay.apply(&base, now);
        assert_eq!(ids(&shown), vec!["temp-1", "b2"]);
        assert_eq!(shown[1].content, "edited");
        assert_eq!(shown[1].updated_at, now);
    }

    #[test]
    fn pending_edit_applies_to_added_posts_too() {
        let overlay = PostOverlay::new()
            .with_added(feed_post("temp-9", "draft"))
            .with_updated("temp-9", "draft v2");

        let shown = overlay.apply(&[], Utc::now());
        assert_eq!(shown[0].content, "draft v2");
    }

    #[test]
    fn second_edit_overwrites_pending_replacement() {
        let overlay = PostOverlay::new()
            .with_updated("p", "first")
            .with_updated("p", "second");

        let shown = overlay.apply(&[feed_post("p", "original")], Utc::now());
        assert_eq!(shown[0].content, "second");
    }

    #[test]
    fn reconcile_retires_confirmed_entries_and_is_idempotent() {
        let overlay = PostOverlay::new()
            .with_added(feed_post("real-1", "came back"))
            .with_added(feed_post("temp-5", "still pending"))
            .with_updated("real-1", "edit on confirmed")
            .with_updated("gone", "edit on vanished post")
            .with_updated("temp-5", "edit on pending")
            .with_deleted("real-2")
            .with_deleted("already-gone");

        let server_ids: HashSet<String> =
            ["real-1", "real-2"].iter().map(|s| s.to_string()).collect();

        let once = overlay.reconcile(&server_ids);
        let twice = once.reconcile(&server_ids);
        assert_eq!(once, twice);

        let shown = once.apply(&[feed_post("real-1", "one"), feed_post("real-2", "two")], Utc::now());
        // real-1's create round-tripped so its added entry retired, but its
        // pending edit stays until confirmed or rolled back; real-2 is still
        // hidden; the edit on the vanished post is gone.
        assert_eq!(ids(&shown), vec!["temp-5", "real-1"]);
        assert_eq!(shown[0].content, "edit on pending");
        assert_eq!(shown[1].content, "edit on confirmed");
    }

    #[test]
    fn delete_overlay_bridges_until_fetch_confirms() {
        let overlay = PostOverlay::new().with_deleted("p1");

        // Stale page still contains p1: the overlay hides it.
        let stale = vec![feed_post("p1", "doomed"), feed_post("p2", "ok")];
        assert_eq!(ids(&overlay.apply(&stale, Utc::now())), vec!["p2"]);

        // Fresh page no longer contains p1: the entry is cleared.
        let fresh_ids: HashSet<String> = ["p2".to_string()].into_iter().collect();
        let reconciled = overlay.reconcile(&fresh_ids);
        assert!(reconciled.is_empty());
    }

    #[test]
    fn confirm_added_swaps_temp_for_real_and_marks_published() {
        let now = Utc::now();
        let temp_id = temp_post_id(now);
        let overlay = PostOverlay::new().with_added(feed_post(&temp_id, "hello"));
        assert!(overlay.is_publishing(&temp_id));

        let mut real = feed_post("real-42", "hello");
        real.profile.username = "server_view".to_string();

        let confirmed = overlay.confirm_added(&temp_id, real);
        let shown = confirmed.apply(&[], now);
        assert_eq!(ids(&shown), vec!["real-42"]);
        // Optimistic profile is kept until a fetch replaces the entry.
        assert_eq!(shown[0].profile.username, "alice");
        assert!(!confirmed.is_publishing("real-42"));
    }

    #[test]
    fn reconcile_retires_published_marks_with_the_create() {
        let now = Utc::now();
        let temp_id = temp_post_id(now);
        let confirmed = PostOverlay::new()
            .with_added(feed_post(&temp_id, "hello"))
            .confirm_added(&temp_id, feed_post("real-42", "hello"));

        // The create has not round-tripped yet: both entries survive.
        let before = confirmed.reconcile(&HashSet::new());
        assert_eq!(before, confirmed);

        // A fresh page carrying the post clears the overlay completely.
        let server_ids: HashSet<String> = ["real-42".to_string()].into_iter().collect();
        let after = confirmed.reconcile(&server_ids);
        assert_eq!(after, PostOverlay::new());
    }

    #[test]
    fn rollback_removes_the_failed_create() {
        let overlay = PostOverlay::new().with_added(feed_post("temp-7", "oops"));
        let rolled_back = overlay.without_added("temp-7");
        assert!(rolled_back.is_empty());
        assert!(rolled_back.apply(&[], Utc::now()).is_empty());
    }

    #[test]
    fn sweep_drops_only_stale_temp_entries() {
        let now = Utc::now();
        let fresh_id = temp_post_id(now);
        let stale_id = temp_post_id(now - Duration::seconds(10));

        let overlay = PostOverlay::new()
            .with_added(feed_post(&fresh_id, "fresh"))
            .with_added(feed_post(&stale_id, "stale"))
            .with_added(feed_post("real-1", "confirmed"));

        let swept = overlay.sweep_stale(now);
        let shown = swept.apply(&[], now);
        // Creates are newest-first, so the most recent with_added leads.
        assert_eq!(ids(&shown), vec!["real-1", fresh_id.as_str()]);
    }

    #[test]
    fn temp_id_helpers() {
        let now = Utc::now();
        let id = temp_post_id(now);
        assert!(is_temp_id(&id));
        assert!(!is_temp_id("4dfe0a31-aaaa-bbbb-cccc-000000000000"));
        assert_eq!(temp_id_age("not-temp", now), None);
        let age = temp_id_age(&id, now + Duration::seconds(1)).unwrap();
        assert_eq!(age.num_seconds(), 1);
    }
}
