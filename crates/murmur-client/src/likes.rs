//! Optimistic like state, independent of the post overlay.
//!
//! The pattern is flip-first: [`LikeOverlay::begin_toggle`] records the new
//! state immediately and hands back a ticket carrying the pre-flip snapshot
//! and a per-post sequence number.  When the server call settles, the caller
//! applies the ticket: success keeps the flip, failure reverts, but only if
//! no newer toggle was issued for that post in the meantime.  Rapid toggles
//! therefore resolve to the last requested state, with the count consistent
//! with it.

use std::collections::HashMap;

use murmur_shared::FeedPost;

/// Viewer-relative like state for one post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeState {
    pub is_liked: bool,
    pub likes_count: u64,
}

impl LikeState {
    pub fn of(post: &FeedPost) -> Self {
        Self {
            is_liked: post.is_liked,
            likes_count: post.likes_count,
        }
    }

    /// The state after one toggle.
    fn flipped(self) -> Self {
        Self {
            is_liked: !self.is_liked,
            likes_count: if self.is_liked {
                self.likes_count.saturating_sub(1)
            } else {
                self.likes_count + 1
            },
        }
    }
}

/// Handle for settling one in-flight toggle.
#[derive(Debug, Clone)]
pub struct LikeTicket {
    post_id: String,
    seq: u64,
    prior: LikeState,
}

/// Per-post optimistic like overlay.  One overlay state per post id; no
/// queue of rapid clicks beyond "last requested state wins".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LikeOverlay {
    states: HashMap<String, LikeState>,
    /// Monotonic sequence per post id; the latest issued toggle owns the slot.
    seqs: HashMap<String, u64>,
}

impl LikeOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// The state to display for a post: overlay if present, else the post's
    /// own server-reported state.
    pub fn state_of(&self, post: &FeedPost) -> LikeState {
        self.states
            .get(&post.id)
            .copied()
            .unwrap_or_else(|| LikeState::of(post))
    }

    /// Flip optimistically.  Returns the new overlay and the settlement
    /// ticket for this request.
    pub fn begin_toggle(&self, post: &FeedPost) -> (Self, LikeTicket) {
        let prior = self.state_of(post);
        let seq = self.seqs.get(&post.id).copied().unwrap_or(0) + 1;

        let mut next = self.clone();
        next.states.insert(post.id.clone(), prior.flipped());
        next.seqs.insert(post.id.clone(), seq);

        let ticket = LikeTicket {
            post_id: post.id.clone(),
            seq,
            prior,
        };
        (next, ticket)
    }

    /// The server confirmed the toggle; the flip stands.
    pub fn settle_ok(&self, _ticket: &LikeTicket) -> Self {
        self.clone()
    }

    /// The server rejected the toggle.  Revert to the pre-flip snapshot,
    /// unless a newer toggle has superseded this one.
    pub fn settle_err(&self, ticket: LikeTicket) -> Self {
        let latest = self.seqs.get(&ticket.post_id).copied().unwrap_or(0);
        if latest != ticket.seq {
            // Superseded; the newer request owns the slot.
            return self.clone();
        }
        let mut next = self.clone();
        next.states.insert(ticket.post_id, ticket.prior);
        next
    }

    /// Drop overlay entries a fresh page already agrees with, and entries
    /// for posts the page no longer contains (deleted, or scrolled out of
    /// the fetched window), so the server becomes the source of truth again.
    /// Display-neutral: a post absent from the page is not rendered anyway.
    pub fn reconcile(&self, posts: &[FeedPost]) -> Self {
        let fresh: HashMap<&str, LikeState> = posts
            .iter()
            .map(|p| (p.id.as_str(), LikeState::of(p)))
            .collect();

        let mut next = self.clone();
        next.states.retain(|id, state| {
            fresh.get(id.as_str()).is_some_and(|server| server != state)
        });
        next.seqs.retain(|id, _| next.states.contains_key(id));
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use murmur_shared::Profile;

    fn post(id: &str, likes_count: u64, is_liked: bool) -> FeedPost {
        let ts = Utc::now();
        FeedPost {
            id: id.to_string(),
            author_id: "a".to_string(),
            content: "c".to_string(),
            created_at: ts,
            updated_at: ts,
            profile: Profile {
                id: "a".to_string(),
                username: "alice".to_string(),
                created_at: ts,
            },
            likes_count,
            is_liked,
        }
    }

    #[test]
    fn toggle_then_toggle_back() {
        let p = post("p", 3, false);
        let overlay = LikeOverlay::new();

        let (overlay, t1) = overlay.begin_toggle(&p);
        assert_eq!(
            overlay.state_of(&p),
            LikeState { is_liked: true, likes_count: 4 }
        );
        let overlay = overlay.settle_ok(&t1);

        let (overlay, t2) = overlay.begin_toggle(&p);
        let overlay = overlay.settle_ok(&t2);
        assert_eq!(
            overlay.state_of(&p),
            LikeState { is_liked: false, likes_count: 3 }
        );
    }

    #[test]
    fn failure_reverts_to_pre_flip_state() {
        let p = post("p", 3, false);
        let (overlay, ticket) = LikeOverlay::new().begin_toggle(&p);

        let overlay = overlay.settle_err(ticket);
        assert_eq!(overlay.state_of(&p), LikeState::of(&p));
    }

    #[test]
    fn stale_failure_does_not_undo_a_newer_toggle() {
        let p = post("p", 3, false);

        // Two rapid toggles; the first fails after the second was issued.
        let (overlay, first) = LikeOverlay::new().begin_toggle(&p);
        let (overlay, second) = overlay.begin_toggle(&p);

        let overlay = overlay.settle_err(first);
        // Last requested state (back to unliked) still stands.
        assert_eq!(
            overlay.state_of(&p),
            LikeState { is_liked: false, likes_count: 3 }
        );

        let overlay = overlay.settle_ok(&second);
        assert_eq!(
            overlay.state_of(&p),
            LikeState { is_liked: false, likes_count: 3 }
        );
    }

    #[test]
    fn count_never_goes_negative() {
        // Server state can lag a revert; flipping an unliked post with a
        // zero count must not underflow.
        let p = post("p", 0, true);
        let (overlay, _t) = LikeOverlay::new().begin_toggle(&p);
        assert_eq!(overlay.state_of(&p).likes_count, 0);
    }

    #[test]
    fn reconcile_retires_entries_for_posts_gone_from_the_page() {
        let doomed = post("gone", 3, false);
        let (overlay, t) = LikeOverlay::new().begin_toggle(&doomed);
        let overlay = overlay.settle_ok(&t);

        // The post was deleted server-side; fresh pages no longer carry it.
        let overlay = overlay.reconcile(&[post("other", 0, false)]);
        assert_eq!(overlay, LikeOverlay::new());
    }

    #[test]
    fn reconcile_keeps_entries_the_page_still_disagrees_with() {
        let p = post("p", 3, false);
        let (overlay, t) = LikeOverlay::new().begin_toggle(&p);
        let overlay = overlay.settle_ok(&t);

        // Stale page still reports the pre-flip state: the flip must hold.
        let overlay = overlay.reconcile(&[p.clone()]);
        assert_eq!(
            overlay.state_of(&p),
            LikeState { is_liked: true, likes_count: 4 }
        );
    }

    #[test]
    fn reconcile_drops_entries_the_server_caught_up_with() {
        let before = post("p", 3, false);
        let (overlay, t) = LikeOverlay::new().begin_toggle(&before);
        let overlay = overlay.settle_ok(&t);

        // Fresh page now reports the toggled state.
        let fresh = post("p", 4, true);
        let overlay = overlay.reconcile(&[fresh.clone()]);

        assert_eq!(overlay, LikeOverlay::new());
        assert_eq!(overlay.state_of(&fresh), LikeState::of(&fresh));
    }
}
