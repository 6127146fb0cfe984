//! # murmur-client
//!
//! The client-side core of the Murmur feed: an optimistic, cursor-paginated
//! view over the storage collaborator.
//!
//! The moving parts, leaves first:
//!
//! - [`api::FeedApi`] -- the opaque service boundary (fetch a page, mutate a
//!   post, toggle a like), with [`local::LocalFeedApi`] as the in-process
//!   implementation over `murmur-store`.
//! - [`overlay::PostOverlay`] -- an immutable value holding locally-initiated
//!   but unconfirmed creates/edits/deletes, merged onto the last fetched page
//!   and retired once a fresh page confirms them.
//! - [`likes::LikeOverlay`] -- per-post optimistic like state with
//!   sequence-numbered settlement so rapid toggles resolve to the last
//!   requested state.
//! - [`session::FeedSession`] -- ties the above together: pagination,
//!   search/filter, mutation dispatch and the displayed list.
//!
//! All state transitions are pure value-to-value functions; completed
//! requests are applied explicitly, which is what keeps out-of-order
//! completions from corrupting the overlays.

pub mod api;
pub mod likes;
pub mod local;
pub mod overlay;
pub mod session;

pub use api::{FeedApi, Identity};
pub use likes::{LikeOverlay, LikeState, LikeTicket};
pub use local::LocalFeedApi;
pub use overlay::PostOverlay;
pub use session::FeedSession;
