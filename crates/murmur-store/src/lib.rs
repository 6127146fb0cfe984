//! # murmur-store
//!
//! Embedded relational storage for the Murmur feed, backed by SQLite.
//!
//! This crate plays the role of the storage collaborator: it owns the schema,
//! enforces owner scoping on mutations at the query level (a non-owner update
//! or delete simply affects zero rows), and answers the cursor-paginated feed
//! query.  The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection` and provides typed helpers for every domain model.

pub mod database;
pub mod feed;
pub mod likes;
pub mod migrations;
pub mod posts;
pub mod profiles;

mod error;

pub use database::Database;
pub use error::StoreError;
