//! # murmur-shared
//!
//! Domain model and pure helpers shared by every Murmur crate: post and
//! profile types, the opaque pagination cursor codec, input validation and
//! the application-wide error taxonomy.  Nothing in here touches storage or
//! the network.

pub mod constants;
pub mod cursor;
pub mod models;
pub mod validate;

mod error;

pub use cursor::Cursor;
pub use error::FeedError;
pub use models::*;
