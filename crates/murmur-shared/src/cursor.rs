//! Opaque pagination cursor.
//!
//! A cursor carries the `(created_at, id)` sort key of the last item on a
//! page so a strictly-ordered descending scan can resume exactly after it.
//! The wire form is base64 over a small JSON payload; clients must treat it
//! as opaque.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Decoded resumption point of a paginated feed scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cursor {
    pub created_at: DateTime<Utc>,
    pub id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CursorError {
    #[error("Invalid cursor format")]
    InvalidCursor,
}

impl Cursor {
    pub fn new(created_at: DateTime<Utc>, id: impl Into<String>) -> Self {
        Self {
            created_at,
            id: id.into(),
        }
    }

    /// Encode as an opaque wire token.
    pub fn encode(&self) -> String {
        // Serialization of a two-field struct cannot fail.
        let json = serde_json::to_vec(self).expect("cursor serialization");
        base64_encode(&json)
    }

    /// Decode a wire token.  Fails on anything that is not a token produced
    /// by [`Cursor::encode`].
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let bytes = base64_decode(token)?;
        serde_json::from_slice(&bytes).map_err(|_| CursorError::InvalidCursor)
    }

    /// Lenient decode: a missing or malformed token means "start from the
    /// beginning" rather than an error.
    pub fn parse(token: Option<&str>) -> Option<Self> {
        token.and_then(|t| Self::decode(t).ok())
    }

    /// The `created_at` key in the exact text form the store persists, so
    /// that SQL string comparisons agree with chronological order.
    pub fn created_at_key(&self) -> String {
        format_sort_key(self.created_at)
    }
}

/// Render a timestamp in the fixed-width RFC 3339 form used as a sort key.
/// Fixed fractional precision keeps lexicographic order chronological.
pub fn format_sort_key(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn base64_encode(data: &[u8]) -> String {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    STANDARD.encode(data)
}

fn base64_decode(s: &str) -> Result<Vec<u8>, CursorError> {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    STANDARD
        .decode(s.trim())
        .map_err(|_| CursorError::InvalidCursor)
}
