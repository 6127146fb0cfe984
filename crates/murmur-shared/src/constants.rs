/// Maximum post content length in characters (after trimming).
pub const MAX_POST_LENGTH: usize = 280;

/// Minimum username length in characters.
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Maximum username length in characters.
pub const MAX_USERNAME_LENGTH: usize = 30;

/// Default feed page size.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound on a requested feed page size.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Reserved prefix for client-generated placeholder post ids.  Real post ids
/// are UUID v4 strings and can never start with this.
pub const TEMP_ID_PREFIX: &str = "temp-";

/// How long an unconfirmed temporary post may linger in the overlay before
/// the stale-entry sweep drops it.
pub const TEMP_POST_GRACE_MS: i64 = 2_000;
