//! Input validation performed at the mutation boundary.
//!
//! Validation failures are returned as structured [`FeedError::ValidationFailed`]
//! values with the offending field named, never panicked or thrown past the
//! dispatcher.

use crate::constants::{MAX_POST_LENGTH, MAX_USERNAME_LENGTH, MIN_USERNAME_LENGTH};
use crate::error::FeedError;

/// Validate post content and return the trimmed form that gets stored.
pub fn validate_post_content(content: &str) -> Result<String, FeedError> {
    let trimmed = content.trim();

    if trimmed.is_empty() {
        return Err(FeedError::validation("content", "Post content is required"));
    }

    if trimmed.chars().count() > MAX_POST_LENGTH {
        return Err(FeedError::validation(
            "content",
            format!("Post content must be {MAX_POST_LENGTH} characters or less"),
        ));
    }

    Ok(trimmed.to_string())
}

/// Validate a username: 3..=30 characters, letters, digits and underscores.
pub fn validate_username(username: &str) -> Result<(), FeedError> {
    let len = username.chars().count();

    if len < MIN_USERNAME_LENGTH {
        return Err(FeedError::validation(
            "username",
            format!("Username must be at least {MIN_USERNAME_LENGTH} characters"),
        ));
    }

    if len > MAX_USERNAME_LENGTH {
        return Err(FeedError::validation(
            "username",
            format!("Username must be {MAX_USERNAME_LENGTH} characters or less"),
        ));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(FeedError::validation(
            "username",
            "Username can only contain letters, numbers, and underscores",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_is_trimmed() {
        assert_eq!(validate_post_content("  hello  ").unwrap(), "hello");
    }

    #[test]
    fn empty_content_rejected() {
        let err = validate_post_content("   ").unwrap_err();
        assert!(matches!(
            err,
            FeedError::ValidationFailed { field: "content", .. }
        ));
    }

    #[test]
    fn overlong_content_rejected() {
        let long = "x".repeat(281);
        assert!(validate_post_content(&long).is_err());
        let ok = "x".repeat(280);
        assert!(validate_post_content(&ok).is_ok());
    }

    #[test]
    fn username_rules() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(31)).is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("no-dashes").is_err());
        assert!(validate_username("fine_name_42").is_ok());
    }
}
