use thiserror::Error;

/// Application-level error taxonomy surfaced to the presentation layer.
///
/// `NotFoundOrForbidden` deliberately does not distinguish a missing post
/// from somebody else's post, so mutations cannot be used to probe for the
/// existence of other users' resources.  Upstream causes behind `FetchFailed`
/// and `MutationFailed` are logged, never exposed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// Input violated a content/length/format constraint.  `field` names the
    /// offending input so the UI can render the message inline.
    #[error("{message}")]
    ValidationFailed {
        field: &'static str,
        message: String,
    },

    /// No authenticated identity for an action that requires one.
    #[error("You must be signed in to perform this action")]
    Unauthorized,

    /// Mutation target absent or not owned by the caller.
    #[error("Post not found or permission denied")]
    NotFoundOrForbidden,

    /// Unique-constraint violation on the named field.
    #[error("{message}")]
    Conflict {
        field: &'static str,
        message: String,
    },

    /// Generic upstream failure while reading the feed.
    #[error("Failed to fetch posts")]
    FetchFailed,

    /// Generic upstream failure while applying a mutation.
    #[error("Failed to {0}")]
    MutationFailed(&'static str),
}

impl FeedError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field,
            message: message.into(),
        }
    }

    pub fn conflict(field: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            field,
            message: message.into(),
        }
    }

    /// The input field an error should be rendered next to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::ValidationFailed { field, .. } | Self::Conflict { field, .. } => Some(field),
            _ => None,
        }
    }
}
