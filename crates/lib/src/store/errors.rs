//! Error types for user and session operations.

use thiserror::Error;

/// Errors returned by [`Store`](super::Store) operations.
///
/// Comment rejections are split by cause so that logs say why; the HTTP layer
/// collapses all of them into one generic error payload.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// Registration with a username that is already taken
    #[error("Username already exists: {username}")]
    UsernameAlreadyExists { username: String },

    /// Unknown username, or a password whose digest does not match
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Lookup of a user that is not registered
    #[error("User not found: {username}")]
    UserNotFound { username: String },

    /// Comment submitted without a valid session
    #[error("Cannot comment: not logged in")]
    NotAuthenticated,

    /// Comment aimed at a user that is not registered
    #[error("Cannot comment: unknown user {username}")]
    UnknownCommentTarget { username: String },

    /// Comment aimed at the commenter's own profile
    #[error("Cannot comment on your own profile: {username}")]
    SelfComment { username: String },
}

impl StoreError {
    /// Check if this error indicates a resource was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::UserNotFound { .. })
    }

    /// Check if this error indicates a conflict (already exists)
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::UsernameAlreadyExists { .. })
    }

    /// Check if this error is authentication-related
    pub fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidCredentials | StoreError::NotAuthenticated
        )
    }

    /// Check if this error is a rejected comment submission
    pub fn is_comment_rejected(&self) -> bool {
        matches!(
            self,
            StoreError::NotAuthenticated
                | StoreError::UnknownCommentTarget { .. }
                | StoreError::SelfComment { .. }
        )
    }

    /// Get the username associated with this error, if any
    pub fn username(&self) -> Option<&str> {
        match self {
            StoreError::UsernameAlreadyExists { username }
            | StoreError::UserNotFound { username }
            | StoreError::UnknownCommentTarget { username }
            | StoreError::SelfComment { username } => Some(username),
            _ => None,
        }
    }
}

// Conversion from StoreError to the main Error type
impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
