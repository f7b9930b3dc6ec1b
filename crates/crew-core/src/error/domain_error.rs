//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{CommentId, NotificationId, UserId};

/// Domain layer errors
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Comment not found: {0}")]
    CommentNotFound(CommentId),

    #[error("Notification not found: {0}")]
    NotificationNotFound(NotificationId),

    #[error("Member not found: {0}")]
    MemberNotFound(UserId),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Content must not be empty")]
    EmptyContent,

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not comment author")]
    NotCommentAuthor,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Like already exists")]
    LikeAlreadyExists,

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Cannot notify a member about their own action")]
    SelfNotification,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::CommentNotFound(_) => "UNKNOWN_COMMENT",
            Self::NotificationNotFound(_) => "UNKNOWN_NOTIFICATION",
            Self::MemberNotFound(_) => "UNKNOWN_MEMBER",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::EmptyContent => "EMPTY_CONTENT",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",

            // Authorization
            Self::NotCommentAuthor => "NOT_COMMENT_AUTHOR",

            // Conflict
            Self::LikeAlreadyExists => "LIKE_ALREADY_EXISTS",

            // Business Rules
            Self::SelfNotification => "SELF_NOTIFICATION",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::TransportError(_) => "TRANSPORT_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CommentNotFound(_) | Self::NotificationNotFound(_) | Self::MemberNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_) | Self::EmptyContent | Self::ContentTooLong { .. }
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotCommentAuthor)
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::LikeAlreadyExists)
    }

    /// Check if the failure came from infrastructure and may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_) | Self::CacheError(_) | Self::TransportError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = DomainError::CommentNotFound(CommentId::new("c1"));
        assert_eq!(err.code(), "UNKNOWN_COMMENT");

        let err = DomainError::NotCommentAuthor;
        assert_eq!(err.code(), "NOT_COMMENT_AUTHOR");
    }

    #[test]
    fn test_is_not_found() {
        assert!(DomainError::CommentNotFound(CommentId::new("c1")).is_not_found());
        assert!(DomainError::MemberNotFound(UserId::new("u1")).is_not_found());
        assert!(!DomainError::LikeAlreadyExists.is_not_found());
    }

    #[test]
    fn test_classification() {
        assert!(DomainError::NotCommentAuthor.is_authorization());
        assert!(DomainError::LikeAlreadyExists.is_conflict());
        assert!(DomainError::EmptyContent.is_validation());
        assert!(DomainError::TransportError("reset".to_string()).is_transient());
        assert!(!DomainError::SelfNotification.is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::CommentNotFound(CommentId::new("abc"));
        assert_eq!(err.to_string(), "Comment not found: abc");

        let err = DomainError::ContentTooLong { max: 500 };
        assert_eq!(err.to_string(), "Content too long: max 500 characters");
    }
}
