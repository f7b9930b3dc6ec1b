//! Service layer error types
//!
//! Every failure that leaves a service is a [`ServiceError`]. The UI never
//! sees one directly: it renders the [`UserNotice`] derived from it.

use crew_common::AppError;
use crew_core::DomainError;
use serde::Serialize;
use std::fmt;

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain rule violation or wrapped infrastructure failure
    Domain(DomainError),

    /// Resource not found
    NotFound { resource: &'static str, id: String },

    /// Validation error
    Validation(String),

    /// Internal error
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the error code
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether retrying the same request could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Domain(e) => e.is_transient(),
            _ => false,
        }
    }

    /// The dismissable message shown for this failure
    pub fn user_notice(&self) -> UserNotice {
        let message = match self {
            Self::Domain(DomainError::EmptyContent) => "Write something first.".to_string(),
            Self::Domain(DomainError::ContentTooLong { max }) => {
                format!("Comments can be at most {max} characters.")
            }
            Self::Domain(DomainError::NotCommentAuthor) => {
                "You can only delete your own comments.".to_string()
            }
            Self::Domain(e) if e.is_not_found() => "That item no longer exists.".to_string(),
            Self::Domain(e) if e.is_validation() => e.to_string(),
            Self::NotFound { .. } => "That item no longer exists.".to_string(),
            Self::Validation(msg) => msg.clone(),
            _ if self.is_transient() => "Something went wrong. Please try again.".to_string(),
            _ => "Something went wrong.".to_string(),
        };

        UserNotice {
            code: self.error_code().to_string(),
            message,
            retryable: self.is_transient(),
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::NotFound { resource, id } => AppError::NotFound(format!("{resource} {id}")),
            ServiceError::Validation(msg) => AppError::Validation(msg),
            ServiceError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Dismissable message surfaced to the member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserNotice {
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crew_core::CommentId;

    #[test]
    fn test_not_found_error() {
        let err = ServiceError::not_found("Comment", "c1");
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(err.to_string().contains("Comment not found: c1"));
    }

    #[test]
    fn test_transient_notice_is_retryable() {
        let err = ServiceError::from(DomainError::TransportError("reset".into()));
        let notice = err.user_notice();
        assert!(notice.retryable);
        assert_eq!(notice.code, "TRANSPORT_ERROR");
    }

    #[test]
    fn test_authorization_notice() {
        let notice = ServiceError::from(DomainError::NotCommentAuthor).user_notice();
        assert!(!notice.retryable);
        assert_eq!(notice.message, "You can only delete your own comments.");
    }

    #[test]
    fn test_validation_notice() {
        let notice = ServiceError::from(DomainError::ContentTooLong { max: 500 }).user_notice();
        assert_eq!(notice.code, "CONTENT_TOO_LONG");
        assert!(notice.message.contains("500"));

        let notice = ServiceError::from(DomainError::CommentNotFound(CommentId::new("c1"))).user_notice();
        assert_eq!(notice.message, "That item no longer exists.");
    }

    #[test]
    fn test_convert_to_app_error() {
        let app_err: AppError = ServiceError::from(DomainError::DatabaseError("down".into())).into();
        assert!(app_err.is_retryable());

        let app_err: AppError = ServiceError::validation("bad").into();
        assert_eq!(app_err.error_code(), "VALIDATION_ERROR");
    }
}
