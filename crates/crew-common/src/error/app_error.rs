//! Application error types
//!
//! Error type used at process edges (the relay binary, startup wiring).

use crew_core::DomainError;
use std::fmt;

use crate::config::ConfigError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Resource errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // Database errors
    #[error("Database error: {0}")]
    Database(String),

    // Redis errors
    #[error("Cache error: {0}")]
    Cache(String),

    // Change stream errors
    #[error("Transport error: {0}")]
    Transport(String),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl AppError {
    /// Get error code string
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Domain(e) => e.code(),
        }
    }

    /// Check if retrying the operation could succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Database(_) | Self::Cache(_) | Self::Transport(_) => true,
            Self::Domain(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Create a not found error for a resource type
    #[must_use]
    pub fn not_found(resource: impl fmt::Display) -> Self {
        Self::NotFound(resource.to_string())
    }

    /// Create a validation error
    #[must_use]
    pub fn validation(msg: impl fmt::Display) -> Self {
        Self::Validation(msg.to_string())
    }

    /// Create a database error
    #[must_use]
    pub fn database(err: impl fmt::Display) -> Self {
        Self::Database(err.to_string())
    }

    /// Create a cache error
    #[must_use]
    pub fn cache(err: impl fmt::Display) -> Self {
        Self::Cache(err.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::not_found("comment").error_code(), "NOT_FOUND");
        assert_eq!(AppError::database("reset").error_code(), "DATABASE_ERROR");
        assert_eq!(
            AppError::Config(ConfigError::MissingVar("REDIS_URL")).error_code(),
            "CONFIG_ERROR"
        );
    }

    #[test]
    fn test_domain_errors_keep_their_code() {
        let err = AppError::from(DomainError::NotCommentAuthor);
        assert_eq!(err.error_code(), "NOT_COMMENT_AUTHOR");
        assert_eq!(err.to_string(), "Not comment author");
    }

    #[test]
    fn test_is_retryable() {
        assert!(AppError::cache("timeout").is_retryable());
        assert!(AppError::from(DomainError::DatabaseError("x".to_string())).is_retryable());
        assert!(!AppError::validation("empty").is_retryable());
        assert!(!AppError::from(DomainError::LikeAlreadyExists).is_retryable());
    }

    #[test]
    fn test_helper_methods() {
        let err = AppError::not_found("comment c1");
        assert_eq!(err.to_string(), "Resource not found: comment c1");

        let err = AppError::validation("content is required");
        assert_eq!(err.to_string(), "Validation error: content is required");
    }
}
