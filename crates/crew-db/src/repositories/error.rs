//! Error handling utilities for repositories

use crew_core::error::DomainError;
use crew_core::value_objects::{CommentId, NotificationId};
use sqlx::error::ErrorKind;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Map a constraint violation of `kind` to a domain error, anything else to
/// `DatabaseError`
pub fn map_violation<F>(e: SqlxError, kind: ErrorKind, on_violation: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.kind() == kind {
            return on_violation();
        }
    }
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    map_violation(e, ErrorKind::UniqueViolation, on_unique)
}

/// Create a "comment not found" error
pub fn comment_not_found(id: &CommentId) -> DomainError {
    DomainError::CommentNotFound(id.clone())
}

/// Create a "notification not found" error
pub fn notification_not_found(id: &NotificationId) -> DomainError {
    DomainError::NotificationNotFound(id.clone())
}
