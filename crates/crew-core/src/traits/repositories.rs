//! Repository traits (ports) - define the interface for data access
//!
//! The sync layer states what it needs from persistence; PostgreSQL and
//! the in-memory backend provide the implementations.

use async_trait::async_trait;

use crate::entities::{
    Comment, Like, LikeTarget, MemberProfile, NewComment, NewLike, NewNotification, Notification,
};
use crate::error::DomainError;
use crate::value_objects::{CommentId, ModuleId, NotificationId, UserId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Comment Repository
// ============================================================================

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Find comment by ID, author profile joined
    async fn find_by_id(&self, id: &CommentId) -> RepoResult<Option<Comment>>;

    /// Top-level comments of a module, newest first, authors joined
    async fn find_top_level(&self, module_id: &ModuleId) -> RepoResult<Vec<Comment>>;

    /// Replies to a comment, oldest first, authors joined
    async fn find_replies(&self, parent_id: &CommentId) -> RepoResult<Vec<Comment>>;

    /// Count every comment of a module, replies included
    async fn count_by_module(&self, module_id: &ModuleId) -> RepoResult<i64>;

    /// Insert a comment and return the stored row with author joined
    async fn create(&self, comment: &NewComment) -> RepoResult<Comment>;

    /// Delete a comment written by `author_id`
    ///
    /// Fails with `NotCommentAuthor` when the row belongs to someone else.
    async fn delete(&self, id: &CommentId, author_id: &UserId) -> RepoResult<()>;
}

// ============================================================================
// Like Repository
// ============================================================================

#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Find a member's like on a target
    async fn find(&self, user_id: &UserId, target: &LikeTarget) -> RepoResult<Option<Like>>;

    /// Count likes on a target
    async fn count(&self, target: &LikeTarget) -> RepoResult<i64>;

    /// Insert a like; `LikeAlreadyExists` if the member already liked it
    async fn create(&self, like: &NewLike) -> RepoResult<Like>;

    /// Remove a member's like; returns whether a row was deleted
    async fn delete(&self, user_id: &UserId, target: &LikeTarget) -> RepoResult<bool>;
}

// ============================================================================
// Notification Repository
// ============================================================================

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Find notification by ID, actor profile joined
    async fn find_by_id(&self, id: &NotificationId) -> RepoResult<Option<Notification>>;

    /// Latest notifications for a receiver, newest first
    async fn find_by_receiver(&self, receiver_id: &UserId, limit: i64)
        -> RepoResult<Vec<Notification>>;

    /// Count unread notifications for a receiver
    async fn unread_count(&self, receiver_id: &UserId) -> RepoResult<i64>;

    /// Insert a notification
    async fn create(&self, notification: &NewNotification) -> RepoResult<Notification>;

    /// Mark one notification read
    async fn mark_read(&self, id: &NotificationId) -> RepoResult<()>;

    /// Mark every unread notification of a receiver read; returns rows changed
    async fn mark_all_read(&self, receiver_id: &UserId) -> RepoResult<u64>;
}

// ============================================================================
// Member Repository
// ============================================================================

#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Find a member's public profile
    async fn find_profile(&self, id: &UserId) -> RepoResult<Option<MemberProfile>>;
}
