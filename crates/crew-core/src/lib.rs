//! # crew-core
//!
//! Domain layer containing the social entities (comments, likes, notifications),
//! id value objects, change events, and the ports implemented by the database,
//! cache, and in-memory backends.
//! This crate has zero dependencies on infrastructure (database, transport, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Comment, Like, LikeDirection, LikeState, LikeTarget, MemberProfile, NewComment, NewLike,
    NewNotification, Notification, NotificationKind, TargetType, COMMENT_MAX_CHARS,
    NOTIFICATION_PREVIEW_CHARS,
};
pub use error::DomainError;
pub use events::{ChangeEvent, RowPayload, Table, Topic};
pub use traits::{
    ChangeFeed, ChangeStream, CommentRepository, LikeRepository, MemberRepository,
    NotificationRepository, RepoResult,
};
pub use value_objects::{CommentId, LikeId, ModuleId, NotificationId, TargetId, UserId};
