//! Services
//!
//! Each service borrows a [`SyncContext`] and is cheap to construct per call.

pub mod comment;
pub mod context;
pub mod error;
pub mod like;
pub mod notification;
pub mod outbox;

pub use comment::{CommentDraftError, CommentService};
pub use context::{SyncContext, SyncContextBuilder};
pub use error::{ServiceError, ServiceResult, UserNotice};
pub use like::LikeService;
pub use notification::NotificationService;
pub use outbox::{NotificationOutbox, OutboxWorker, PendingNotifications};
