//! # crew-sync
//!
//! Keeps like counts, comment threads and the notification badge consistent
//! across concurrently open sessions.
//!
//! - [`store`]: the [`InteractionStore`] every read goes through
//! - [`services`]: optimistic mutations (toggle like, post/delete comment,
//!   mark notifications read) and the notification outbox
//! - [`reconciler`]: change-feed consumers that merge pushed rows into the
//!   store exactly once
//! - [`memory`]: an in-process backend implementing every port

pub mod config;
pub mod memory;
pub mod reconciler;
pub mod services;
pub mod store;

pub use config::SyncConfig;
pub use memory::{FailPoint, MemoryBackend};
pub use reconciler::{
    CommentCountConsumer, CommentListConsumer, Consumer, ConsumerKind, LikeConsumer,
    NotificationConsumer, Reconciler, SubscriptionHandle, SubscriptionKey, SubscriptionRegistry,
};
pub use services::{
    CommentDraftError, CommentService, LikeService, NotificationOutbox, NotificationService,
    OutboxWorker, PendingNotifications, ServiceError, ServiceResult, SyncContext,
    SyncContextBuilder, UserNotice,
};
pub use store::{CommentThread, InteractionStore, LikeMutation, NotificationInbox};
