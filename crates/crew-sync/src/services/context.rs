//! Sync context - dependency container for services and reconcilers
//!
//! Built once at the root and cloned into whatever needs it. Clones share
//! the same store, repositories and outbox.

use std::sync::Arc;

use crew_core::traits::{
    ChangeFeed, CommentRepository, LikeRepository, MemberRepository, NotificationRepository,
};
use crew_core::UserId;

use crate::config::SyncConfig;
use crate::store::InteractionStore;

use super::error::{ServiceError, ServiceResult};
use super::outbox::NotificationOutbox;

/// Sync context containing all dependencies
///
/// It provides access to:
/// - the signed-in member's id
/// - the interaction store
/// - persistence repositories and the change feed
/// - the notification outbox
#[derive(Clone)]
pub struct SyncContext {
    user_id: UserId,
    config: SyncConfig,
    store: InteractionStore,

    // Repositories
    comment_repo: Arc<dyn CommentRepository>,
    like_repo: Arc<dyn LikeRepository>,
    notification_repo: Arc<dyn NotificationRepository>,
    member_repo: Arc<dyn MemberRepository>,

    // Push
    change_feed: Arc<dyn ChangeFeed>,

    outbox: NotificationOutbox,
}

impl SyncContext {
    /// Create a new sync context with all dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: UserId,
        config: SyncConfig,
        store: InteractionStore,
        comment_repo: Arc<dyn CommentRepository>,
        like_repo: Arc<dyn LikeRepository>,
        notification_repo: Arc<dyn NotificationRepository>,
        member_repo: Arc<dyn MemberRepository>,
        change_feed: Arc<dyn ChangeFeed>,
        outbox: NotificationOutbox,
    ) -> Self {
        Self {
            user_id,
            config,
            store,
            comment_repo,
            like_repo,
            notification_repo,
            member_repo,
            change_feed,
            outbox,
        }
    }

    pub fn builder() -> SyncContextBuilder {
        SyncContextBuilder::new()
    }

    /// The signed-in member
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn store(&self) -> &InteractionStore {
        &self.store
    }

    // === Repositories ===

    pub fn comment_repo(&self) -> &dyn CommentRepository {
        self.comment_repo.as_ref()
    }

    pub fn like_repo(&self) -> &dyn LikeRepository {
        self.like_repo.as_ref()
    }

    pub fn notification_repo(&self) -> &dyn NotificationRepository {
        self.notification_repo.as_ref()
    }

    pub fn member_repo(&self) -> &dyn MemberRepository {
        self.member_repo.as_ref()
    }

    // === Push ===

    pub fn change_feed(&self) -> &dyn ChangeFeed {
        self.change_feed.as_ref()
    }

    pub fn outbox(&self) -> &NotificationOutbox {
        &self.outbox
    }
}

impl std::fmt::Debug for SyncContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncContext")
            .field("user_id", &self.user_id)
            .field("config", &self.config)
            .field("repositories", &"...")
            .finish()
    }
}

/// Builder for creating SyncContext
#[derive(Default)]
pub struct SyncContextBuilder {
    user_id: Option<UserId>,
    config: Option<SyncConfig>,
    store: Option<InteractionStore>,
    comment_repo: Option<Arc<dyn CommentRepository>>,
    like_repo: Option<Arc<dyn LikeRepository>>,
    notification_repo: Option<Arc<dyn NotificationRepository>>,
    member_repo: Option<Arc<dyn MemberRepository>>,
    change_feed: Option<Arc<dyn ChangeFeed>>,
    outbox: Option<NotificationOutbox>,
}

impl SyncContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_id(mut self, user_id: impl Into<UserId>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn config(mut self, config: SyncConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Share an existing store instead of starting empty
    pub fn store(mut self, store: InteractionStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn comment_repo(mut self, repo: Arc<dyn CommentRepository>) -> Self {
        self.comment_repo = Some(repo);
        self
    }

    pub fn like_repo(mut self, repo: Arc<dyn LikeRepository>) -> Self {
        self.like_repo = Some(repo);
        self
    }

    pub fn notification_repo(mut self, repo: Arc<dyn NotificationRepository>) -> Self {
        self.notification_repo = Some(repo);
        self
    }

    pub fn member_repo(mut self, repo: Arc<dyn MemberRepository>) -> Self {
        self.member_repo = Some(repo);
        self
    }

    pub fn change_feed(mut self, feed: Arc<dyn ChangeFeed>) -> Self {
        self.change_feed = Some(feed);
        self
    }

    /// Use one backend for every repository and the change feed
    pub fn backend<B>(self, backend: Arc<B>) -> Self
    where
        B: CommentRepository
            + LikeRepository
            + NotificationRepository
            + MemberRepository
            + ChangeFeed
            + 'static,
    {
        self.comment_repo(backend.clone())
            .like_repo(backend.clone())
            .notification_repo(backend.clone())
            .member_repo(backend.clone())
            .change_feed(backend)
    }

    pub fn outbox(mut self, outbox: NotificationOutbox) -> Self {
        self.outbox = Some(outbox);
        self
    }

    /// Build the SyncContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<SyncContext> {
        Ok(SyncContext::new(
            self.user_id.ok_or_else(|| ServiceError::validation("user_id is required"))?,
            self.config.unwrap_or_default(),
            self.store.unwrap_or_default(),
            self.comment_repo.ok_or_else(|| ServiceError::validation("comment_repo is required"))?,
            self.like_repo.ok_or_else(|| ServiceError::validation("like_repo is required"))?,
            self.notification_repo.ok_or_else(|| ServiceError::validation("notification_repo is required"))?,
            self.member_repo.ok_or_else(|| ServiceError::validation("member_repo is required"))?,
            self.change_feed.ok_or_else(|| ServiceError::validation("change_feed is required"))?,
            self.outbox.ok_or_else(|| ServiceError::validation("outbox is required"))?,
        ))
    }
}
