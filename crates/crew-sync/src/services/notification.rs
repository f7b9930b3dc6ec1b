//! Notification service

use crew_core::{Notification, NotificationId};
use tracing::{info, instrument};

use super::context::SyncContext;
use super::error::ServiceResult;

/// Notification service
pub struct NotificationService<'a> {
    ctx: &'a SyncContext,
}

impl<'a> NotificationService<'a> {
    /// Create a new NotificationService
    pub fn new(ctx: &'a SyncContext) -> Self {
        Self { ctx }
    }

    /// Fetch the latest page and the unread count for the current member
    #[instrument(skip(self), fields(user_id = %self.ctx.user_id()))]
    pub async fn fetch(&self) -> ServiceResult<(Vec<Notification>, i64)> {
        let repo = self.ctx.notification_repo();
        let user_id = self.ctx.user_id();

        let items = repo
            .find_by_receiver(user_id, self.ctx.config().notification_page_size)
            .await?;
        let unread = repo.unread_count(user_id).await?;
        Ok((items, unread))
    }

    /// Fetch and replace the held inbox
    pub async fn load(&self) -> ServiceResult<Vec<Notification>> {
        let (items, unread) = self.fetch().await?;
        self.ctx.store().prime_notifications(items.clone(), unread);
        Ok(items)
    }

    /// Mark one notification read; the store follows the server
    #[instrument(skip(self))]
    pub async fn mark_read(&self, id: &NotificationId) -> ServiceResult<()> {
        self.ctx.notification_repo().mark_read(id).await?;
        self.ctx.store().mark_read(id);
        Ok(())
    }

    /// Mark everything read for the current member
    #[instrument(skip(self), fields(user_id = %self.ctx.user_id()))]
    pub async fn mark_all_read(&self) -> ServiceResult<u64> {
        let updated = self
            .ctx
            .notification_repo()
            .mark_all_read(self.ctx.user_id())
            .await?;
        self.ctx.store().mark_all_read();

        info!(updated, "Notifications marked read");
        Ok(updated)
    }

    /// Held unread badge value
    pub fn unread_count(&self) -> i64 {
        self.ctx.store().unread_count()
    }
}
