//! Notification consumer

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crew_core::{ChangeEvent, Notification, Topic};

use crate::services::{NotificationService, ServiceResult, SyncContext};

use super::{Consumer, ConsumerKind, SubscriptionHandle, SubscriptionKey};

/// Keeps the current member's inbox and badge in step
pub struct NotificationConsumer {
    ctx: SyncContext,
}

impl NotificationConsumer {
    pub fn new(ctx: SyncContext) -> Self {
        Self { ctx }
    }

    async fn hydrate(&self, row: Notification) -> Notification {
        match self.ctx.notification_repo().find_by_id(&row.id).await {
            Ok(Some(full)) => full,
            Ok(None) => row,
            Err(e) => {
                warn!(notification_id = %row.id, error = %e, "Notification hydration failed, using pushed row");
                row
            }
        }
    }
}

#[async_trait]
impl Consumer for NotificationConsumer {
    fn key(&self) -> SubscriptionKey {
        SubscriptionKey::new(ConsumerKind::Notifications, self.ctx.user_id().as_str())
    }

    fn topic(&self) -> Topic {
        Topic::Notifications(self.ctx.user_id().clone())
    }

    #[instrument(skip(self, handle), fields(user_id = %self.ctx.user_id()))]
    async fn prime(&self, handle: &SubscriptionHandle) -> ServiceResult<()> {
        let (items, unread) = NotificationService::new(&self.ctx).fetch().await?;
        if handle.is_live() {
            self.ctx.store().prime_notifications(items, unread);
        }
        Ok(())
    }

    async fn handle(&self, event: ChangeEvent, handle: &SubscriptionHandle) {
        let ChangeEvent::NotificationInserted(row) = event else {
            return;
        };
        if !row.is_for(self.ctx.user_id()) {
            return;
        }
        if self.ctx.store().contains_notification(&row.id) {
            debug!(notification_id = %row.id, "Duplicate notification ignored");
            return;
        }

        let notification = self.hydrate(row).await;
        if handle.is_live() {
            self.ctx.store().upsert_notification(notification);
        }
    }
}
