//! Like consumer
//!
//! The current member's own likes are already in the store from the
//! optimistic toggle, so their echoes are dropped. Other members' likes
//! move the count of targets the store holds.

use async_trait::async_trait;
use tracing::{debug, warn};

use crew_core::{ChangeEvent, Like, LikeDirection, RowPayload, Topic};

use crate::services::{ServiceResult, SyncContext};

use super::{Consumer, ConsumerKind, SubscriptionHandle, SubscriptionKey};

const REFETCH_ATTEMPTS: usize = 3;

/// Keeps primed like counts in step with other members' likes
pub struct LikeConsumer {
    ctx: SyncContext,
}

impl LikeConsumer {
    pub fn new(ctx: SyncContext) -> Self {
        Self { ctx }
    }

    fn apply(&self, like: &Like, direction: LikeDirection) {
        if like.is_by(self.ctx.user_id()) {
            debug!(like_id = %like.id, "Own like echo suppressed");
            return;
        }
        self.ctx.store().adjust_like_count(&like.target(), direction);
    }

    /// A delete with no row: refetch every primed target not mid-toggle
    ///
    /// A count is written only if no toggle touched the target while it was
    /// being fetched; otherwise it is fetched again.
    async fn refetch_all(&self, handle: &SubscriptionHandle) {
        let store = self.ctx.store();
        for target in store.primed_like_targets() {
            for _ in 0..REFETCH_ATTEMPTS {
                if store.is_like_in_flight(&target) {
                    break;
                }
                let epoch = store.like_epoch(&target);
                match self.ctx.like_repo().count(&target).await {
                    Ok(count) => {
                        if !handle.is_live() {
                            return;
                        }
                        if store.refresh_like_count(&target, count, epoch) {
                            break;
                        }
                        debug!(target = %target, "Like count moved during refetch");
                    }
                    Err(e) => {
                        warn!(target = %target, error = %e, "Like count refetch failed");
                        break;
                    }
                }
            }
        }
    }
}

#[async_trait]
impl Consumer for LikeConsumer {
    fn key(&self) -> SubscriptionKey {
        SubscriptionKey::new(ConsumerKind::Likes, self.ctx.user_id().as_str())
    }

    fn topic(&self) -> Topic {
        Topic::Likes
    }

    /// Targets are primed one by one through `LikeService::load`
    async fn prime(&self, _handle: &SubscriptionHandle) -> ServiceResult<()> {
        Ok(())
    }

    async fn handle(&self, event: ChangeEvent, handle: &SubscriptionHandle) {
        if !handle.is_live() {
            return;
        }
        match event {
            ChangeEvent::LikeInserted(like) => self.apply(&like, LikeDirection::On),
            ChangeEvent::LikeDeleted(RowPayload::Full { row }) => self.apply(&row, LikeDirection::Off),
            ChangeEvent::LikeDeleted(RowPayload::Partial { .. }) => self.refetch_all(handle).await,
            _ => {}
        }
    }
}
