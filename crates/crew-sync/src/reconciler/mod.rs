//! Event reconciler
//!
//! Each consumer owns one change-feed subscription. Starting a consumer
//! subscribes first and primes the store second, so nothing that lands
//! while the initial fetch is in flight is missed; duplicates that
//! produces are absorbed by the store's merge-by-id.

mod comments;
mod counts;
mod likes;
mod notifications;
mod registry;

pub use comments::CommentListConsumer;
pub use counts::CommentCountConsumer;
pub use likes::LikeConsumer;
pub use notifications::NotificationConsumer;
pub use registry::{ConsumerKind, SubscriptionHandle, SubscriptionKey, SubscriptionRegistry};

use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, info, warn};

use crew_core::{ChangeEvent, ModuleId, Topic};

use crate::services::{ServiceResult, SyncContext};

/// A change-feed consumer that merges events into the store
#[async_trait]
pub trait Consumer: Send + Sync + 'static {
    fn key(&self) -> SubscriptionKey;

    fn topic(&self) -> Topic;

    /// Seed the store; writes only while `handle` is live
    async fn prime(&self, handle: &SubscriptionHandle) -> ServiceResult<()>;

    /// Merge one event; writes only while `handle` is live
    async fn handle(&self, event: ChangeEvent, handle: &SubscriptionHandle);
}

/// Starts and stops consumers for one session
pub struct Reconciler {
    ctx: SyncContext,
    registry: SubscriptionRegistry,
}

impl Reconciler {
    pub fn new(ctx: SyncContext) -> Self {
        Self {
            ctx,
            registry: SubscriptionRegistry::new(),
        }
    }

    pub fn context(&self) -> &SyncContext {
        &self.ctx
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    /// Keep a module's comment list live
    pub async fn watch_comments(&self, module_id: ModuleId) -> ServiceResult<SubscriptionHandle> {
        self.start(CommentListConsumer::new(self.ctx.clone(), module_id))
            .await
    }

    /// Keep a module's comment count live
    pub async fn watch_comment_count(&self, module_id: ModuleId) -> ServiceResult<SubscriptionHandle> {
        self.start(CommentCountConsumer::new(self.ctx.clone(), module_id))
            .await
    }

    /// Keep primed like counts live
    pub async fn watch_likes(&self) -> ServiceResult<SubscriptionHandle> {
        self.start(LikeConsumer::new(self.ctx.clone())).await
    }

    /// Keep the current member's inbox live
    pub async fn watch_notifications(&self) -> ServiceResult<SubscriptionHandle> {
        self.start(NotificationConsumer::new(self.ctx.clone())).await
    }

    /// Subscribe, prime, then drive `consumer` on its own task
    ///
    /// A consumer already registered under the same key is torn down first.
    pub async fn start<C: Consumer>(&self, consumer: C) -> ServiceResult<SubscriptionHandle> {
        let key = consumer.key();
        let handle = self.registry.register(key.clone());

        let mut events = match self.ctx.change_feed().subscribe(consumer.topic()).await {
            Ok(events) => events,
            Err(e) => {
                self.registry.release(&handle);
                return Err(e.into());
            }
        };

        if let Err(e) = consumer.prime(&handle).await {
            warn!(key = %key, error = %e, "Failed to prime subscription");
            self.registry.release(&handle);
            return Err(e);
        }

        if !handle.is_live() {
            debug!(key = %key, "Subscription replaced while priming");
            return Ok(handle);
        }

        let task_handle = handle.clone();
        let task = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if !task_handle.is_live() {
                    break;
                }
                consumer.handle(event, &task_handle).await;
            }
            debug!(key = %task_handle.key(), "Change stream ended");
        });
        self.registry.attach(&handle, task);

        info!(key = %key, "Subscription started");
        Ok(handle)
    }

    /// Stop one subscription
    pub fn unwatch(&self, key: &SubscriptionKey) -> bool {
        self.registry.teardown(key)
    }

    /// Stop every subscription
    pub fn shutdown(&self) {
        self.registry.teardown_all();
        info!("Reconciler stopped");
    }
}

impl Drop for Reconciler {
    fn drop(&mut self) {
        self.registry.teardown_all();
    }
}
