//! Comment list consumer

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crew_core::{ChangeEvent, Comment, CommentId, ModuleId, RowPayload, Topic};

use crate::services::{CommentService, ServiceResult, SyncContext};

use super::{Consumer, ConsumerKind, SubscriptionHandle, SubscriptionKey};

/// Keeps one module's held thread in step with the change feed
pub struct CommentListConsumer {
    ctx: SyncContext,
    module_id: ModuleId,
}

impl CommentListConsumer {
    pub fn new(ctx: SyncContext, module_id: ModuleId) -> Self {
        Self { ctx, module_id }
    }

    /// Hydrate a pushed row with its author; falls back to the raw row
    async fn hydrate(&self, row: Comment) -> Option<Comment> {
        match self.ctx.comment_repo().find_by_id(&row.id).await {
            Ok(Some(full)) => Some(full),
            // Deleted before we could look it up
            Ok(None) => None,
            Err(e) => {
                warn!(comment_id = %row.id, error = %e, "Comment hydration failed, using pushed row");
                Some(row)
            }
        }
    }

    async fn on_insert(&self, row: Comment, handle: &SubscriptionHandle) {
        if row.module_id != self.module_id {
            return;
        }
        if self.ctx.store().contains_comment(&self.module_id, &row.id) {
            debug!(comment_id = %row.id, "Duplicate comment insert ignored");
            return;
        }

        let Some(comment) = self.hydrate(row).await else {
            return;
        };
        if handle.is_live() {
            self.ctx.store().upsert_comment(comment);
        }
    }

    fn on_delete(&self, payload: &RowPayload<Comment>) {
        if let Some(module_id) = payload.module_id() {
            if *module_id != self.module_id {
                return;
            }
        }
        // Without a module the id may belong anywhere; removal is a no-op if absent
        self.ctx.store().remove_comment(&CommentId::new(payload.id()));
    }
}

#[async_trait]
impl Consumer for CommentListConsumer {
    fn key(&self) -> SubscriptionKey {
        SubscriptionKey::new(ConsumerKind::CommentList, self.module_id.as_str())
    }

    fn topic(&self) -> Topic {
        Topic::ModuleComments(self.module_id.clone())
    }

    #[instrument(skip(self, handle), fields(module_id = %self.module_id))]
    async fn prime(&self, handle: &SubscriptionHandle) -> ServiceResult<()> {
        let comments = CommentService::new(&self.ctx)
            .fetch_thread(&self.module_id)
            .await?;
        if handle.is_live() {
            self.ctx.store().prime_thread(self.module_id.clone(), comments);
        }
        Ok(())
    }

    async fn handle(&self, event: ChangeEvent, handle: &SubscriptionHandle) {
        match event {
            ChangeEvent::CommentInserted(row) => self.on_insert(row, handle).await,
            ChangeEvent::CommentDeleted(payload) => {
                if handle.is_live() {
                    self.on_delete(&payload);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use crate::reconciler::SubscriptionRegistry;
    use crate::services::NotificationOutbox;
    use crew_core::{MemberProfile, UserId};
    use std::sync::Arc;

    fn setup() -> (Arc<MemoryBackend>, SyncContext) {
        let backend = Arc::new(MemoryBackend::new());
        backend.add_member(MemberProfile::new(UserId::new("u2"), "Min"));
        let (outbox, _rx) = NotificationOutbox::channel();
        let ctx = SyncContext::builder()
            .user_id("me")
            .backend(backend.clone())
            .outbox(outbox)
            .build()
            .unwrap();
        (backend, ctx)
    }

    #[tokio::test]
    async fn test_insert_is_hydrated_and_idempotent() {
        let (backend, ctx) = setup();
        let module = ModuleId::new("gallery");
        let registry = SubscriptionRegistry::new();
        let handle = registry.register(SubscriptionKey::new(ConsumerKind::CommentList, "gallery"));
        let consumer = CommentListConsumer::new(ctx.clone(), module.clone());
        consumer.prime(&handle).await.unwrap();

        let hydrated = backend.seed_comment(&UserId::new("u2"), &module, "hey", None);
        let raw = Comment {
            author: None,
            ..hydrated.clone()
        };

        consumer.handle(ChangeEvent::CommentInserted(raw.clone()), &handle).await;
        consumer.handle(ChangeEvent::CommentInserted(raw), &handle).await;

        assert_eq!(ctx.store().comments(&module), vec![hydrated]);
    }

    #[tokio::test]
    async fn test_other_module_insert_ignored() {
        let (backend, ctx) = setup();
        let module = ModuleId::new("gallery");
        let registry = SubscriptionRegistry::new();
        let handle = registry.register(SubscriptionKey::new(ConsumerKind::CommentList, "gallery"));
        let consumer = CommentListConsumer::new(ctx.clone(), module.clone());

        let elsewhere = backend.seed_comment(&UserId::new("u2"), &ModuleId::new("other"), "x", None);
        consumer.handle(ChangeEvent::CommentInserted(elsewhere), &handle).await;
        assert_eq!(ctx.store().thread_total(&module), 0);
        assert!(!ctx.store().has_thread(&ModuleId::new("other")));
    }

    #[tokio::test]
    async fn test_partial_delete_removes_anywhere() {
        let (backend, ctx) = setup();
        let module = ModuleId::new("gallery");
        let c = backend.seed_comment(&UserId::new("u2"), &module, "hey", None);
        let registry = SubscriptionRegistry::new();
        let handle = registry.register(SubscriptionKey::new(ConsumerKind::CommentList, "gallery"));
        let consumer = CommentListConsumer::new(ctx.clone(), module.clone());
        consumer.prime(&handle).await.unwrap();

        consumer
            .handle(ChangeEvent::CommentDeleted(RowPayload::partial("unknown")), &handle)
            .await;
        assert_eq!(ctx.store().thread_total(&module), 1);

        consumer
            .handle(ChangeEvent::CommentDeleted(RowPayload::partial(c.id.as_str())), &handle)
            .await;
        assert_eq!(ctx.store().thread_total(&module), 0);
    }

    #[tokio::test]
    async fn test_full_delete_for_other_module_ignored() {
        let (backend, ctx) = setup();
        let module = ModuleId::new("gallery");
        let c = backend.seed_comment(&UserId::new("u2"), &module, "hey", None);
        let registry = SubscriptionRegistry::new();
        let handle = registry.register(SubscriptionKey::new(ConsumerKind::CommentList, "other"));
        let other = CommentListConsumer::new(ctx.clone(), ModuleId::new("other"));
        CommentService::new(&ctx).load(&module).await.unwrap();

        other
            .handle(ChangeEvent::CommentDeleted(RowPayload::full(c)), &handle)
            .await;
        assert_eq!(ctx.store().thread_total(&module), 1);
    }

    #[tokio::test]
    async fn test_torn_down_handle_discards_results() {
        let (backend, ctx) = setup();
        let module = ModuleId::new("gallery");
        backend.seed_comment(&UserId::new("u2"), &module, "hey", None);
        let registry = SubscriptionRegistry::new();
        let handle = registry.register(SubscriptionKey::new(ConsumerKind::CommentList, "gallery"));
        registry.release(&handle);

        let consumer = CommentListConsumer::new(ctx.clone(), module.clone());
        consumer.prime(&handle).await.unwrap();
        assert!(!ctx.store().has_thread(&module));
    }
}
