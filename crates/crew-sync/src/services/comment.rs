//! Comment service
//!
//! Posting waits for the server: the returned row (with its id, timestamp
//! and author) is merged into the store. Deleting also waits, and only a
//! confirmed delete touches the store.

use crew_core::{Comment, CommentId, DomainError, ModuleId, NewComment, NewNotification, UserId};
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::context::SyncContext;
use super::error::{ServiceError, ServiceResult};

/// A failed post, carrying the member's input back untouched
#[derive(Debug, Error)]
#[error("{error}")]
pub struct CommentDraftError {
    pub draft: String,
    #[source]
    pub error: ServiceError,
}

impl CommentDraftError {
    fn new(draft: &str, error: impl Into<ServiceError>) -> Self {
        Self {
            draft: draft.to_string(),
            error: error.into(),
        }
    }
}

/// Comment service
pub struct CommentService<'a> {
    ctx: &'a SyncContext,
}

impl<'a> CommentService<'a> {
    /// Create a new CommentService
    pub fn new(ctx: &'a SyncContext) -> Self {
        Self { ctx }
    }

    /// Fetch a module's top-level comments with their replies attached
    #[instrument(skip(self), fields(module_id = %module_id))]
    pub async fn fetch_thread(&self, module_id: &ModuleId) -> ServiceResult<Vec<Comment>> {
        let mut comments = self.ctx.comment_repo().find_top_level(module_id).await?;
        for comment in &mut comments {
            comment.replies = self.ctx.comment_repo().find_replies(&comment.id).await?;
        }
        Ok(comments)
    }

    /// Fetch a module's thread and replace the held one
    pub async fn load(&self, module_id: &ModuleId) -> ServiceResult<Vec<Comment>> {
        let comments = self.fetch_thread(module_id).await?;
        self.ctx
            .store()
            .prime_thread(module_id.clone(), comments.clone());
        Ok(comments)
    }

    /// Fetch a module's comment count (replies included) and hold it
    #[instrument(skip(self), fields(module_id = %module_id))]
    pub async fn load_count(&self, module_id: &ModuleId) -> ServiceResult<i64> {
        let count = self.ctx.comment_repo().count_by_module(module_id).await?;
        self.ctx.store().set_comment_count(module_id.clone(), count);
        Ok(count)
    }

    /// Post a comment, or a reply when `parent_id` is given
    ///
    /// Validation happens before any request. `content_owner` is whoever
    /// owns the commented content; they are notified of top-level comments.
    #[instrument(skip(self, text), fields(module_id = %module_id, user_id = %self.ctx.user_id()))]
    pub async fn post(
        &self,
        module_id: &ModuleId,
        text: &str,
        parent_id: Option<&CommentId>,
        content_owner: Option<&UserId>,
    ) -> Result<Comment, CommentDraftError> {
        let draft = NewComment::new(
            text,
            self.ctx.user_id().clone(),
            module_id.clone(),
            parent_id.cloned(),
        );
        draft
            .check(self.ctx.config().comment_max_chars)
            .map_err(|e| CommentDraftError::new(text, e))?;

        let comment = match self.ctx.comment_repo().create(&draft).await {
            Ok(comment) => comment,
            Err(e) => {
                warn!(error = %e, "Failed to post comment");
                return Err(CommentDraftError::new(text, e));
            }
        };

        info!(comment_id = %comment.id, is_reply = comment.is_reply(), "Comment posted");

        self.notify(&comment, content_owner);
        self.ctx.store().upsert_comment(comment.clone());
        Ok(comment)
    }

    /// Delete one of the current member's comments
    #[instrument(skip(self), fields(user_id = %self.ctx.user_id()))]
    pub async fn delete(&self, comment_id: &CommentId) -> ServiceResult<()> {
        if let Err(e) = self
            .ctx
            .comment_repo()
            .delete(comment_id, self.ctx.user_id())
            .await
        {
            warn!(error = %e, "Failed to delete comment");
            return Err(e.into());
        }

        self.ctx.store().remove_comment(comment_id);
        info!(comment_id = %comment_id, "Comment deleted");
        Ok(())
    }

    fn notify(&self, comment: &Comment, content_owner: Option<&UserId>) {
        let preview_chars = self.ctx.config().preview_chars;
        let actor = self.ctx.user_id().clone();

        let notification = match &comment.parent_id {
            Some(parent_id) => {
                let Some(parent) = self
                    .ctx
                    .store()
                    .find_top_level_comment(&comment.module_id, parent_id)
                else {
                    return;
                };
                NewNotification::reply(
                    parent.author_id,
                    actor,
                    &comment.id,
                    &comment.content,
                    preview_chars,
                )
            }
            None => {
                let Some(owner) = content_owner else {
                    return;
                };
                NewNotification::comment(
                    owner.clone(),
                    actor,
                    &comment.id,
                    &comment.module_id,
                    &comment.content,
                    preview_chars,
                )
            }
        };

        match notification {
            Ok(notification) => self.ctx.outbox().enqueue(notification),
            Err(DomainError::SelfNotification) => {}
            Err(e) => warn!(error = %e, "Failed to build comment notification"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{FailPoint, MemoryBackend};
    use crate::services::outbox::{NotificationOutbox, OutboxWorker};
    use crew_core::{MemberProfile, NotificationKind};
    use std::sync::Arc;

    fn setup(user: &str) -> (Arc<MemoryBackend>, SyncContext, OutboxWorker) {
        let backend = Arc::new(MemoryBackend::new());
        backend.add_member(MemberProfile::new(UserId::new(user), "Me"));
        let (outbox, rx) = NotificationOutbox::channel();
        let ctx = SyncContext::builder()
            .user_id(user)
            .backend(backend.clone())
            .outbox(outbox)
            .build()
            .unwrap();
        let worker = OutboxWorker::new(rx, backend.clone());
        (backend, ctx, worker)
    }

    #[tokio::test]
    async fn test_post_merges_returned_row() {
        let (_backend, ctx, _worker) = setup("me");
        let module = ModuleId::new("gallery");
        let service = CommentService::new(&ctx);

        let comment = service.post(&module, "  hello  ", None, None).await.unwrap();
        assert_eq!(comment.content, "hello");
        assert_eq!(comment.author.as_ref().map(|a| a.name.as_str()), Some("Me"));
        assert_eq!(ctx.store().comments(&module), vec![comment]);
    }

    #[tokio::test]
    async fn test_validation_never_reaches_server() {
        let (backend, ctx, _worker) = setup("me");
        let module = ModuleId::new("gallery");
        let service = CommentService::new(&ctx);

        // Would fail if it got that far
        backend.fail_next(FailPoint::CreateComment);
        let err = service.post(&module, "   ", None, None).await.unwrap_err();
        assert!(matches!(err.error, ServiceError::Domain(DomainError::EmptyContent)));
        assert_eq!(err.draft, "   ");

        let long = "x".repeat(501);
        let err = service.post(&module, &long, None, None).await.unwrap_err();
        assert!(matches!(
            err.error,
            ServiceError::Domain(DomainError::ContentTooLong { max: 500 })
        ));

        // The injected failure is still armed
        assert!(service.post(&module, "ok", None, None).await.is_err());
        assert!(backend.comment_rows().is_empty());
    }

    #[tokio::test]
    async fn test_failed_post_returns_draft() {
        let (backend, ctx, _worker) = setup("me");
        let module = ModuleId::new("gallery");
        backend.fail_next(FailPoint::CreateComment);

        let err = CommentService::new(&ctx)
            .post(&module, "keep me", None, None)
            .await
            .unwrap_err();
        assert_eq!(err.draft, "keep me");
        assert!(err.error.is_transient());
        assert!(!ctx.store().has_thread(&module));
    }

    #[tokio::test]
    async fn test_reply_nested_under_parent() {
        let (backend, ctx, _worker) = setup("me");
        let module = ModuleId::new("gallery");
        let parent = backend.seed_comment(&UserId::new("u2"), &module, "first", None);
        let service = CommentService::new(&ctx);
        service.load(&module).await.unwrap();

        let reply = service
            .post(&module, "reply", Some(&parent.id), None)
            .await
            .unwrap();

        let held = ctx.store().comments(&module);
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].replies, vec![reply]);
        assert_eq!(ctx.store().thread_total(&module), 2);
    }

    #[tokio::test]
    async fn test_reply_notifies_parent_author() {
        let (backend, ctx, mut worker) = setup("me");
        let module = ModuleId::new("gallery");
        let parent = backend.seed_comment(&UserId::new("u2"), &module, "first", None);
        let service = CommentService::new(&ctx);
        service.load(&module).await.unwrap();

        let reply = service
            .post(&module, "a reply that is longer than twenty", Some(&parent.id), None)
            .await
            .unwrap();
        worker.process_pending().await;

        let stored = backend.notifications_for(&UserId::new("u2"));
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].kind, NotificationKind::Reply);
        assert_eq!(stored[0].target_id.as_str(), reply.id.as_str());
        assert_eq!(stored[0].content, "replied to your comment: a reply that is long...");
    }

    #[tokio::test]
    async fn test_own_thread_reply_not_notified() {
        let (backend, ctx, mut worker) = setup("me");
        let module = ModuleId::new("gallery");
        let parent = backend.seed_comment(&UserId::new("me"), &module, "mine", None);
        let service = CommentService::new(&ctx);
        service.load(&module).await.unwrap();

        service.post(&module, "me again", Some(&parent.id), None).await.unwrap();
        assert_eq!(worker.process_pending().await, 0);
    }

    #[tokio::test]
    async fn test_top_level_notifies_content_owner() {
        let (backend, ctx, mut worker) = setup("me");
        let module = ModuleId::new("photo-42");
        let service = CommentService::new(&ctx);

        service
            .post(&module, "nice", None, Some(&UserId::new("owner")))
            .await
            .unwrap();
        service
            .post(&module, "nice", None, Some(&UserId::new("me")))
            .await
            .unwrap();
        assert_eq!(worker.process_pending().await, 1);

        let stored = backend.notifications_for(&UserId::new("owner"));
        assert_eq!(stored[0].kind, NotificationKind::Comment);
        assert_eq!(stored[0].content, "commented: nice");
        assert_eq!(stored[0].target_type, "photo-42");
    }

    #[tokio::test]
    async fn test_delete_by_non_author_keeps_store() {
        let (backend, ctx, _worker) = setup("me");
        let module = ModuleId::new("gallery");
        let theirs = backend.seed_comment(&UserId::new("u2"), &module, "theirs", None);
        let service = CommentService::new(&ctx);
        service.load(&module).await.unwrap();

        let err = service.delete(&theirs.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::NotCommentAuthor)));
        assert_eq!(ctx.store().thread_total(&module), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_thread() {
        let (backend, ctx, _worker) = setup("me");
        let module = ModuleId::new("gallery");
        let mine = backend.seed_comment(&UserId::new("me"), &module, "mine", None);
        backend.seed_comment(&UserId::new("u2"), &module, "reply", Some(&mine.id));
        let service = CommentService::new(&ctx);
        service.load(&module).await.unwrap();
        assert_eq!(ctx.store().thread_total(&module), 2);

        service.delete(&mine.id).await.unwrap();
        assert_eq!(ctx.store().thread_total(&module), 0);
        assert!(backend.comment_rows().is_empty());
    }

    #[tokio::test]
    async fn test_load_count_includes_replies() {
        let (backend, ctx, _worker) = setup("me");
        let module = ModuleId::new("gallery");
        let parent = backend.seed_comment(&UserId::new("u2"), &module, "a", None);
        backend.seed_comment(&UserId::new("u3"), &module, "b", Some(&parent.id));

        assert_eq!(CommentService::new(&ctx).load_count(&module).await.unwrap(), 2);
        assert_eq!(ctx.store().comment_count(&module), 2);
    }
}
