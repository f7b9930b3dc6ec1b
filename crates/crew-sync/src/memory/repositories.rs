//! Repository ports over the in-memory tables

use async_trait::async_trait;

use crew_core::{
    ChangeEvent, Comment, CommentId, CommentRepository, DomainError, Like, LikeId, LikeRepository,
    LikeTarget, MemberProfile, MemberRepository, ModuleId, NewComment, NewLike, NewNotification,
    Notification, NotificationId, NotificationRepository, RepoResult, UserId, COMMENT_MAX_CHARS,
};

use super::{FailPoint, MemoryBackend};

// ============================================================================
// Comments
// ============================================================================

#[async_trait]
impl CommentRepository for MemoryBackend {
    async fn find_by_id(&self, id: &CommentId) -> RepoResult<Option<Comment>> {
        self.pause().await;
        let tables = self.tables.lock();
        Ok(tables
            .comments
            .iter()
            .find(|c| c.id == *id)
            .map(|c| tables.hydrate_comment(c)))
    }

    async fn find_top_level(&self, module_id: &ModuleId) -> RepoResult<Vec<Comment>> {
        self.pause().await;
        let tables = self.tables.lock();
        let mut comments: Vec<_> = tables
            .comments
            .iter()
            .filter(|c| c.module_id == *module_id && !c.is_reply())
            .map(|c| tables.hydrate_comment(c))
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }

    async fn find_replies(&self, parent_id: &CommentId) -> RepoResult<Vec<Comment>> {
        self.pause().await;
        let tables = self.tables.lock();
        let mut replies: Vec<_> = tables
            .comments
            .iter()
            .filter(|c| c.parent_id.as_ref() == Some(parent_id))
            .map(|c| tables.hydrate_comment(c))
            .collect();
        replies.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(replies)
    }

    async fn count_by_module(&self, module_id: &ModuleId) -> RepoResult<i64> {
        self.pause().await;
        let tables = self.tables.lock();
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.module_id == *module_id)
            .count() as i64)
    }

    async fn create(&self, comment: &NewComment) -> RepoResult<Comment> {
        self.check(FailPoint::CreateComment)?;
        comment.check(COMMENT_MAX_CHARS)?;

        let (row, hydrated) = {
            let mut tables = self.tables.lock();

            if let Some(parent_id) = &comment.parent_id {
                let parent_ok = tables.comments.iter().any(|c| {
                    c.id == *parent_id && !c.is_reply() && c.module_id == comment.module_id
                });
                if !parent_ok {
                    return Err(DomainError::ValidationError(format!(
                        "cannot reply to comment {parent_id}"
                    )));
                }
            }

            let mut row = Comment::new(
                CommentId::generate(),
                comment.module_id.clone(),
                comment.author_id.clone(),
                comment.content.clone(),
            );
            row.parent_id = comment.parent_id.clone();
            row.created_at = tables.next_timestamp();
            tables.comments.push(row.clone());
            let hydrated = tables.hydrate_comment(&row);
            (row, hydrated)
        };

        self.publish(ChangeEvent::CommentInserted(row));
        Ok(hydrated)
    }

    async fn delete(&self, id: &CommentId, author_id: &UserId) -> RepoResult<()> {
        self.check(FailPoint::DeleteComment)?;

        let removed = {
            let mut tables = self.tables.lock();
            let row = tables
                .comments
                .iter()
                .find(|c| c.id == *id)
                .ok_or_else(|| DomainError::CommentNotFound(id.clone()))?;
            if !row.is_authored_by(author_id) {
                return Err(DomainError::NotCommentAuthor);
            }
            tables.remove_comment_cascade(id)
        };

        self.publish_comment_deletes(removed);
        Ok(())
    }
}

// ============================================================================
// Likes
// ============================================================================

#[async_trait]
impl LikeRepository for MemoryBackend {
    async fn find(&self, user_id: &UserId, target: &LikeTarget) -> RepoResult<Option<Like>> {
        self.pause().await;
        Ok(self
            .tables
            .lock()
            .likes
            .iter()
            .find(|l| {
                l.user_id == *user_id
                    && l.target_id == target.target_id
                    && l.target_type == target.target_type
            })
            .cloned())
    }

    async fn count(&self, target: &LikeTarget) -> RepoResult<i64> {
        self.pause().await;
        Ok(self.tables.lock().like_count(target))
    }

    async fn create(&self, like: &NewLike) -> RepoResult<Like> {
        self.check(FailPoint::CreateLike)?;

        let row = {
            let mut tables = self.tables.lock();
            let exists = tables.likes.iter().any(|l| {
                l.user_id == like.user_id
                    && l.target_id == like.target.target_id
                    && l.target_type == like.target.target_type
            });
            if exists {
                return Err(DomainError::LikeAlreadyExists);
            }

            let mut row = Like::new(LikeId::generate(), like.user_id.clone(), like.target.clone());
            row.created_at = tables.next_timestamp();
            tables.likes.push(row.clone());
            row
        };

        self.publish(ChangeEvent::LikeInserted(row.clone()));
        Ok(row)
    }

    async fn delete(&self, user_id: &UserId, target: &LikeTarget) -> RepoResult<bool> {
        self.check(FailPoint::DeleteLike)?;
        Ok(self.remove_like(user_id, target))
    }
}

// ============================================================================
// Notifications
// ============================================================================

#[async_trait]
impl NotificationRepository for MemoryBackend {
    async fn find_by_id(&self, id: &NotificationId) -> RepoResult<Option<Notification>> {
        self.pause().await;
        let tables = self.tables.lock();
        Ok(tables
            .notifications
            .iter()
            .find(|n| n.id == *id)
            .map(|n| tables.hydrate_notification(n)))
    }

    async fn find_by_receiver(&self, receiver_id: &UserId, limit: i64) -> RepoResult<Vec<Notification>> {
        self.pause().await;
        let mut items = self.notifications_for(receiver_id);
        items.truncate(limit.clamp(1, 200) as usize);
        Ok(items)
    }

    async fn unread_count(&self, receiver_id: &UserId) -> RepoResult<i64> {
        self.pause().await;
        Ok(self.unread_for(receiver_id))
    }

    async fn create(&self, notification: &NewNotification) -> RepoResult<Notification> {
        self.check(FailPoint::CreateNotification)?;
        let (row, hydrated) = self.tables.lock().insert_notification(notification.clone());
        self.publish(ChangeEvent::NotificationInserted(row));
        Ok(hydrated)
    }

    async fn mark_read(&self, id: &NotificationId) -> RepoResult<()> {
        self.check(FailPoint::MarkRead)?;
        let mut tables = self.tables.lock();
        let row = tables
            .notifications
            .iter_mut()
            .find(|n| n.id == *id)
            .ok_or_else(|| DomainError::NotificationNotFound(id.clone()))?;
        row.is_read = true;
        Ok(())
    }

    async fn mark_all_read(&self, receiver_id: &UserId) -> RepoResult<u64> {
        self.check(FailPoint::MarkRead)?;
        let mut tables = self.tables.lock();
        let updated = tables
            .notifications
            .iter_mut()
            .filter(|n| n.is_for(receiver_id))
            .map(Notification::mark_read)
            .filter(|changed| *changed)
            .count();
        Ok(updated as u64)
    }
}

// ============================================================================
// Members
// ============================================================================

#[async_trait]
impl MemberRepository for MemoryBackend {
    async fn find_profile(&self, id: &UserId) -> RepoResult<Option<MemberProfile>> {
        self.pause().await;
        Ok(self.tables.lock().profile(id))
    }
}
