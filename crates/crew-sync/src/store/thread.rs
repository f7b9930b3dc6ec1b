//! Comment thread held for one module
//!
//! Top-level comments are kept newest-first; replies inside a group are
//! kept oldest-first. Ids are unique across the whole thread.

use crew_core::{Comment, CommentId};

/// Ordered comments of one module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentThread {
    comments: Vec<Comment>,
}

impl CommentThread {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a thread from fetched rows
    ///
    /// Rows may arrive either nested (replies inside their parent) or flat;
    /// both are placed the same way `upsert` would place them.
    pub fn from_comments(comments: Vec<Comment>) -> Self {
        let mut thread = Self::new();
        let (top_level, replies): (Vec<_>, Vec<_>) =
            comments.into_iter().partition(|c| !c.is_reply());

        for comment in top_level.into_iter().chain(replies) {
            thread.upsert(comment);
        }
        thread
    }

    /// Top-level comments with their replies
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Whether `id` is held anywhere in the thread
    pub fn contains(&self, id: &CommentId) -> bool {
        self.comments.iter().any(|c| c.contains(id))
    }

    pub fn find_top_level(&self, id: &CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == *id)
    }

    /// Top-level comments plus every reply
    pub fn total(&self) -> usize {
        self.comments.iter().map(Comment::thread_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Insert a comment (and any replies it carries) unless already held
    ///
    /// Returns whether anything was inserted.
    pub fn upsert(&mut self, mut comment: Comment) -> bool {
        let replies = std::mem::take(&mut comment.replies);

        match comment.parent_id.clone() {
            Some(parent_id) => self.insert_reply(&parent_id, comment),
            None => {
                let parent_id = comment.id.clone();
                let mut changed = self.insert_top_level(comment);
                for reply in replies {
                    if reply.parent_id.as_ref() == Some(&parent_id) {
                        changed |= self.insert_reply(&parent_id, reply);
                    }
                }
                changed
            }
        }
    }

    /// Remove a comment wherever it sits; a top-level comment takes its
    /// replies with it
    pub fn remove(&mut self, id: &CommentId) -> bool {
        if let Some(pos) = self.comments.iter().position(|c| c.id == *id) {
            self.comments.remove(pos);
            return true;
        }

        for comment in &mut self.comments {
            if let Some(pos) = comment.replies.iter().position(|r| r.id == *id) {
                comment.replies.remove(pos);
                return true;
            }
        }
        false
    }

    fn insert_top_level(&mut self, comment: Comment) -> bool {
        if self.contains(&comment.id) {
            return false;
        }
        let pos = self
            .comments
            .partition_point(|c| c.created_at >= comment.created_at);
        self.comments.insert(pos, comment);
        true
    }

    fn insert_reply(&mut self, parent_id: &CommentId, mut reply: Comment) -> bool {
        if self.contains(&reply.id) {
            return false;
        }

        let Some(parent) = self.comments.iter_mut().find(|c| c.id == *parent_id) else {
            tracing::debug!(comment_id = %reply.id, parent_id = %parent_id, "Dropping reply to unheld parent");
            return false;
        };

        // One level of nesting only
        reply.replies.clear();
        let pos = parent
            .replies
            .partition_point(|r| r.created_at <= reply.created_at);
        parent.replies.insert(pos, reply);
        true
    }
}
