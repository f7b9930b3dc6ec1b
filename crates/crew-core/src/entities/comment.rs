//! Comment entity - a message attached to a module, optionally replying to
//! a top-level comment

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::DomainError;
use crate::value_objects::{CommentId, ModuleId, UserId};

use super::member::MemberProfile;

/// Schema-level ceiling on comment length (characters, not bytes)
pub const COMMENT_MAX_CHARS: usize = 500;

/// Comment entity
///
/// `author` and `replies` are read-time joins: rows coming straight off the
/// change stream carry neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub content: String,
    pub author_id: UserId,
    pub module_id: ModuleId,
    pub parent_id: Option<CommentId>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<MemberProfile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<Comment>,
}

impl Comment {
    /// Create a new top-level Comment
    pub fn new(id: CommentId, module_id: ModuleId, author_id: UserId, content: String) -> Self {
        Self {
            id,
            content,
            author_id,
            module_id,
            parent_id: None,
            created_at: Utc::now(),
            author: None,
            replies: Vec::new(),
        }
    }

    /// Create a reply to a top-level comment
    pub fn new_reply(
        id: CommentId,
        module_id: ModuleId,
        author_id: UserId,
        content: String,
        parent_id: CommentId,
    ) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::new(id, module_id, author_id, content)
        }
    }

    /// Check if this comment replies to another one
    #[inline]
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    /// This comment plus its held replies
    #[inline]
    pub fn thread_len(&self) -> usize {
        1 + self.replies.len()
    }

    /// Check whether `id` is this comment or one of its replies
    pub fn contains(&self, id: &CommentId) -> bool {
        self.id == *id || self.replies.iter().any(|r| r.id == *id)
    }

    /// Check if `user_id` wrote this comment
    #[inline]
    pub fn is_authored_by(&self, user_id: &UserId) -> bool {
        self.author_id == *user_id
    }

    /// Truncated preview of the content, `...` appended when cut
    pub fn preview(&self, max_chars: usize) -> String {
        preview_text(&self.content, max_chars)
    }
}

/// Truncate `text` to `max_chars` characters, appending `...` when cut
pub(crate) fn preview_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// A comment about to be posted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewComment {
    #[validate(length(min = 1, max = 500, message = "Comment must be 1-500 characters"))]
    pub content: String,
    pub author_id: UserId,
    pub module_id: ModuleId,
    pub parent_id: Option<CommentId>,
}

impl NewComment {
    /// Build a draft; surrounding whitespace is not part of the comment
    pub fn new(
        content: &str,
        author_id: UserId,
        module_id: ModuleId,
        parent_id: Option<CommentId>,
    ) -> Self {
        Self {
            content: content.trim().to_string(),
            author_id,
            module_id,
            parent_id,
        }
    }

    /// Validate against the schema ceiling and a (possibly tighter) configured limit
    pub fn check(&self, max_chars: usize) -> Result<(), DomainError> {
        if self.content.is_empty() {
            return Err(DomainError::EmptyContent);
        }

        let limit = max_chars.min(COMMENT_MAX_CHARS);
        if self.content.chars().count() > limit {
            return Err(DomainError::ContentTooLong { max: limit });
        }

        self.validate()
            .map_err(|e| DomainError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: &str) -> Comment {
        Comment::new(
            CommentId::new(id),
            ModuleId::new("gallery"),
            UserId::new("u1"),
            "Hello, crew!".to_string(),
        )
    }

    #[test]
    fn test_comment_creation() {
        let c = comment("c1");
        assert!(!c.is_reply());
        assert_eq!(c.thread_len(), 1);
        assert!(c.is_authored_by(&UserId::new("u1")));
    }

    #[test]
    fn test_comment_reply() {
        let reply = Comment::new_reply(
            CommentId::new("c2"),
            ModuleId::new("gallery"),
            UserId::new("u2"),
            "Agreed".to_string(),
            CommentId::new("c1"),
        );
        assert!(reply.is_reply());
        assert_eq!(reply.parent_id, Some(CommentId::new("c1")));
    }

    #[test]
    fn test_contains_checks_replies() {
        let mut parent = comment("c1");
        parent.replies.push(comment("c2"));
        assert!(parent.contains(&CommentId::new("c1")));
        assert!(parent.contains(&CommentId::new("c2")));
        assert!(!parent.contains(&CommentId::new("c3")));
    }

    #[test]
    fn test_preview_counts_characters() {
        assert_eq!(preview_text("短文本", 20), "短文本");
        assert_eq!(preview_text("一二三四五六", 3), "一二三...");
        assert_eq!(preview_text("abc", 3), "abc");
    }

    #[test]
    fn test_new_comment_trims() {
        let draft = NewComment::new("  hi  ", UserId::new("u1"), ModuleId::new("m"), None);
        assert_eq!(draft.content, "hi");
        assert!(draft.check(COMMENT_MAX_CHARS).is_ok());
    }

    #[test]
    fn test_new_comment_rejects_blank() {
        let draft = NewComment::new("   ", UserId::new("u1"), ModuleId::new("m"), None);
        assert!(matches!(
            draft.check(COMMENT_MAX_CHARS),
            Err(DomainError::EmptyContent)
        ));
    }

    #[test]
    fn test_new_comment_rejects_oversize() {
        let long = "a".repeat(COMMENT_MAX_CHARS + 1);
        let draft = NewComment::new(&long, UserId::new("u1"), ModuleId::new("m"), None);
        assert!(matches!(
            draft.check(COMMENT_MAX_CHARS),
            Err(DomainError::ContentTooLong { max: 500 })
        ));

        let draft = NewComment::new("abcdef", UserId::new("u1"), ModuleId::new("m"), None);
        assert!(matches!(
            draft.check(5),
            Err(DomainError::ContentTooLong { max: 5 })
        ));
    }

    #[test]
    fn test_multibyte_limit_is_in_characters() {
        let text = "字".repeat(COMMENT_MAX_CHARS);
        let draft = NewComment::new(&text, UserId::new("u1"), ModuleId::new("m"), None);
        assert!(draft.check(COMMENT_MAX_CHARS).is_ok());
    }
}
