//! Notification entity - an activity item addressed to one member

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::value_objects::{CommentId, ModuleId, NotificationId, TargetId, UserId};

use super::comment::preview_text;
use super::like::LikeTarget;
use super::member::MemberProfile;

/// Characters of the triggering comment quoted in a notification
pub const NOTIFICATION_PREVIEW_CHARS: usize = 20;

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Like,
    Comment,
    Reply,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Comment => "comment",
            Self::Reply => "reply",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            "comment" => Ok(Self::Comment),
            "reply" => Ok(Self::Reply),
            other => Err(DomainError::ValidationError(format!(
                "unknown notification kind: {other}"
            ))),
        }
    }
}

/// Notification entity
///
/// `target_type` is free text: like notifications carry the liked content's
/// type, comment notifications carry the module the comment was posted on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub receiver_id: UserId,
    pub actor_id: UserId,
    pub kind: NotificationKind,
    pub content: String,
    pub target_id: TargetId,
    pub target_type: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<MemberProfile>,
}

impl Notification {
    /// Materialize a validated draft into a stored row
    pub fn from_new(id: NotificationId, new: NewNotification) -> Self {
        Self {
            id,
            receiver_id: new.receiver_id,
            actor_id: new.actor_id,
            kind: new.kind,
            content: new.content,
            target_id: new.target_id,
            target_type: new.target_type,
            is_read: false,
            created_at: Utc::now(),
            actor: None,
        }
    }

    /// Mark as read, returning whether the flag changed
    pub fn mark_read(&mut self) -> bool {
        if self.is_read {
            return false;
        }
        self.is_read = true;
        true
    }

    #[inline]
    pub fn is_for(&self, user_id: &UserId) -> bool {
        self.receiver_id == *user_id
    }
}

/// A notification about to be created
///
/// Fields are private so the only way to obtain one is through a
/// constructor that rejects self-notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewNotification {
    receiver_id: UserId,
    actor_id: UserId,
    kind: NotificationKind,
    content: String,
    target_id: TargetId,
    target_type: String,
}

impl NewNotification {
    /// Create a notification draft
    ///
    /// # Errors
    /// Returns `SelfNotification` when the receiver is the actor.
    pub fn new(
        receiver_id: UserId,
        actor_id: UserId,
        kind: NotificationKind,
        content: impl Into<String>,
        target_id: TargetId,
        target_type: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if receiver_id == actor_id {
            return Err(DomainError::SelfNotification);
        }

        Ok(Self {
            receiver_id,
            actor_id,
            kind,
            content: content.into(),
            target_id,
            target_type: target_type.into(),
        })
    }

    /// Someone liked the receiver's content
    pub fn like(
        receiver_id: UserId,
        actor_id: UserId,
        target: &LikeTarget,
    ) -> Result<Self, DomainError> {
        let content = format!("liked your {}", target.target_type.noun());
        Self::new(
            receiver_id,
            actor_id,
            NotificationKind::Like,
            content,
            target.target_id.clone(),
            target.target_type.as_str(),
        )
    }

    /// Someone replied to the receiver's comment; targets the new reply
    pub fn reply(
        receiver_id: UserId,
        actor_id: UserId,
        reply_id: &CommentId,
        text: &str,
        preview_chars: usize,
    ) -> Result<Self, DomainError> {
        let content = format!("replied to your comment: {}", preview_text(text, preview_chars));
        Self::new(
            receiver_id,
            actor_id,
            NotificationKind::Reply,
            content,
            TargetId::from(reply_id),
            "comment",
        )
    }

    /// Someone commented on the receiver's content; targets the new comment
    pub fn comment(
        receiver_id: UserId,
        actor_id: UserId,
        comment_id: &CommentId,
        module_id: &ModuleId,
        text: &str,
        preview_chars: usize,
    ) -> Result<Self, DomainError> {
        let content = format!("commented: {}", preview_text(text, preview_chars));
        Self::new(
            receiver_id,
            actor_id,
            NotificationKind::Comment,
            content,
            TargetId::from(comment_id),
            module_id.as_str(),
        )
    }

    pub fn receiver_id(&self) -> &UserId {
        &self.receiver_id
    }

    pub fn actor_id(&self) -> &UserId {
        &self.actor_id
    }

    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn target_id(&self) -> &TargetId {
        &self.target_id
    }

    pub fn target_type(&self) -> &str {
        &self.target_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_self_notification() {
        let result = NewNotification::like(
            UserId::new("u1"),
            UserId::new("u1"),
            &LikeTarget::photo("p1"),
        );
        assert!(matches!(result, Err(DomainError::SelfNotification)));
    }

    #[test]
    fn test_like_notification() {
        let n = NewNotification::like(
            UserId::new("owner"),
            UserId::new("fan"),
            &LikeTarget::photo("p1"),
        )
        .unwrap();
        assert_eq!(n.kind(), NotificationKind::Like);
        assert_eq!(n.content(), "liked your photo");
        assert_eq!(n.target_type(), "photo");
    }

    #[test]
    fn test_reply_notification_preview() {
        let n = NewNotification::reply(
            UserId::new("parent-author"),
            UserId::new("replier"),
            &CommentId::new("c9"),
            "this reply is definitely longer than twenty characters",
            NOTIFICATION_PREVIEW_CHARS,
        )
        .unwrap();
        assert_eq!(n.content(), "replied to your comment: this reply is defini...");
        assert_eq!(n.target_id().as_str(), "c9");
        assert_eq!(n.target_type(), "comment");
    }

    #[test]
    fn test_comment_notification_targets_module() {
        let n = NewNotification::comment(
            UserId::new("owner"),
            UserId::new("guest"),
            &CommentId::new("c1"),
            &ModuleId::new("photo-42"),
            "nice",
            NOTIFICATION_PREVIEW_CHARS,
        )
        .unwrap();
        assert_eq!(n.content(), "commented: nice");
        assert_eq!(n.target_type(), "photo-42");
    }

    #[test]
    fn test_mark_read_once() {
        let draft = NewNotification::like(
            UserId::new("a"),
            UserId::new("b"),
            &LikeTarget::comment("c1"),
        )
        .unwrap();
        let mut n = Notification::from_new(NotificationId::new("n1"), draft);
        assert!(!n.is_read);
        assert!(n.mark_read());
        assert!(!n.mark_read());
        assert!(n.is_read);
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("reply".parse::<NotificationKind>().unwrap(), NotificationKind::Reply);
        assert!("poke".parse::<NotificationKind>().is_err());
    }
}
