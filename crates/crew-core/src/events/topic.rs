//! Subscription topics

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::{ModuleId, UserId};

use super::ChangeEvent;

/// What a change feed subscriber listens to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "topic", content = "key", rename_all = "snake_case")]
pub enum Topic {
    /// Comment inserts of one module, plus every comment delete
    ModuleComments(ModuleId),
    /// Every like insert and delete
    Likes,
    /// Notification inserts addressed to one member
    Notifications(UserId),
}

impl Topic {
    /// Server-side filter applied before delivery
    ///
    /// Comment deletes pass regardless of module: a partial payload cannot
    /// be attributed, so the consumer decides.
    pub fn accepts(&self, event: &ChangeEvent) -> bool {
        match (self, event) {
            (Self::ModuleComments(module), ChangeEvent::CommentInserted(c)) => c.module_id == *module,
            (Self::ModuleComments(_), ChangeEvent::CommentDeleted(_)) => true,
            (Self::Likes, ChangeEvent::LikeInserted(_) | ChangeEvent::LikeDeleted(_)) => true,
            (Self::Notifications(receiver), ChangeEvent::NotificationInserted(n)) => {
                n.receiver_id == *receiver
            }
            _ => false,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModuleComments(module) => write!(f, "comments:{module}"),
            Self::Likes => f.write_str("likes"),
            Self::Notifications(receiver) => write!(f, "notifications:{receiver}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Comment, NewNotification, Notification};
    use crate::events::RowPayload;
    use crate::value_objects::{CommentId, NotificationId};

    fn comment_in(module: &str) -> Comment {
        Comment::new(
            CommentId::generate(),
            ModuleId::new(module),
            UserId::new("u1"),
            "hi".to_string(),
        )
    }

    #[test]
    fn test_inserts_filtered_by_module() {
        let topic = Topic::ModuleComments(ModuleId::new("a"));
        assert!(topic.accepts(&ChangeEvent::CommentInserted(comment_in("a"))));
        assert!(!topic.accepts(&ChangeEvent::CommentInserted(comment_in("b"))));
    }

    #[test]
    fn test_deletes_unfiltered() {
        let topic = Topic::ModuleComments(ModuleId::new("a"));
        assert!(topic.accepts(&ChangeEvent::CommentDeleted(RowPayload::partial("x"))));
        assert!(topic.accepts(&ChangeEvent::CommentDeleted(RowPayload::full(comment_in("b")))));
    }

    #[test]
    fn test_notifications_filtered_by_receiver() {
        let draft = NewNotification::new(
            UserId::new("r"),
            UserId::new("a"),
            crate::entities::NotificationKind::Like,
            "liked your photo",
            crate::value_objects::TargetId::new("p1"),
            "photo",
        )
        .unwrap();
        let event = ChangeEvent::NotificationInserted(Notification::from_new(
            NotificationId::new("n1"),
            draft,
        ));
        assert!(Topic::Notifications(UserId::new("r")).accepts(&event));
        assert!(!Topic::Notifications(UserId::new("a")).accepts(&event));
        assert!(!Topic::Likes.accepts(&event));
    }

    #[test]
    fn test_display() {
        assert_eq!(Topic::ModuleComments(ModuleId::new("m")).to_string(), "comments:m");
        assert_eq!(Topic::Likes.to_string(), "likes");
    }
}
