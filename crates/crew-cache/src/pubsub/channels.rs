//! Pub/Sub channel definitions.
//!
//! Every change event is published to exactly one channel; a topic may
//! need several channels to see everything it accepts.

use crew_core::{ChangeEvent, ModuleId, Topic, UserId};

/// Channel prefix for comment inserts of one module
pub const COMMENTS_PREFIX: &str = "comments:";
/// Channel for every comment delete (payloads may lack the module)
pub const COMMENT_DELETES_CHANNEL: &str = "comment_deletes";
/// Channel for every like insert and delete
pub const LIKES_CHANNEL: &str = "likes";
/// Channel prefix for notification inserts of one receiver
pub const NOTIFICATIONS_PREFIX: &str = "notifications:";

/// Pub/Sub channel types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PubSubChannel {
    ModuleComments(ModuleId),
    CommentDeletes,
    Likes,
    Notifications(UserId),
    /// Unrecognized channel name
    Custom(String),
}

impl PubSubChannel {
    /// Get the Redis channel name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::ModuleComments(module) => format!("{COMMENTS_PREFIX}{module}"),
            Self::CommentDeletes => COMMENT_DELETES_CHANNEL.to_string(),
            Self::Likes => LIKES_CHANNEL.to_string(),
            Self::Notifications(receiver) => format!("{NOTIFICATIONS_PREFIX}{receiver}"),
            Self::Custom(name) => name.clone(),
        }
    }

    /// Parse a channel name back to a `PubSubChannel`
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            COMMENT_DELETES_CHANNEL => return Self::CommentDeletes,
            LIKES_CHANNEL => return Self::Likes,
            _ => {}
        }

        if let Some(module) = name.strip_prefix(COMMENTS_PREFIX) {
            if !module.is_empty() {
                return Self::ModuleComments(ModuleId::new(module));
            }
        }

        if let Some(receiver) = name.strip_prefix(NOTIFICATIONS_PREFIX) {
            if !receiver.is_empty() {
                return Self::Notifications(UserId::new(receiver));
            }
        }

        Self::Custom(name.to_string())
    }

    /// Channel an event is published on
    #[must_use]
    pub fn for_event(event: &ChangeEvent) -> Self {
        match event {
            ChangeEvent::CommentInserted(comment) => Self::ModuleComments(comment.module_id.clone()),
            ChangeEvent::CommentDeleted(_) => Self::CommentDeletes,
            ChangeEvent::LikeInserted(_) | ChangeEvent::LikeDeleted(_) => Self::Likes,
            ChangeEvent::NotificationInserted(n) => Self::Notifications(n.receiver_id.clone()),
        }
    }

    /// Channels carrying everything a topic accepts
    #[must_use]
    pub fn for_topic(topic: &Topic) -> Vec<Self> {
        match topic {
            Topic::ModuleComments(module) => {
                vec![Self::ModuleComments(module.clone()), Self::CommentDeletes]
            }
            Topic::Likes => vec![Self::Likes],
            Topic::Notifications(receiver) => vec![Self::Notifications(receiver.clone())],
        }
    }
}

impl std::fmt::Display for PubSubChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crew_core::{Comment, CommentId, RowPayload};

    #[test]
    fn test_channel_names() {
        assert_eq!(
            PubSubChannel::ModuleComments(ModuleId::new("gallery")).name(),
            "comments:gallery"
        );
        assert_eq!(PubSubChannel::CommentDeletes.name(), "comment_deletes");
        assert_eq!(PubSubChannel::Likes.name(), "likes");
        assert_eq!(
            PubSubChannel::Notifications(UserId::new("u1")).name(),
            "notifications:u1"
        );
    }

    #[test]
    fn test_channel_parse() {
        assert_eq!(
            PubSubChannel::parse("comments:gallery"),
            PubSubChannel::ModuleComments(ModuleId::new("gallery"))
        );
        assert_eq!(PubSubChannel::parse("comment_deletes"), PubSubChannel::CommentDeletes);
        assert_eq!(
            PubSubChannel::parse("notifications:u1"),
            PubSubChannel::Notifications(UserId::new("u1"))
        );
        assert_eq!(
            PubSubChannel::parse("comments:"),
            PubSubChannel::Custom("comments:".to_string())
        );
    }

    #[test]
    fn test_routing_covers_topic() {
        let module = ModuleId::new("gallery");
        let comment = Comment::new(CommentId::new("c1"), module.clone(), UserId::new("u1"), "x".into());
        let topic = Topic::ModuleComments(module);
        let channels = PubSubChannel::for_topic(&topic);

        for event in [
            ChangeEvent::CommentInserted(comment),
            ChangeEvent::CommentDeleted(RowPayload::partial("c1")),
        ] {
            assert!(topic.accepts(&event));
            assert!(channels.contains(&PubSubChannel::for_event(&event)));
        }
    }
}
