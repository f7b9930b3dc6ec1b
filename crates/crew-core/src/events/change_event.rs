//! Change events - row-level changes pushed from the database
//!
//! INSERT events always carry the full row. DELETE events carry the full
//! row only when the source table replicates old rows in full; otherwise
//! only the primary key survives and consumers must cope with that.

use serde::{Deserialize, Serialize};

use crate::entities::{Comment, Like, Notification};
use crate::value_objects::{ModuleId, UserId};

/// Deleted row as delivered by the change stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowPayload<T> {
    /// Every column of the old row
    Full { row: T },
    /// Primary key only
    Partial { id: String },
}

impl<T> RowPayload<T> {
    pub fn full(row: T) -> Self {
        Self::Full { row }
    }

    pub fn partial(id: impl Into<String>) -> Self {
        Self::Partial { id: id.into() }
    }

    /// The old row, if it was delivered
    pub fn row(&self) -> Option<&T> {
        match self {
            Self::Full { row } => Some(row),
            Self::Partial { .. } => None,
        }
    }

    #[inline]
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::Partial { .. })
    }
}

impl RowPayload<Comment> {
    /// Id of the deleted comment, whichever arm arrived
    pub fn id(&self) -> &str {
        match self {
            Self::Full { row } => row.id.as_str(),
            Self::Partial { id } => id,
        }
    }

    /// Module of the deleted comment, when the payload carries it
    pub fn module_id(&self) -> Option<&ModuleId> {
        self.row().map(|c| &c.module_id)
    }
}

impl RowPayload<Like> {
    /// Id of the deleted like, whichever arm arrived
    pub fn id(&self) -> &str {
        match self {
            Self::Full { row } => row.id.as_str(),
            Self::Partial { id } => id,
        }
    }
}

/// Source table of a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Comments,
    Likes,
    Notifications,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comments => "comments",
            Self::Likes => "likes",
            Self::Notifications => "notifications",
        }
    }
}

/// All change events the sync layer consumes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeEvent {
    // =========================================================================
    // Comment Events
    // =========================================================================
    CommentInserted(Comment),
    CommentDeleted(RowPayload<Comment>),

    // =========================================================================
    // Like Events
    // =========================================================================
    LikeInserted(Like),
    LikeDeleted(RowPayload<Like>),

    // =========================================================================
    // Notification Events
    // =========================================================================
    NotificationInserted(Notification),
}

impl ChangeEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::CommentInserted(_) => "COMMENT_INSERTED",
            Self::CommentDeleted(_) => "COMMENT_DELETED",
            Self::LikeInserted(_) => "LIKE_INSERTED",
            Self::LikeDeleted(_) => "LIKE_DELETED",
            Self::NotificationInserted(_) => "NOTIFICATION_INSERTED",
        }
    }

    pub fn table(&self) -> Table {
        match self {
            Self::CommentInserted(_) | Self::CommentDeleted(_) => Table::Comments,
            Self::LikeInserted(_) | Self::LikeDeleted(_) => Table::Likes,
            Self::NotificationInserted(_) => Table::Notifications,
        }
    }

    /// Module discriminator, when the event carries one
    pub fn module_id(&self) -> Option<&ModuleId> {
        match self {
            Self::CommentInserted(c) => Some(&c.module_id),
            Self::CommentDeleted(payload) => payload.module_id(),
            _ => None,
        }
    }

    /// Member whose action produced the event, when the payload carries it
    pub fn actor_id(&self) -> Option<&UserId> {
        match self {
            Self::CommentInserted(c) => Some(&c.author_id),
            Self::CommentDeleted(payload) => payload.row().map(|c| &c.author_id),
            Self::LikeInserted(l) => Some(&l.user_id),
            Self::LikeDeleted(payload) => payload.row().map(|l| &l.user_id),
            Self::NotificationInserted(n) => Some(&n.actor_id),
        }
    }
}
