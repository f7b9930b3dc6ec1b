//! Notification database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row of `notifications` with the actor's profile left-joined from `members`
#[derive(Debug, Clone, FromRow)]
pub struct NotificationModel {
    pub id: String,
    pub receiver_id: String,
    pub actor_id: String,
    pub kind: String,
    pub content: String,
    pub target_id: String,
    pub target_type: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub actor_name: Option<String>,
    pub actor_avatar: Option<String>,
}
