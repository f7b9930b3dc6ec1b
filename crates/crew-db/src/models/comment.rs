//! Comment database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row of `comments` with the author's profile left-joined from `members`
#[derive(Debug, Clone, FromRow)]
pub struct CommentModel {
    pub id: String,
    pub content: String,
    pub author_id: String,
    pub module_id: String,
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub author_name: Option<String>,
    pub author_avatar: Option<String>,
}
