//! Like database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for likes table
#[derive(Debug, Clone, FromRow)]
pub struct LikeModel {
    pub id: String,
    pub user_id: String,
    pub target_id: String,
    pub target_type: String,
    pub created_at: DateTime<Utc>,
}
