//! Member database model

use sqlx::FromRow;

/// Public columns of the members table
#[derive(Debug, Clone, FromRow)]
pub struct MemberModel {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
}
