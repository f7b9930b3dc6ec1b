//! PostgreSQL implementation of MemberRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use crew_core::entities::MemberProfile;
use crew_core::traits::{MemberRepository, RepoResult};
use crew_core::value_objects::UserId;

use crate::models::MemberModel;

use super::error::map_db_error;

/// PostgreSQL implementation of MemberRepository
#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    /// Create a new PgMemberRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or refresh a member's public profile
    ///
    /// Membership itself is granted by the invite-code flow; this only keeps
    /// the displayed name and avatar in sync with it.
    #[instrument(skip(self, profile), fields(member_id = %profile.id))]
    pub async fn upsert(&self, profile: &MemberProfile) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO members (id, name, avatar)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, avatar = EXCLUDED.avatar
            "#,
        )
        .bind(profile.id.as_str())
        .bind(&profile.name)
        .bind(profile.avatar.as_deref())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    #[instrument(skip(self))]
    async fn find_profile(&self, id: &UserId) -> RepoResult<Option<MemberProfile>> {
        let result = sqlx::query_as::<_, MemberModel>(
            r#"
            SELECT id, name, avatar FROM members WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(MemberProfile::from))
    }
}
