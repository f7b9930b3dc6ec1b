//! PostgreSQL implementation of LikeRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use crew_core::entities::{Like, LikeTarget, NewLike};
use crew_core::error::DomainError;
use crew_core::traits::{LikeRepository, RepoResult};
use crew_core::value_objects::UserId;

use crate::models::LikeModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of LikeRepository
#[derive(Clone)]
pub struct PgLikeRepository {
    pool: PgPool,
}

impl PgLikeRepository {
    /// Create a new PgLikeRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeRepository for PgLikeRepository {
    #[instrument(skip(self))]
    async fn find(&self, user_id: &UserId, target: &LikeTarget) -> RepoResult<Option<Like>> {
        let result = sqlx::query_as::<_, LikeModel>(
            r#"
            SELECT id, user_id, target_id, target_type, created_at
            FROM likes
            WHERE user_id = $1 AND target_id = $2 AND target_type = $3
            "#,
        )
        .bind(user_id.as_str())
        .bind(target.target_id.as_str())
        .bind(target.target_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Like::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn count(&self, target: &LikeTarget) -> RepoResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM likes WHERE target_id = $1 AND target_type = $2
            "#,
        )
        .bind(target.target_id.as_str())
        .bind(target.target_type.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(count)
    }

    #[instrument(skip(self, like), fields(target = %like.target))]
    async fn create(&self, like: &NewLike) -> RepoResult<Like> {
        let model = sqlx::query_as::<_, LikeModel>(
            r#"
            INSERT INTO likes (user_id, target_id, target_type)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, target_id, target_type, created_at
            "#,
        )
        .bind(like.user_id.as_str())
        .bind(like.target.target_id.as_str())
        .bind(like.target.target_type.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::LikeAlreadyExists))?;

        Like::try_from(model)
    }

    #[instrument(skip(self))]
    async fn delete(&self, user_id: &UserId, target: &LikeTarget) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM likes WHERE user_id = $1 AND target_id = $2 AND target_type = $3
            "#,
        )
        .bind(user_id.as_str())
        .bind(target.target_id.as_str())
        .bind(target.target_type.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgLikeRepository>();
    }
}
