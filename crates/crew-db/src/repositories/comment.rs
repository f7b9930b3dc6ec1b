//! PostgreSQL implementation of CommentRepository

use async_trait::async_trait;
use sqlx::error::ErrorKind;
use sqlx::PgPool;
use tracing::instrument;

use crew_core::entities::{Comment, NewComment};
use crew_core::error::DomainError;
use crew_core::traits::{CommentRepository, RepoResult};
use crew_core::value_objects::{CommentId, ModuleId, UserId};

use crate::models::CommentModel;

use super::error::{comment_not_found, map_db_error, map_violation};

/// Columns selected for every comment read, author joined
const COMMENT_COLUMNS: &str = r#"
    c.id, c.content, c.author_id, c.module_id, c.parent_id, c.created_at,
    m.name AS author_name, m.avatar AS author_avatar
"#;

/// PostgreSQL implementation of CommentRepository
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    /// Create a new PgCommentRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Replies attach only to top-level comments of the same module
    async fn check_parent(&self, parent_id: &CommentId, module_id: &ModuleId) -> RepoResult<()> {
        let parent = self
            .find_by_id(parent_id)
            .await?
            .ok_or_else(|| comment_not_found(parent_id))?;

        if parent.is_reply() {
            return Err(DomainError::ValidationError(
                "Replies cannot be nested".to_string(),
            ));
        }
        if parent.module_id != *module_id {
            return Err(DomainError::ValidationError(
                "Reply must be in the same module as its parent".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &CommentId) -> RepoResult<Option<Comment>> {
        let result = sqlx::query_as::<_, CommentModel>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c
            LEFT JOIN members m ON m.id = c.author_id
            WHERE c.id = $1
            "#
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Comment::from))
    }

    #[instrument(skip(self))]
    async fn find_top_level(&self, module_id: &ModuleId) -> RepoResult<Vec<Comment>> {
        let results = sqlx::query_as::<_, CommentModel>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c
            LEFT JOIN members m ON m.id = c.author_id
            WHERE c.module_id = $1 AND c.parent_id IS NULL
            ORDER BY c.created_at DESC, c.id DESC
            "#
        ))
        .bind(module_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Comment::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_replies(&self, parent_id: &CommentId) -> RepoResult<Vec<Comment>> {
        let results = sqlx::query_as::<_, CommentModel>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c
            LEFT JOIN members m ON m.id = c.author_id
            WHERE c.parent_id = $1
            ORDER BY c.created_at ASC, c.id ASC
            "#
        ))
        .bind(parent_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Comment::from).collect())
    }

    #[instrument(skip(self))]
    async fn count_by_module(&self, module_id: &ModuleId) -> RepoResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM comments WHERE module_id = $1
            "#,
        )
        .bind(module_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(count)
    }

    #[instrument(skip(self, comment), fields(module_id = %comment.module_id))]
    async fn create(&self, comment: &NewComment) -> RepoResult<Comment> {
        if let Some(parent_id) = &comment.parent_id {
            self.check_parent(parent_id, &comment.module_id).await?;
        }

        let model = sqlx::query_as::<_, CommentModel>(&format!(
            r#"
            WITH c AS (
                INSERT INTO comments (content, author_id, module_id, parent_id)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT {COMMENT_COLUMNS}
            FROM c
            LEFT JOIN members m ON m.id = c.author_id
            "#
        ))
        .bind(&comment.content)
        .bind(comment.author_id.as_str())
        .bind(comment.module_id.as_str())
        .bind(comment.parent_id.as_ref().map(CommentId::as_str))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_violation(e, ErrorKind::CheckViolation, || {
                DomainError::ValidationError("Comment content violates length limits".to_string())
            })
        })?;

        Ok(Comment::from(model))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &CommentId, author_id: &UserId) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM comments WHERE id = $1 AND author_id = $2
            "#,
        )
        .bind(id.as_str())
        .bind(author_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM comments WHERE id = $1)
            "#,
        )
        .bind(id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        if exists {
            Err(DomainError::NotCommentAuthor)
        } else {
            Err(comment_not_found(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgCommentRepository>();
    }
}
