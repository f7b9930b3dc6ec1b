//! PostgreSQL implementation of NotificationRepository

use async_trait::async_trait;
use sqlx::error::ErrorKind;
use sqlx::PgPool;
use tracing::instrument;

use crew_core::entities::{NewNotification, Notification};
use crew_core::error::DomainError;
use crew_core::traits::{NotificationRepository, RepoResult};
use crew_core::value_objects::{NotificationId, UserId};

use crate::models::NotificationModel;

use super::error::{map_db_error, map_violation, notification_not_found};

const NOTIFICATION_COLUMNS: &str = r#"
    n.id, n.receiver_id, n.actor_id, n.kind, n.content, n.target_id, n.target_type,
    n.is_read, n.created_at, m.name AS actor_name, m.avatar AS actor_avatar
"#;

/// PostgreSQL implementation of NotificationRepository
#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    /// Create a new PgNotificationRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &NotificationId) -> RepoResult<Option<Notification>> {
        let result = sqlx::query_as::<_, NotificationModel>(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications n
            LEFT JOIN members m ON m.id = n.actor_id
            WHERE n.id = $1
            "#
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Notification::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_receiver(
        &self,
        receiver_id: &UserId,
        limit: i64,
    ) -> RepoResult<Vec<Notification>> {
        let limit = limit.clamp(1, 200);

        let results = sqlx::query_as::<_, NotificationModel>(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications n
            LEFT JOIN members m ON m.id = n.actor_id
            WHERE n.receiver_id = $1
            ORDER BY n.created_at DESC, n.id DESC
            LIMIT $2
            "#
        ))
        .bind(receiver_id.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(Notification::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn unread_count(&self, receiver_id: &UserId) -> RepoResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM notifications WHERE receiver_id = $1 AND NOT is_read
            "#,
        )
        .bind(receiver_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(count)
    }

    #[instrument(skip(self, notification), fields(receiver_id = %notification.receiver_id()))]
    async fn create(&self, notification: &NewNotification) -> RepoResult<Notification> {
        let model = sqlx::query_as::<_, NotificationModel>(&format!(
            r#"
            WITH n AS (
                INSERT INTO notifications (receiver_id, actor_id, kind, content, target_id, target_type)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            )
            SELECT {NOTIFICATION_COLUMNS}
            FROM n
            LEFT JOIN members m ON m.id = n.actor_id
            "#
        ))
        .bind(notification.receiver_id().as_str())
        .bind(notification.actor_id().as_str())
        .bind(notification.kind().as_str())
        .bind(notification.content())
        .bind(notification.target_id().as_str())
        .bind(notification.target_type())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_violation(e, ErrorKind::CheckViolation, || DomainError::SelfNotification))?;

        Notification::try_from(model)
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, id: &NotificationId) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE notifications SET is_read = TRUE WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(notification_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn mark_all_read(&self, receiver_id: &UserId) -> RepoResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE notifications SET is_read = TRUE WHERE receiver_id = $1 AND NOT is_read
            "#,
        )
        .bind(receiver_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
