use std::sync::Arc;

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::notifications::dtos::NotificationResponseDto;
use crate::features::notifications::models::{NewNotification, Notification};
use crate::features::realtime::models::ChangeKind;
use crate::features::realtime::ChangeFeed;
use crate::shared::types::PaginationQuery;

const COLUMNS: &str = "id, user_id, title, message, is_read, link, created_at";

/// Service for notification operations
pub struct NotificationService {
    pool: PgPool,
    feed: Arc<ChangeFeed>,
}

impl NotificationService {
    pub fn new(pool: PgPool, feed: Arc<ChangeFeed>) -> Self {
        Self { pool, feed }
    }

    /// Insert a notification with the caller's executor
    pub async fn create<'e, E>(
        executor: E,
        notification: &NewNotification,
    ) -> std::result::Result<Notification, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO notifications (user_id, title, message, link)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(&notification.user_id)
            .bind(&notification.title)
            .bind(&notification.message)
            .bind(notification.link.as_deref())
            .fetch_one(executor)
            .await
    }

    /// List the user's notifications, newest first
    /// Returns (notifications, total_count)
    pub async fn list(
        &self,
        user_id: &str,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<NotificationResponseDto>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count notifications: {:?}", e);
                AppError::Database(e)
            })?;

        let query = format!(
            "SELECT {COLUMNS} FROM notifications
             WHERE user_id = $1
             ORDER BY created_at DESC
             OFFSET $2 LIMIT $3"
        );
        let rows = sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(pagination.offset())
            .bind(pagination.limit())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list notifications: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// Mark one of the user's notifications as read
    pub async fn mark_read(&self, user_id: &str, id: Uuid) -> Result<NotificationResponseDto> {
        let query = format!(
            "UPDATE notifications SET is_read = TRUE
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        let notification = sqlx::query_as::<_, Notification>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to mark notification as read: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Notification '{}' not found", id)))?;

        let dto: NotificationResponseDto = notification.into();
        self.feed
            .publish_record("notifications", ChangeKind::Update, dto.id.to_string(), &dto);
        Ok(dto)
    }

    /// Mark all of the user's unread notifications as read
    pub async fn mark_all_read(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to mark notifications as read: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::debug!(
            "Marked {} notifications read for user {}",
            result.rows_affected(),
            user_id
        );
        Ok(result.rows_affected())
    }
}
