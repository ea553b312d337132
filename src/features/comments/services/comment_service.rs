use std::sync::Arc;

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::comments::dtos::{CommentResponseDto, CreateCommentDto};
use crate::features::comments::models::{Comment, CommentAuthorType};
use crate::features::complaints::services::access;
use crate::features::realtime::models::ChangeKind;
use crate::features::realtime::ChangeFeed;

const COLUMNS: &str = "id, complaint_id, user_id, user_type, content, created_at";

/// Service for complaint comments
pub struct CommentService {
    pool: PgPool,
    feed: Arc<ChangeFeed>,
}

impl CommentService {
    pub fn new(pool: PgPool, feed: Arc<ChangeFeed>) -> Self {
        Self { pool, feed }
    }

    /// Insert a system comment (no author) with the caller's executor
    pub async fn add_system_comment<'e, E>(
        executor: E,
        complaint_id: Uuid,
        content: &str,
    ) -> std::result::Result<Comment, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO comments (complaint_id, user_id, user_type, content)
             VALUES ($1, NULL, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(complaint_id)
            .bind(CommentAuthorType::System)
            .bind(content)
            .fetch_one(executor)
            .await
    }

    /// Comments on a complaint, oldest first
    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        complaint_id: Uuid,
    ) -> Result<Vec<CommentResponseDto>> {
        let complaint = access::load(&self.pool, complaint_id).await?;
        access::ensure_can_view(user, &complaint, complaint_id)?;

        let query = format!(
            "SELECT {COLUMNS} FROM comments WHERE complaint_id = $1 ORDER BY created_at ASC"
        );
        let rows = sqlx::query_as::<_, Comment>(&query)
            .bind(complaint_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list comments: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Add a comment authored by the caller
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        complaint_id: Uuid,
        dto: CreateCommentDto,
    ) -> Result<CommentResponseDto> {
        let complaint = access::load(&self.pool, complaint_id).await?;
        access::ensure_can_view(user, &complaint, complaint_id)?;

        let content = dto.content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("Comment must not be blank".to_string()));
        }

        let query = format!(
            "INSERT INTO comments (complaint_id, user_id, user_type, content)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let comment = sqlx::query_as::<_, Comment>(&query)
            .bind(complaint_id)
            .bind(&user.sub)
            .bind(CommentAuthorType::from(user.role))
            .bind(content)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create comment: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!(
            "Comment added: complaint={}, author={}",
            complaint_id,
            user.sub
        );

        let dto: CommentResponseDto = comment.into();
        self.feed
            .publish_record("comments", ChangeKind::Insert, dto.id.to_string(), &dto);
        Ok(dto)
    }
}
