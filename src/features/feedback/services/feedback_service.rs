use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::complaints::models::ComplaintStatus;
use crate::features::complaints::services::access;
use crate::features::feedback::dtos::{CreateFeedbackDto, FeedbackResponseDto};
use crate::features::feedback::models::Feedback;
use crate::features::realtime::models::ChangeKind;
use crate::features::realtime::ChangeFeed;

const COLUMNS: &str = "id, complaint_id, rating, comment, sentiment_score, created_at";

/// Service for complaint feedback
pub struct FeedbackService {
    pool: PgPool,
    feed: Arc<ChangeFeed>,
}

impl FeedbackService {
    pub fn new(pool: PgPool, feed: Arc<ChangeFeed>) -> Self {
        Self { pool, feed }
    }

    /// Record the owner's rating of a resolved complaint; one per complaint
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        complaint_id: Uuid,
        dto: CreateFeedbackDto,
    ) -> Result<FeedbackResponseDto> {
        let complaint = access::load(&self.pool, complaint_id).await?;

        if !user.owns(&complaint.citizen_id) {
            return Err(AppError::Forbidden(
                "Only the citizen who filed the complaint can leave feedback".to_string(),
            ));
        }

        if complaint.status != ComplaintStatus::Resolved {
            return Err(AppError::BadRequest(
                "Feedback can only be given on resolved complaints".to_string(),
            ));
        }

        let comment = dto
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());

        let query = format!(
            "INSERT INTO feedback (complaint_id, rating, comment)
             VALUES ($1, $2, $3)
             ON CONFLICT (complaint_id) DO NOTHING
             RETURNING {COLUMNS}"
        );
        let feedback = sqlx::query_as::<_, Feedback>(&query)
            .bind(complaint_id)
            .bind(dto.rating)
            .bind(comment)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create feedback: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| {
                AppError::Conflict("Feedback already submitted for this complaint".to_string())
            })?;

        tracing::info!(
            "Feedback recorded: complaint={}, rating={}",
            complaint_id,
            feedback.rating
        );

        let dto: FeedbackResponseDto = feedback.into();
        self.feed
            .publish_record("feedback", ChangeKind::Insert, dto.id.to_string(), &dto);
        Ok(dto)
    }

    /// Feedback on a complaint (staff view)
    pub async fn list(&self, complaint_id: Uuid) -> Result<Vec<FeedbackResponseDto>> {
        access::load(&self.pool, complaint_id).await?;

        let query = format!(
            "SELECT {COLUMNS} FROM feedback WHERE complaint_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, Feedback>(&query)
            .bind(complaint_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list feedback: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
