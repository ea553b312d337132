use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::feedback::dtos::FeedbackResponseDto;

/// Database model for feedback
#[derive(Debug, Clone, FromRow)]
pub struct Feedback {
    pub id: Uuid,
    pub complaint_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub sentiment_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl From<Feedback> for FeedbackResponseDto {
    fn from(f: Feedback) -> Self {
        Self {
            id: f.id,
            complaint_id: f.complaint_id,
            rating: f.rating,
            comment: f.comment,
            sentiment_score: f.sentiment_score,
            created_at: f.created_at,
        }
    }
}
