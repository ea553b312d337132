use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Request DTO for leaving feedback
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateFeedbackDto {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,

    #[validate(length(max = 1000, message = "Comment must not exceed 1000 characters"))]
    pub comment: Option<String>,
}

/// Response DTO for feedback
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeedbackResponseDto {
    pub id: Uuid,
    pub complaint_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub sentiment_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        for rating in 1..=5 {
            let dto = CreateFeedbackDto {
                rating,
                comment: None,
            };
            assert!(dto.validate().is_ok(), "rating {} should be valid", rating);
        }

        for rating in [0, 6, -1] {
            let dto = CreateFeedbackDto {
                rating,
                comment: None,
            };
            assert!(dto.validate().is_err(), "rating {} should be invalid", rating);
        }
    }

    #[test]
    fn test_comment_length_limit() {
        let dto = CreateFeedbackDto {
            rating: 4,
            comment: Some("x".repeat(1001)),
        };
        assert!(dto.validate().is_err());
    }
}
