use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Column list for complaint image queries
pub const COMPLAINT_IMAGE_COLUMNS: &str =
    "id, complaint_id, image_url, ai_detected_issue, created_at";

/// Database model for complaint image
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ComplaintImage {
    pub id: Uuid,
    pub complaint_id: Uuid,
    pub image_url: String,
    pub ai_detected_issue: Option<String>,
    pub created_at: DateTime<Utc>,
}
