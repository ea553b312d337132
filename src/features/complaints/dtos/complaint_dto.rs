use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::complaints::models::{
    Complaint, ComplaintImage, ComplaintPriority, ComplaintStatus,
};
use crate::shared::types::{default_page, default_page_size, PaginationQuery};
use crate::shared::validation::validate_phone;

// =============================================================================
// REQUEST DTOs
// =============================================================================

/// Request DTO for submitting a complaint
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateComplaintDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 5000, message = "Description must be 1-5000 characters"))]
    pub description: String,

    #[validate(length(min = 1, max = 100, message = "Category must be 1-100 characters"))]
    pub category: String,

    /// Free text address, or "lat,lng" captured from the device
    #[validate(length(min = 1, max = 500, message = "Location must be 1-500 characters"))]
    pub location: String,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: Option<f64>,

    #[validate(custom(function = "validate_phone"))]
    pub phone_number: Option<String>,

    /// Defaults to medium
    pub priority: Option<ComplaintPriority>,
}

/// Request DTO for changing complaint status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateStatusDto {
    pub status: ComplaintStatus,
}

/// Request DTO for assigning a complaint to an official
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AssignComplaintDto {
    #[validate(length(min = 1, message = "Official id is required"))]
    pub official_id: String,
}

/// Multipart form for attaching images; every file part is treated as an image
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadImagesDto {
    /// Image files (image/*, up to 10 MB each)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub files: Vec<String>,
}

// =============================================================================
// QUERY PARAMS
// =============================================================================

/// Sort direction
#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Desc,
    Asc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Sort fields for complaints
#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintSortBy {
    #[default]
    CreatedAt,
    UpdatedAt,
    Priority,
    Status,
}

impl ComplaintSortBy {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ComplaintSortBy::CreatedAt => "created_at",
            ComplaintSortBy::UpdatedAt => "updated_at",
            ComplaintSortBy::Priority => "priority",
            ComplaintSortBy::Status => "status",
        }
    }
}

/// Query params for listing complaints
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ComplaintQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Filter by status
    pub status: Option<ComplaintStatus>,
    /// Filter by priority
    pub priority: Option<ComplaintPriority>,
    /// Filter by category (exact, case-insensitive)
    pub category: Option<String>,
    /// Filter by assigned official
    pub assigned_to: Option<String>,
    /// Search in title
    pub search: Option<String>,
    /// Sort by field (default: created_at)
    #[serde(default)]
    pub sort_by: ComplaintSortBy,
    /// Sort direction (default: desc)
    #[serde(default)]
    pub sort: SortDirection,
}

impl ComplaintQueryParams {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(self.page, self.page_size)
    }

    /// ORDER BY clause built only from whitelisted identifiers
    pub fn order_by(&self) -> String {
        format!("{} {}, id {}", self.sort_by.as_sql(), self.sort.as_sql(), self.sort.as_sql())
    }
}

// =============================================================================
// RESPONSE DTOs
// =============================================================================

/// Response DTO for complaint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ComplaintResponseDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub predicted_category: Option<String>,
    pub confidence_score: Option<f64>,
    pub priority: ComplaintPriority,
    pub predicted_priority: Option<ComplaintPriority>,
    pub status: ComplaintStatus,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub citizen_id: String,
    pub phone_number: Option<String>,
    pub assigned_to_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    /// Only populated on single-complaint reads
    pub images: Vec<ComplaintImage>,
}

impl ComplaintResponseDto {
    pub fn with_images(mut self, images: Vec<ComplaintImage>) -> Self {
        self.images = images;
        self
    }
}

impl From<Complaint> for ComplaintResponseDto {
    fn from(c: Complaint) -> Self {
        Self {
            id: c.id,
            title: c.title,
            description: c.description,
            category: c.category,
            predicted_category: c.predicted_category,
            confidence_score: c.confidence_score,
            priority: c.priority,
            predicted_priority: c.predicted_priority,
            status: c.status,
            location: c.location,
            latitude: c.latitude,
            longitude: c.longitude,
            citizen_id: c.citizen_id,
            phone_number: c.phone_number,
            assigned_to_id: c.assigned_to_id,
            created_at: c.created_at,
            updated_at: c.updated_at,
            resolved_at: c.resolved_at,
            images: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::lorem::en::{Paragraph, Sentence};
    use fake::Fake;

    fn valid_dto() -> CreateComplaintDto {
        CreateComplaintDto {
            title: "Streetlight out".to_string(),
            description: "The light at the corner has been off for a week".to_string(),
            category: "electricity".to_string(),
            location: "Main Road, Ward 4".to_string(),
            latitude: Some(12.97),
            longitude: Some(77.59),
            phone_number: Some("+91 98765 43210".to_string()),
            priority: None,
        }
    }

    #[test]
    fn test_valid_complaint_passes() {
        assert!(valid_dto().validate().is_ok());

        let generated = CreateComplaintDto {
            title: Sentence(2..6).fake(),
            description: Paragraph(1..3).fake(),
            ..valid_dto()
        };
        assert!(generated.validate().is_ok());
    }

    #[test]
    fn test_complaint_field_limits() {
        let empty_title = CreateComplaintDto {
            title: String::new(),
            ..valid_dto()
        };
        assert!(empty_title.validate().is_err());

        let long_title = CreateComplaintDto {
            title: "x".repeat(201),
            ..valid_dto()
        };
        assert!(long_title.validate().is_err());

        let bad_latitude = CreateComplaintDto {
            latitude: Some(91.0),
            ..valid_dto()
        };
        assert!(bad_latitude.validate().is_err());

        let bad_phone = CreateComplaintDto {
            phone_number: Some("n/a".to_string()),
            ..valid_dto()
        };
        assert!(bad_phone.validate().is_err());
    }

    #[test]
    fn test_phone_with_one_digit_country_code_is_accepted() {
        let dto = CreateComplaintDto {
            phone_number: Some("+1-202-555-0143".to_string()),
            ..valid_dto()
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_query_defaults_and_order() {
        let params: ComplaintQueryParams = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.order_by(), "created_at DESC, id DESC");

        let params: ComplaintQueryParams = serde_json::from_value(serde_json::json!({
            "sort_by": "priority",
            "sort": "asc",
            "status": "in-progress"
        }))
        .unwrap();
        assert_eq!(params.order_by(), "priority ASC, id ASC");
        assert_eq!(params.status, Some(ComplaintStatus::InProgress));
    }
}
