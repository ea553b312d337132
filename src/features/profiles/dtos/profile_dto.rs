use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::profiles::models::{SupportedLanguage, UserRole};
use crate::shared::types::{default_page, default_page_size, PaginationQuery};
use crate::shared::validation::validate_phone;

/// Response DTO for profile
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponseDto {
    pub id: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub preferred_language: SupportedLanguage,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for updating the caller's own profile. Omitted fields are unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileDto {
    #[validate(length(min = 1, max = 200, message = "Full name must be 1-200 characters"))]
    pub full_name: Option<String>,

    #[validate(url(message = "Avatar URL must be a valid URL"))]
    pub avatar_url: Option<String>,

    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,

    pub preferred_language: Option<SupportedLanguage>,
}

/// Request DTO for changing a user's role
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateRoleDto {
    pub role: UserRole,
}

/// Query params for listing users
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ProfileQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Filter by role
    pub role: Option<UserRole>,
    /// Search in full name
    pub search: Option<String>,
}

impl ProfileQueryParams {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(self.page, self.page_size)
    }
}
