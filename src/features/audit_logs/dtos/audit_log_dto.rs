use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::shared::types::{default_page, default_page_size, PaginationQuery};

/// Response DTO for an audit log entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditLogResponseDto {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub action: String,
    pub table_name: String,
    pub record_id: String,
    #[schema(value_type = Option<Object>)]
    pub old_data: Option<serde_json::Value>,
    #[schema(value_type = Option<Object>)]
    pub new_data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Query params for listing audit logs
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct AuditLogQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Only entries for this table (e.g. `complaints`, `profiles`)
    pub table_name: Option<String>,
}

impl AuditLogQueryParams {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(self.page, self.page_size)
    }
}
