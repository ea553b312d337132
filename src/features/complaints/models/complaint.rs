use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Complaint status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "complaint_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ComplaintStatus {
    Pending,
    InProgress,
    Resolved,
    Rejected,
}

impl ComplaintStatus {
    /// Human readable label used in system comments and notifications
    pub fn label(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "Pending",
            ComplaintStatus::InProgress => "In Progress",
            ComplaintStatus::Resolved => "Resolved",
            ComplaintStatus::Rejected => "Rejected",
        }
    }
}

impl std::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplaintStatus::Pending => write!(f, "pending"),
            ComplaintStatus::InProgress => write!(f, "in-progress"),
            ComplaintStatus::Resolved => write!(f, "resolved"),
            ComplaintStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Complaint priority enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "complaint_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ComplaintPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl ComplaintPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintPriority::Low => "low",
            ComplaintPriority::Medium => "medium",
            ComplaintPriority::High => "high",
            ComplaintPriority::Critical => "critical",
        }
    }
}

/// Column list for complaint queries
pub const COMPLAINT_COLUMNS: &str = "id, title, description, category, predicted_category, \
    confidence_score, priority, predicted_priority, status, location, latitude, longitude, \
    citizen_id, phone_number, assigned_to_id, created_at, updated_at, resolved_at";

/// Database model for complaint
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Complaint {
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format_and_label() {
        assert_eq!(
            serde_json::to_value(ComplaintStatus::InProgress).unwrap(),
            serde_json::json!("in-progress")
        );
        assert_eq!(ComplaintStatus::InProgress.to_string(), "in-progress");
        assert_eq!(ComplaintStatus::InProgress.label(), "In Progress");
        assert_eq!(ComplaintStatus::Resolved.label(), "Resolved");
    }

    #[test]
    fn test_priority_defaults_to_medium() {
        assert_eq!(ComplaintPriority::default(), ComplaintPriority::Medium);
        assert_eq!(ComplaintPriority::High.as_str(), "high");
    }
}
