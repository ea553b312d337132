use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::audit_logs::dtos::AuditLogResponseDto;

/// Audited operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    CreateComplaint,
    UpdateStatus,
    AssignComplaint,
    UpdateRole,
    DeleteUser,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::CreateComplaint => "create_complaint",
            AuditAction::UpdateStatus => "update_status",
            AuditAction::AssignComplaint => "assign_complaint",
            AuditAction::UpdateRole => "update_role",
            AuditAction::DeleteUser => "delete_user",
        }
    }
}

/// Database model for audit log entries
#[derive(Debug, Clone, FromRow)]
pub struct AuditLog {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub action: String,
    pub table_name: String,
    pub record_id: String,
    pub old_data: Option<serde_json::Value>,
    pub new_data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Entry to append
#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub user_id: Option<String>,
    pub action: AuditAction,
    pub table_name: &'static str,
    pub record_id: String,
    pub old_data: Option<serde_json::Value>,
    pub new_data: Option<serde_json::Value>,
}

impl NewAuditLog {
    pub fn new(
        user_id: &str,
        action: AuditAction,
        table_name: &'static str,
        record_id: impl ToString,
    ) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            action,
            table_name,
            record_id: record_id.to_string(),
            old_data: None,
            new_data: None,
        }
    }

    /// Attach before/after snapshots; serialization failures leave the snapshot empty
    pub fn snapshots<O: Serialize, N: Serialize>(
        mut self,
        old: Option<&O>,
        new: Option<&N>,
    ) -> Self {
        self.old_data = old.and_then(|o| serde_json::to_value(o).ok());
        self.new_data = new.and_then(|n| serde_json::to_value(n).ok());
        self
    }
}

impl From<AuditLog> for AuditLogResponseDto {
    fn from(a: AuditLog) -> Self {
        Self {
            id: a.id,
            user_id: a.user_id,
            action: a.action,
            table_name: a.table_name,
            record_id: a.record_id,
            old_data: a.old_data,
            new_data: a.new_data,
            created_at: a.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshots_capture_old_and_new() {
        let entry = NewAuditLog::new("admin-1", AuditAction::UpdateRole, "profiles", "user-2")
            .snapshots(Some(&json!({ "role": "citizen" })), Some(&json!({ "role": "official" })));

        assert_eq!(entry.user_id.as_deref(), Some("admin-1"));
        assert_eq!(entry.action.as_str(), "update_role");
        assert_eq!(entry.old_data, Some(json!({ "role": "citizen" })));
        assert_eq!(entry.new_data, Some(json!({ "role": "official" })));
    }

    #[test]
    fn test_snapshots_allow_missing_side() {
        let entry = NewAuditLog::new("citizen-1", AuditAction::CreateComplaint, "complaints", 42)
            .snapshots::<serde_json::Value, _>(None, Some(&json!({ "id": 42 })));
        assert!(entry.old_data.is_none());
        assert_eq!(entry.record_id, "42");
    }
}
