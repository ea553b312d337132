use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kind of mutation carried by a change event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Insert => "INSERT",
            ChangeKind::Update => "UPDATE",
            ChangeKind::Delete => "DELETE",
        }
    }
}

/// A committed change to one row
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChangeEvent {
    pub table: String,
    pub event: ChangeKind,
    pub record_id: String,
    /// Row snapshot after the change (before it, for deletes)
    #[schema(value_type = Object)]
    pub record: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(
        table: impl Into<String>,
        event: ChangeKind,
        record_id: impl Into<String>,
        record: serde_json::Value,
    ) -> Self {
        Self {
            table: table.into(),
            event,
            record_id: record_id.into(),
            record,
            occurred_at: Utc::now(),
        }
    }

    /// Complaint the changed row belongs to, if any
    fn complaint_id(&self) -> Option<&str> {
        self.record.get("complaint_id").and_then(|v| v.as_str())
    }

    /// User the changed row is addressed to, if any
    fn user_id(&self) -> Option<&str> {
        self.record.get("user_id").and_then(|v| v.as_str())
    }
}

/// Selects which events a subscriber receives. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChangeFilter {
    pub table: Option<String>,
    pub event: Option<ChangeKind>,
    /// Matches the changed row's id or the complaint it belongs to
    pub record_id: Option<String>,
    /// Matches rows addressed to this user
    pub user_id: Option<String>,
}

impl ChangeFilter {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            ..Self::default()
        }
    }

    pub fn with_event(mut self, event: ChangeKind) -> Self {
        self.event = Some(event);
        self
    }

    pub fn with_record(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = Some(record_id.into());
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn matches(&self, event: &ChangeEvent) -> bool {
        if let Some(table) = &self.table {
            if table != &event.table {
                return false;
            }
        }

        if let Some(kind) = self.event {
            if kind != event.event {
                return false;
            }
        }

        if let Some(user_id) = &self.user_id {
            if event.user_id() != Some(user_id.as_str()) {
                return false;
            }
        }

        match &self.record_id {
            Some(id) => id == &event.record_id || event.complaint_id() == Some(id.as_str()),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn comment_insert(complaint_id: &str) -> ChangeEvent {
        ChangeEvent::new(
            "comments",
            ChangeKind::Insert,
            "c-1",
            json!({ "id": "c-1", "complaint_id": complaint_id }),
        )
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(ChangeFilter::default().matches(&comment_insert("x")));
    }

    #[test]
    fn test_filter_on_table_and_event() {
        let event = comment_insert("x");
        assert!(ChangeFilter::table("comments").matches(&event));
        assert!(!ChangeFilter::table("complaints").matches(&event));
        assert!(!ChangeFilter::table("comments")
            .with_event(ChangeKind::Update)
            .matches(&event));
    }

    #[test]
    fn test_record_filter_matches_parent_complaint() {
        let event = comment_insert("complaint-9");
        assert!(ChangeFilter::table("comments")
            .with_record("complaint-9")
            .matches(&event));
        assert!(ChangeFilter::default().with_record("c-1").matches(&event));
        assert!(!ChangeFilter::default()
            .with_record("complaint-1")
            .matches(&event));
    }

    #[test]
    fn test_user_filter_matches_addressee_only() {
        let event = ChangeEvent::new(
            "notifications",
            ChangeKind::Insert,
            "n-1",
            json!({ "id": "n-1", "user_id": "citizen-1" }),
        );
        assert!(ChangeFilter::table("notifications")
            .with_user("citizen-1")
            .matches(&event));
        assert!(!ChangeFilter::table("notifications")
            .with_user("citizen-2")
            .matches(&event));
        assert!(!ChangeFilter::default()
            .with_user("citizen-1")
            .matches(&comment_insert("x")));
    }

    #[test]
    fn test_kind_serializes_uppercase() {
        assert_eq!(
            serde_json::to_value(ChangeKind::Update).unwrap(),
            json!("UPDATE")
        );
    }
}
