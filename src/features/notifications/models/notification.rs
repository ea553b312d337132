use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::notifications::dtos::NotificationResponseDto;

/// Database model for notification
#[derive(Debug, Clone, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Notification to deliver
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
}

impl NewNotification {
    /// Link into the complaint detail view
    pub fn for_complaint(
        user_id: &str,
        complaint_id: Uuid,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            title: title.into(),
            message: message.into(),
            link: Some(format!("/complaints/{}", complaint_id)),
        }
    }
}

impl From<Notification> for NotificationResponseDto {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            user_id: n.user_id,
            title: n.title,
            message: n.message,
            is_read: n.is_read,
            link: n.link,
            created_at: n.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_complaint_links_detail_view() {
        let id = Uuid::nil();
        let n = NewNotification::for_complaint("citizen-1", id, "Complaint Status Updated", "msg");
        assert_eq!(
            n.link.as_deref(),
            Some("/complaints/00000000-0000-0000-0000-000000000000")
        );
        assert_eq!(n.user_id, "citizen-1");
    }
}
