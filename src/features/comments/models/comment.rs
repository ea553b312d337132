use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::comments::dtos::CommentResponseDto;
use crate::features::profiles::models::UserRole;

/// Comment author type matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "comment_author_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CommentAuthorType {
    Citizen,
    Official,
    System,
}

impl From<UserRole> for CommentAuthorType {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Citizen => CommentAuthorType::Citizen,
            UserRole::Official | UserRole::Admin | UserRole::SuperAdmin => {
                CommentAuthorType::Official
            }
        }
    }
}

/// Database model for comment
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub complaint_id: Uuid,
    pub user_id: Option<String>,
    pub user_type: CommentAuthorType,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponseDto {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            complaint_id: c.complaint_id,
            user_id: c.user_id,
            user_type: c.user_type,
            content: c.content,
            created_at: c.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_type_from_role() {
        assert_eq!(
            CommentAuthorType::from(UserRole::Citizen),
            CommentAuthorType::Citizen
        );
        assert_eq!(
            CommentAuthorType::from(UserRole::Official),
            CommentAuthorType::Official
        );
        assert_eq!(
            CommentAuthorType::from(UserRole::SuperAdmin),
            CommentAuthorType::Official
        );
    }
}
