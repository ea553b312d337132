use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;

use crate::features::profiles::dtos::ProfileResponseDto;

/// User role enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum UserRole {
    Citizen,
    Official,
    Admin,
    SuperAdmin,
}

impl UserRole {
    fn rank(&self) -> u8 {
        match self {
            UserRole::Citizen => 0,
            UserRole::Official => 1,
            UserRole::Admin => 2,
            UserRole::SuperAdmin => 3,
        }
    }

    /// Whether this role includes the permissions of `other`
    pub fn at_least(&self, other: UserRole) -> bool {
        self.rank() >= other.rank()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Citizen => "citizen",
            UserRole::Official => "official",
            UserRole::Admin => "admin",
            UserRole::SuperAdmin => "super-admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported interface languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "supported_language", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SupportedLanguage {
    #[default]
    English,
    Hindi,
    Spanish,
}

/// Column list for profile queries
pub const PROFILE_COLUMNS: &str =
    "id, full_name, avatar_url, phone, preferred_language, role, created_at, updated_at";

/// Database model for profile
#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub id: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub preferred_language: SupportedLanguage,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Name shown in system comments and notifications
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("official")
    }
}

impl From<Profile> for ProfileResponseDto {
    fn from(p: Profile) -> Self {
        Self {
            id: p.id,
            full_name: p.full_name,
            avatar_url: p.avatar_url,
            phone: p.phone,
            preferred_language: p.preferred_language,
            role: p.role,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_value(UserRole::SuperAdmin).unwrap(),
            serde_json::json!("super-admin")
        );
        let parsed: UserRole = serde_json::from_str("\"official\"").unwrap();
        assert_eq!(parsed, UserRole::Official);
    }

    #[test]
    fn test_at_least_is_a_total_order() {
        assert!(UserRole::SuperAdmin.at_least(UserRole::Admin));
        assert!(UserRole::Admin.at_least(UserRole::Admin));
        assert!(!UserRole::Official.at_least(UserRole::Admin));
        assert!(UserRole::Official.at_least(UserRole::Citizen));
    }

    #[test]
    fn test_display_name_falls_back() {
        let now = Utc::now();
        let mut profile = Profile {
            id: "o-1".to_string(),
            full_name: Some("  ".to_string()),
            avatar_url: None,
            phone: None,
            preferred_language: SupportedLanguage::default(),
            role: UserRole::Official,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(profile.display_name(), "official");

        profile.full_name = Some("Asha Rao".to_string());
        assert_eq!(profile.display_name(), "Asha Rao");
    }
}
