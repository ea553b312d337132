use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::profiles::models::UserRole;

/// Session object for a verified caller.
///
/// Built by the auth middleware from the bearer token subject and the caller's
/// profile row, then handed to handlers through the request extensions.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Identity platform subject, also the profile id
    pub sub: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn new(sub: impl Into<String>, role: UserRole) -> Self {
        Self {
            sub: sub.into(),
            role,
        }
    }

    /// Check if user is super admin
    pub fn is_super_admin(&self) -> bool {
        self.role == UserRole::SuperAdmin
    }

    /// Check if user has admin-level access (admin or super-admin)
    pub fn has_admin_access(&self) -> bool {
        self.role.at_least(UserRole::Admin)
    }

    /// Check if user has official-level access (official, admin or super-admin)
    pub fn has_official_access(&self) -> bool {
        self.role.at_least(UserRole::Official)
    }

    /// Every authenticated role can use citizen features
    pub fn has_citizen_access(&self) -> bool {
        self.role.at_least(UserRole::Citizen)
    }

    /// Whether the caller owns a record created by `citizen_id`
    pub fn owns(&self, citizen_id: &str) -> bool {
        self.sub == citizen_id
    }
}
