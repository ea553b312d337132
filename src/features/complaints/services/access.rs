//! Visibility rule shared by the complaint, comment, feedback and realtime features:
//! a complaint is visible to the citizen who filed it and to official-level roles.

use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::complaints::models::ComplaintStatus;

/// Ownership and status of a complaint
#[derive(Debug, Clone, FromRow)]
pub struct ComplaintAccess {
    pub citizen_id: String,
    pub status: ComplaintStatus,
}

pub async fn load<'e, E>(executor: E, complaint_id: Uuid) -> Result<ComplaintAccess>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, ComplaintAccess>(
        "SELECT citizen_id, status FROM complaints WHERE id = $1",
    )
    .bind(complaint_id)
    .fetch_optional(executor)
    .await
    .map_err(|e| {
        tracing::error!("Failed to load complaint owner: {:?}", e);
        AppError::Database(e)
    })?
    .ok_or_else(|| AppError::NotFound(format!("Complaint '{}' not found", complaint_id)))
}

/// Other citizens' complaints are reported as missing rather than forbidden
pub fn ensure_can_view(
    user: &AuthenticatedUser,
    complaint: &ComplaintAccess,
    complaint_id: Uuid,
) -> Result<()> {
    if user.has_official_access() || user.owns(&complaint.citizen_id) {
        Ok(())
    } else {
        Err(AppError::NotFound(format!(
            "Complaint '{}' not found",
            complaint_id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::profiles::models::UserRole;

    fn filed_by(citizen: &str) -> ComplaintAccess {
        ComplaintAccess {
            citizen_id: citizen.to_string(),
            status: ComplaintStatus::Pending,
        }
    }

    #[test]
    fn test_owner_and_staff_can_view() {
        let id = Uuid::now_v7();
        let complaint = filed_by("citizen-1");

        let owner = AuthenticatedUser::new("citizen-1", UserRole::Citizen);
        let official = AuthenticatedUser::new("official-1", UserRole::Official);
        assert!(ensure_can_view(&owner, &complaint, id).is_ok());
        assert!(ensure_can_view(&official, &complaint, id).is_ok());
    }

    #[test]
    fn test_other_citizen_sees_not_found() {
        let id = Uuid::now_v7();
        let stranger = AuthenticatedUser::new("citizen-2", UserRole::Citizen);
        assert!(matches!(
            ensure_can_view(&stranger, &filed_by("citizen-1"), id),
            Err(AppError::NotFound(_))
        ));
    }
}
