use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::audit_logs::models::{AuditAction, NewAuditLog};
use crate::features::audit_logs::AuditLogService;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::profiles::dtos::{ProfileQueryParams, ProfileResponseDto, UpdateProfileDto};
use crate::features::profiles::models::{Profile, UserRole, PROFILE_COLUMNS as COLUMNS};
use crate::features::realtime::models::ChangeKind;
use crate::features::realtime::ChangeFeed;

/// Name given to profiles created from a bare phone number
const PHONE_PROFILE_NAME: &str = "WhatsApp User";

/// Service for profile and role operations
pub struct ProfileService {
    pool: PgPool,
    feed: Arc<ChangeFeed>,
}

impl ProfileService {
    pub fn new(pool: PgPool, feed: Arc<ChangeFeed>) -> Self {
        Self { pool, feed }
    }

    /// Return the caller's role, creating a citizen profile on first sight
    pub async fn ensure_profile(&self, sub: &str) -> Result<UserRole> {
        if let Some(role) = self.find_role(sub).await? {
            return Ok(role);
        }

        let inserted =
            sqlx::query("INSERT INTO profiles (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
                .bind(sub)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to create profile: {:?}", e);
                    AppError::Database(e)
                })?;

        if inserted.rows_affected() > 0 {
            tracing::info!("Profile created for new user: {}", sub);
        }

        // A concurrent first request may have won the insert
        self.find_role(sub)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Profile '{}' missing after insert", sub)))
    }

    /// Profile for a contact known only by phone number, created as a citizen
    /// the first time the number is seen
    pub async fn ensure_phone_profile(
        &self,
        phone: &str,
        full_name: Option<&str>,
    ) -> Result<Profile> {
        let query = format!(
            "SELECT {COLUMNS} FROM profiles WHERE phone = $1 ORDER BY created_at ASC LIMIT 1"
        );
        let existing = sqlx::query_as::<_, Profile>(&query)
            .bind(phone)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to look up profile by phone: {:?}", e);
                AppError::Database(e)
            })?;
        if let Some(profile) = existing {
            return Ok(profile);
        }

        let full_name = full_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(PHONE_PROFILE_NAME);
        let query = format!(
            "INSERT INTO profiles (id, full_name, phone, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let profile = sqlx::query_as::<_, Profile>(&query)
            .bind(Uuid::now_v7().to_string())
            .bind(full_name)
            .bind(phone)
            .bind(UserRole::Citizen)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create phone profile: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("Profile {} created for phone contact", profile.id);
        let dto: ProfileResponseDto = profile.clone().into();
        self.feed
            .publish_record("profiles", ChangeKind::Insert, &dto.id, &dto);
        Ok(profile)
    }

    async fn find_role(&self, sub: &str) -> Result<Option<UserRole>> {
        sqlx::query_scalar::<_, UserRole>("SELECT role FROM profiles WHERE id = $1")
            .bind(sub)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to look up profile role: {:?}", e);
                AppError::Database(e)
            })
    }

    /// Fetch a profile row
    pub async fn find(&self, id: &str) -> Result<Option<Profile>> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get profile: {:?}", e);
                AppError::Database(e)
            })
    }

    pub async fn get(&self, id: &str) -> Result<ProfileResponseDto> {
        self.find(id)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Profile '{}' not found", id)))
    }

    /// Update the caller's own profile; omitted fields keep their value
    pub async fn update_me(&self, sub: &str, dto: UpdateProfileDto) -> Result<ProfileResponseDto> {
        let query = format!(
            "UPDATE profiles SET
                full_name = COALESCE($2, full_name),
                avatar_url = COALESCE($3, avatar_url),
                phone = COALESCE($4, phone),
                preferred_language = COALESCE($5, preferred_language),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );

        let profile = sqlx::query_as::<_, Profile>(&query)
            .bind(sub)
            .bind(dto.full_name.as_deref().map(str::trim))
            .bind(dto.avatar_url)
            .bind(dto.phone)
            .bind(dto.preferred_language)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update profile: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Profile '{}' not found", sub)))?;

        let dto: ProfileResponseDto = profile.into();
        self.feed
            .publish_record("profiles", ChangeKind::Update, &dto.id, &dto);
        Ok(dto)
    }

    /// Officials available for complaint assignment
    pub async fn list_officials(&self) -> Result<Vec<ProfileResponseDto>> {
        let query = format!(
            "SELECT {COLUMNS} FROM profiles WHERE role = 'official' ORDER BY full_name NULLS LAST, id"
        );
        let rows = sqlx::query_as::<_, Profile>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list officials: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List users with optional role filter and name search
    /// Returns (profiles, total_count)
    pub async fn list_users(
        &self,
        params: &ProfileQueryParams,
    ) -> Result<(Vec<ProfileResponseDto>, i64)> {
        let pagination = params.pagination();
        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM profiles
             WHERE ($1::user_role IS NULL OR role = $1)
               AND ($2::text IS NULL OR full_name ILIKE $2)",
        )
        .bind(params.role)
        .bind(search.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count profiles: {:?}", e);
            AppError::Database(e)
        })?;

        let query = format!(
            "SELECT {COLUMNS} FROM profiles
             WHERE ($1::user_role IS NULL OR role = $1)
               AND ($2::text IS NULL OR full_name ILIKE $2)
             ORDER BY created_at DESC
             OFFSET $3 LIMIT $4"
        );
        let rows = sqlx::query_as::<_, Profile>(&query)
            .bind(params.role)
            .bind(search.as_deref())
            .bind(pagination.offset())
            .bind(pagination.limit())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list profiles: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// Change a user's role (super admin only)
    pub async fn update_role(
        &self,
        actor: &AuthenticatedUser,
        id: &str,
        role: UserRole,
    ) -> Result<ProfileResponseDto> {
        if actor.owns(id) && role != actor.role {
            return Err(AppError::Forbidden(
                "You cannot change your own role".to_string(),
            ));
        }

        let existing = self
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile '{}' not found", id)))?;

        if existing.role == role {
            return Ok(existing.into());
        }

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let query = format!(
            "UPDATE profiles SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .bind(role)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update role: {:?}", e);
                AppError::Database(e)
            })?;

        let entry = NewAuditLog::new(&actor.sub, AuditAction::UpdateRole, "profiles", id).snapshots(
            Some(&serde_json::json!({ "role": existing.role })),
            Some(&serde_json::json!({ "role": updated.role })),
        );
        AuditLogService::record(&mut *tx, &entry)
            .await
            .map_err(|e| {
                tracing::error!("Failed to audit role change: {:?}", e);
                AppError::Database(e)
            })?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(
            "Role changed: user={}, {} -> {}, by={}",
            id,
            existing.role,
            updated.role,
            actor.sub
        );

        let dto: ProfileResponseDto = updated.into();
        self.feed
            .publish_record("profiles", ChangeKind::Update, &dto.id, &dto);
        Ok(dto)
    }

    /// Delete a user's profile and, by cascade, their complaints and notifications
    pub async fn delete_user(&self, actor: &AuthenticatedUser, id: &str) -> Result<()> {
        if actor.owns(id) {
            return Err(AppError::Forbidden(
                "You cannot delete your own account".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let query = format!("DELETE FROM profiles WHERE id = $1 RETURNING {COLUMNS}");
        let deleted = sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete profile: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Profile '{}' not found", id)))?;

        let snapshot: ProfileResponseDto = deleted.into();
        let entry = NewAuditLog::new(&actor.sub, AuditAction::DeleteUser, "profiles", id)
            .snapshots::<_, serde_json::Value>(Some(&snapshot), None);
        AuditLogService::record(&mut *tx, &entry)
            .await
            .map_err(|e| {
                tracing::error!("Failed to audit user deletion: {:?}", e);
                AppError::Database(e)
            })?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!("User deleted: id={}, by={}", id, actor.sub);
        self.feed
            .publish_record("profiles", ChangeKind::Delete, id, &snapshot);
        Ok(())
    }
}
