use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::audit_logs::models::{AuditAction, NewAuditLog};
use crate::features::audit_logs::AuditLogService;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::comments::dtos::CommentResponseDto;
use crate::features::comments::CommentService;
use crate::features::complaints::dtos::{
    ComplaintQueryParams, ComplaintResponseDto, CreateComplaintDto,
};
use crate::features::complaints::models::{
    Complaint, ComplaintImage, ComplaintStatus, COMPLAINT_COLUMNS, COMPLAINT_IMAGE_COLUMNS,
};
use crate::features::complaints::services::access;
use crate::features::notifications::dtos::NotificationResponseDto;
use crate::features::notifications::models::NewNotification;
use crate::features::notifications::NotificationService;
use crate::features::profiles::models::{Profile, UserRole, PROFILE_COLUMNS};
use crate::features::realtime::models::ChangeKind;
use crate::features::realtime::ChangeFeed;
use crate::features::triage::TriageDispatcher;
use crate::shared::types::PaginationQuery;

/// Service for the complaint lifecycle
pub struct ComplaintService {
    pool: PgPool,
    feed: Arc<ChangeFeed>,
    dispatcher: Arc<TriageDispatcher>,
}

impl ComplaintService {
    pub fn new(pool: PgPool, feed: Arc<ChangeFeed>, dispatcher: Arc<TriageDispatcher>) -> Self {
        Self {
            pool,
            feed,
            dispatcher,
        }
    }

    /// Submit a complaint and hand it to triage in the background
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        dto: CreateComplaintDto,
    ) -> Result<ComplaintResponseDto> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let query = format!(
            "INSERT INTO complaints (
                title, description, category, location, latitude, longitude,
                phone_number, priority, status, citizen_id
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COMPLAINT_COLUMNS}"
        );
        let complaint = sqlx::query_as::<_, Complaint>(&query)
            .bind(dto.title.trim())
            .bind(dto.description.trim())
            .bind(dto.category.trim())
            .bind(dto.location.trim())
            .bind(dto.latitude)
            .bind(dto.longitude)
            .bind(dto.phone_number.as_deref())
            .bind(dto.priority.unwrap_or_default())
            .bind(ComplaintStatus::Pending)
            .bind(&user.sub)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create complaint: {:?}", e);
                AppError::Database(e)
            })?;

        let entry = NewAuditLog::new(
            &user.sub,
            AuditAction::CreateComplaint,
            "complaints",
            complaint.id,
        )
        .snapshots(None::<&Complaint>, Some(&complaint));
        AuditLogService::record(&mut *tx, &entry)
            .await
            .map_err(|e| {
                tracing::error!("Failed to audit complaint creation: {:?}", e);
                AppError::Database(e)
            })?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(
            "Complaint submitted: id={}, citizen={}",
            complaint.id,
            user.sub
        );

        self.feed.publish_record(
            "complaints",
            ChangeKind::Insert,
            complaint.id.to_string(),
            &complaint,
        );

        // Submission never waits on triage
        drop(
            self.dispatcher
                .dispatch(complaint.id, &complaint.title, &complaint.description),
        );

        Ok(complaint.into())
    }

    /// Single complaint with its images
    pub async fn get(&self, user: &AuthenticatedUser, id: Uuid) -> Result<ComplaintResponseDto> {
        let complaint = self.find(id).await?;
        access::ensure_can_view(
            user,
            &access::ComplaintAccess {
                citizen_id: complaint.citizen_id.clone(),
                status: complaint.status,
            },
            id,
        )?;

        let images = self.images(id).await?;
        Ok(ComplaintResponseDto::from(complaint).with_images(images))
    }

    /// The caller's own complaints, newest first
    pub async fn list_mine(
        &self,
        user: &AuthenticatedUser,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<ComplaintResponseDto>, i64)> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM complaints WHERE citizen_id = $1")
                .bind(&user.sub)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to count complaints: {:?}", e);
                    AppError::Database(e)
                })?;

        let query = format!(
            "SELECT {COMPLAINT_COLUMNS} FROM complaints
             WHERE citizen_id = $1
             ORDER BY created_at DESC, id DESC
             OFFSET $2 LIMIT $3"
        );
        let rows = sqlx::query_as::<_, Complaint>(&query)
            .bind(&user.sub)
            .bind(pagination.offset())
            .bind(pagination.limit())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list complaints: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// All complaints with filters, for staff
    pub async fn list(
        &self,
        params: &ComplaintQueryParams,
    ) -> Result<(Vec<ComplaintResponseDto>, i64)> {
        let pagination = params.pagination();
        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));
        let category = params
            .category
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        const FILTER: &str = "($1::complaint_status IS NULL OR status = $1)
              AND ($2::complaint_priority IS NULL OR priority = $2)
              AND ($3::text IS NULL OR LOWER(category) = LOWER($3))
              AND ($4::text IS NULL OR assigned_to_id = $4)
              AND ($5::text IS NULL OR title ILIKE $5)";

        let count_query = format!("SELECT COUNT(*) FROM complaints WHERE {FILTER}");
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(params.status)
            .bind(params.priority)
            .bind(category)
            .bind(params.assigned_to.as_deref())
            .bind(search.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count complaints: {:?}", e);
                AppError::Database(e)
            })?;

        let query = format!(
            "SELECT {COMPLAINT_COLUMNS} FROM complaints
             WHERE {FILTER}
             ORDER BY {}
             OFFSET $6 LIMIT $7",
            params.order_by()
        );
        let rows = sqlx::query_as::<_, Complaint>(&query)
            .bind(params.status)
            .bind(params.priority)
            .bind(category)
            .bind(params.assigned_to.as_deref())
            .bind(search.as_deref())
            .bind(pagination.offset())
            .bind(pagination.limit())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list complaints: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// Move a complaint to `status`; an unchanged status has no side effects
    pub async fn update_status(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        status: ComplaintStatus,
    ) -> Result<ComplaintResponseDto> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let existing = Self::lock(&mut tx, id).await?;
        if existing.status == status {
            return Ok(existing.into());
        }

        let resolved_at = (status == ComplaintStatus::Resolved).then(Utc::now);
        let query = format!(
            "UPDATE complaints
             SET status = $2, resolved_at = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {COMPLAINT_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Complaint>(&query)
            .bind(id)
            .bind(status)
            .bind(resolved_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update complaint status: {:?}", e);
                AppError::Database(e)
            })?;

        let comment = CommentService::add_system_comment(
            &mut *tx,
            id,
            &format!("Status updated to: {}", status.label()),
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to add status comment: {:?}", e);
            AppError::Database(e)
        })?;

        let notification = NotificationService::create(
            &mut *tx,
            &NewNotification::for_complaint(
                &updated.citizen_id,
                id,
                "Complaint status updated",
                format!(
                    "Your complaint \"{}\" is now {}",
                    updated.title,
                    status.label()
                ),
            ),
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to notify citizen: {:?}", e);
            AppError::Database(e)
        })?;

        let entry = NewAuditLog::new(&actor.sub, AuditAction::UpdateStatus, "complaints", id)
            .snapshots(
                Some(&serde_json::json!({ "status": existing.status })),
                Some(&serde_json::json!({ "status": updated.status })),
            );
        AuditLogService::record(&mut *tx, &entry)
            .await
            .map_err(|e| {
                tracing::error!("Failed to audit status change: {:?}", e);
                AppError::Database(e)
            })?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(
            "Complaint status changed: id={}, {} -> {}, by={}",
            id,
            existing.status,
            updated.status,
            actor.sub
        );

        self.publish_side_effects(&updated, comment.into(), notification.into());
        Ok(updated.into())
    }

    /// Assign a complaint to an official
    pub async fn assign(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        official_id: &str,
    ) -> Result<ComplaintResponseDto> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let existing = Self::lock(&mut tx, id).await?;

        let query = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1");
        let official = sqlx::query_as::<_, Profile>(&query)
            .bind(official_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load assignee: {:?}", e);
                AppError::Database(e)
            })?
            .filter(|p| p.role == UserRole::Official)
            .ok_or_else(|| {
                AppError::BadRequest(format!("'{}' is not an official", official_id))
            })?;

        let query = format!(
            "UPDATE complaints
             SET assigned_to_id = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COMPLAINT_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Complaint>(&query)
            .bind(id)
            .bind(&official.id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to assign complaint: {:?}", e);
                AppError::Database(e)
            })?;

        let comment = CommentService::add_system_comment(
            &mut *tx,
            id,
            &format!("Complaint assigned to {}", official.display_name()),
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to add assignment comment: {:?}", e);
            AppError::Database(e)
        })?;

        let notification = NotificationService::create(
            &mut *tx,
            &NewNotification::for_complaint(
                &official.id,
                id,
                "New complaint assigned",
                format!("You have been assigned \"{}\"", updated.title),
            ),
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to notify assignee: {:?}", e);
            AppError::Database(e)
        })?;

        let entry = NewAuditLog::new(&actor.sub, AuditAction::AssignComplaint, "complaints", id)
            .snapshots(
                Some(&serde_json::json!({ "assigned_to_id": existing.assigned_to_id })),
                Some(&serde_json::json!({ "assigned_to_id": updated.assigned_to_id })),
            );
        AuditLogService::record(&mut *tx, &entry)
            .await
            .map_err(|e| {
                tracing::error!("Failed to audit assignment: {:?}", e);
                AppError::Database(e)
            })?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(
            "Complaint assigned: id={}, official={}, by={}",
            id,
            official.id,
            actor.sub
        );

        self.publish_side_effects(&updated, comment.into(), notification.into());
        Ok(updated.into())
    }

    async fn find(&self, id: Uuid) -> Result<Complaint> {
        let query = format!("SELECT {COMPLAINT_COLUMNS} FROM complaints WHERE id = $1");
        sqlx::query_as::<_, Complaint>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get complaint: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Complaint '{}' not found", id)))
    }

    /// Row-locked read inside a workflow transaction
    async fn lock(tx: &mut sqlx::PgConnection, id: Uuid) -> Result<Complaint> {
        let query =
            format!("SELECT {COMPLAINT_COLUMNS} FROM complaints WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Complaint>(&query)
            .bind(id)
            .fetch_optional(tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to lock complaint: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Complaint '{}' not found", id)))
    }

    async fn images(&self, complaint_id: Uuid) -> Result<Vec<ComplaintImage>> {
        let query = format!(
            "SELECT {} FROM complaint_images
             WHERE complaint_id = $1
             ORDER BY created_at ASC",
            COMPLAINT_IMAGE_COLUMNS
        );
        sqlx::query_as::<_, ComplaintImage>(&query)
            .bind(complaint_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list complaint images: {:?}", e);
                AppError::Database(e)
            })
    }

    fn publish_side_effects(
        &self,
        complaint: &Complaint,
        comment: CommentResponseDto,
        notification: NotificationResponseDto,
    ) {
        self.feed.publish_record(
            "complaints",
            ChangeKind::Update,
            complaint.id.to_string(),
            complaint,
        );
        self.feed
            .publish_record("comments", ChangeKind::Insert, comment.id.to_string(), &comment);
        self.feed.publish_record(
            "notifications",
            ChangeKind::Insert,
            notification.id.to_string(),
            &notification,
        );
    }
}
