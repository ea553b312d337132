use sqlx::{PgExecutor, PgPool};

use crate::core::error::{AppError, Result};
use crate::features::audit_logs::dtos::{AuditLogQueryParams, AuditLogResponseDto};
use crate::features::audit_logs::models::{AuditLog, NewAuditLog};

const COLUMNS: &str =
    "id, user_id, action, table_name, record_id, old_data, new_data, created_at";

/// Service for the audit trail
pub struct AuditLogService {
    pool: PgPool,
}

impl AuditLogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an entry using the caller's executor so it commits with the audited change
    pub async fn record<'e, E>(
        executor: E,
        entry: &NewAuditLog,
    ) -> std::result::Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (user_id, action, table_name, record_id, old_data, new_data)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.user_id.as_deref())
        .bind(entry.action.as_str())
        .bind(entry.table_name)
        .bind(&entry.record_id)
        .bind(&entry.old_data)
        .bind(&entry.new_data)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// List audit entries, newest first
    /// Returns (entries, total_count)
    pub async fn list(
        &self,
        params: &AuditLogQueryParams,
    ) -> Result<(Vec<AuditLogResponseDto>, i64)> {
        let pagination = params.pagination();
        let table_name = params.table_name.as_deref().filter(|t| !t.trim().is_empty());

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM audit_logs WHERE ($1::text IS NULL OR table_name = $1)",
        )
        .bind(table_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count audit logs: {:?}", e);
            AppError::Database(e)
        })?;

        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs
             WHERE ($1::text IS NULL OR table_name = $1)
             ORDER BY created_at DESC
             OFFSET $2 LIMIT $3"
        );
        let rows = sqlx::query_as::<_, AuditLog>(&query)
            .bind(table_name)
            .bind(pagination.offset())
            .bind(pagination.limit())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list audit logs: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }
}
