use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::complaints::models::{Complaint, COMPLAINT_COLUMNS};
use crate::features::realtime::models::ChangeKind;
use crate::features::realtime::ChangeFeed;
use crate::features::triage::classifier::TriageResult;

/// Persists heuristic predictions onto complaints
#[async_trait]
pub trait PredictionStore: Send + Sync {
    /// Returns `false` when no complaint has the given id
    async fn save(&self, complaint_id: Uuid, prediction: &TriageResult) -> Result<bool>;
}

pub struct PgPredictionStore {
    pool: PgPool,
    feed: Arc<ChangeFeed>,
}

impl PgPredictionStore {
    pub fn new(pool: PgPool, feed: Arc<ChangeFeed>) -> Self {
        Self { pool, feed }
    }
}

#[async_trait]
impl PredictionStore for PgPredictionStore {
    async fn save(&self, complaint_id: Uuid, prediction: &TriageResult) -> Result<bool> {
        let query = format!(
            "UPDATE complaints SET
                predicted_category = $2,
                confidence_score = $3,
                predicted_priority = $4,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COMPLAINT_COLUMNS}"
        );

        let updated = sqlx::query_as::<_, Complaint>(&query)
            .bind(complaint_id)
            .bind(prediction.category.as_str())
            .bind(prediction.confidence)
            .bind(prediction.priority)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to store prediction: {:?}", e);
                AppError::Database(e)
            })?;

        match updated {
            Some(complaint) => {
                self.feed.publish_record(
                    "complaints",
                    ChangeKind::Update,
                    complaint.id.to_string(),
                    &complaint,
                );
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
