use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::core::config::TriageConfig;
use crate::features::triage::classifier::{classify, TriageResult};
use crate::features::triage::dtos::{CategorizeRequest, CategorizeResponseDto};
use crate::features::triage::error::TriageError;
use crate::features::triage::services::PredictionStore;

/// Runs the heuristic and persists its prediction
pub struct TriageService {
    store: Arc<dyn PredictionStore>,
    max_attempts: u32,
    backoff: Duration,
}

impl TriageService {
    pub fn new(store: Arc<dyn PredictionStore>, config: &TriageConfig) -> Self {
        Self {
            store,
            max_attempts: config.persist_max_attempts.max(1),
            backoff: config.persist_backoff,
        }
    }

    pub async fn categorize(
        &self,
        request: CategorizeRequest,
    ) -> Result<CategorizeResponseDto, TriageError> {
        let prediction = classify(&request.title, &request.description);

        self.persist_with_retry(request.id, &prediction).await?;

        tracing::info!(
            "Complaint {} categorized: category={}, confidence={:.2}, priority={}",
            request.id,
            prediction.category.as_str(),
            prediction.confidence,
            prediction.priority.as_str()
        );

        Ok(CategorizeResponseDto {
            id: request.id,
            predicted_category: prediction.category,
            confidence_score: prediction.confidence,
            predicted_priority: prediction.priority,
        })
    }

    /// Exponential backoff between attempts; the categorization itself is not repeated
    async fn persist_with_retry(
        &self,
        complaint_id: Uuid,
        prediction: &TriageResult,
    ) -> Result<(), TriageError> {
        let mut delay = self.backoff;
        let mut attempt = 1;

        loop {
            match self.store.save(complaint_id, prediction).await {
                Ok(true) => return Ok(()),
                Ok(false) => {
                    tracing::warn!(
                        "No complaint matched id {}; prediction not stored",
                        complaint_id
                    );
                    return Ok(());
                }
                Err(e) if attempt < self.max_attempts => {
                    tracing::warn!(
                        "Storing prediction for {} failed ({}/{}): {}",
                        complaint_id,
                        attempt,
                        self.max_attempts,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                    attempt += 1;
                }
                Err(e) => {
                    return Err(TriageError::Persistence(format!(
                        "{} (after {} attempts)",
                        e, attempt
                    )))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{AppError, Result};
    use crate::features::complaints::models::ComplaintPriority;
    use crate::features::triage::classifier::TriageCategory;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` saves, then reports `found`
    struct FlakyStore {
        failures: u32,
        found: bool,
        calls: AtomicU32,
    }

    impl FlakyStore {
        fn new(failures: u32, found: bool) -> Arc<Self> {
            Arc::new(Self {
                failures,
                found,
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl PredictionStore for FlakyStore {
        async fn save(&self, _id: Uuid, _prediction: &TriageResult) -> Result<bool> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                Err(AppError::Internal("connection reset".to_string()))
            } else {
                Ok(self.found)
            }
        }
    }

    fn config(attempts: u32) -> TriageConfig {
        TriageConfig {
            persist_max_attempts: attempts,
            persist_backoff: Duration::from_millis(1),
            ..TriageConfig::default()
        }
    }

    fn request(title: &str, description: &str) -> CategorizeRequest {
        CategorizeRequest {
            id: Uuid::now_v7(),
            title: title.to_string(),
            description: description.to_string(),
        }
    }

    #[tokio::test]
    async fn test_categorize_returns_prediction() {
        let store = FlakyStore::new(0, true);
        let service = TriageService::new(store.clone(), &config(3));

        let req = request("Small pothole", "minor road issue");
        let id = req.id;
        let response = service.categorize(req).await.unwrap();

        assert_eq!(response.id, id);
        assert_eq!(response.predicted_category, TriageCategory::Roads);
        assert_eq!(response.confidence_score, 1.0);
        assert_eq!(response.predicted_priority, ComplaintPriority::Low);
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let store = FlakyStore::new(2, true);
        let service = TriageService::new(store.clone(), &config(3));

        assert!(service.categorize(request("Leak", "pipe")).await.is_ok());
        assert_eq!(store.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_configured_attempts() {
        let store = FlakyStore::new(10, true);
        let service = TriageService::new(store.clone(), &config(2));

        let err = service.categorize(request("Leak", "pipe")).await.unwrap_err();
        assert!(matches!(err, TriageError::Persistence(_)));
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_complaint_still_succeeds() {
        let store = FlakyStore::new(0, false);
        let service = TriageService::new(store, &config(3));

        let response = service.categorize(request("Leak", "pipe")).await.unwrap();
        assert_eq!(response.predicted_category, TriageCategory::Water);
    }
}
