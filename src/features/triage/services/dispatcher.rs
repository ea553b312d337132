use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::features::triage::dtos::{CategorizeRequestDto, CategorizeResponseDto, TriageErrorDto};
use crate::features::triage::error::TriageError;
use crate::features::triage::services::TriageService;

/// Something that can categorize a stored complaint
#[async_trait]
pub trait Categorizer: Send + Sync {
    async fn categorize(
        &self,
        request: CategorizeRequestDto,
    ) -> Result<CategorizeResponseDto, TriageError>;
}

/// Runs the heuristic in-process
pub struct LocalCategorizer {
    service: Arc<TriageService>,
}

impl LocalCategorizer {
    pub fn new(service: Arc<TriageService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Categorizer for LocalCategorizer {
    async fn categorize(
        &self,
        request: CategorizeRequestDto,
    ) -> Result<CategorizeResponseDto, TriageError> {
        self.service.categorize(request.into_request()?).await
    }
}

/// Invokes a deployed categorization function over HTTP
pub struct RemoteCategorizer {
    url: String,
    http_client: reqwest::Client,
}

impl RemoteCategorizer {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Categorizer for RemoteCategorizer {
    async fn categorize(
        &self,
        request: CategorizeRequestDto,
    ) -> Result<CategorizeResponseDto, TriageError> {
        tracing::debug!("Invoking categorization function: {}", self.url);

        let response = self
            .http_client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TriageError::Remote(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<TriageErrorDto>().await {
                Ok(body) => body.error,
                Err(_) => "no error body".to_string(),
            };
            return Err(TriageError::Remote(format!("HTTP {} - {}", status, message)));
        }

        response
            .json::<CategorizeResponseDto>()
            .await
            .map_err(|e| TriageError::Remote(format!("Failed to parse response: {}", e)))
    }
}

/// Result of one background categorization
#[derive(Debug)]
pub enum DispatchOutcome {
    Completed(CategorizeResponseDto),
    Failed(String),
    TimedOut,
}

impl DispatchOutcome {
    fn log(&self, id: Uuid, timeout: Duration) {
        match self {
            Self::Completed(response) => tracing::debug!(
                "Complaint {} triaged as {} ({})",
                id,
                response.predicted_category.as_str(),
                response.predicted_priority.as_str()
            ),
            Self::Failed(message) => {
                tracing::warn!("Categorization of complaint {} failed: {}", id, message)
            }
            Self::TimedOut => tracing::warn!(
                "Categorization of complaint {} timed out after {:?}",
                id,
                timeout
            ),
        }
    }
}

/// Fires categorization for newly submitted complaints without blocking the submitter
pub struct TriageDispatcher {
    categorizer: Arc<dyn Categorizer>,
    timeout: Duration,
}

impl TriageDispatcher {
    pub fn new(categorizer: Arc<dyn Categorizer>, timeout: Duration) -> Self {
        Self {
            categorizer,
            timeout,
        }
    }

    /// Failures are logged and reported through the handle only
    pub fn dispatch(
        &self,
        id: Uuid,
        title: &str,
        description: &str,
    ) -> JoinHandle<DispatchOutcome> {
        let categorizer = self.categorizer.clone();
        let timeout = self.timeout;
        let request = CategorizeRequestDto::new(id, title, description);

        tokio::spawn(async move {
            let outcome =
                match tokio::time::timeout(timeout, categorizer.categorize(request)).await {
                    Ok(Ok(response)) => DispatchOutcome::Completed(response),
                    Ok(Err(e)) => DispatchOutcome::Failed(e.to_string()),
                    Err(_) => DispatchOutcome::TimedOut,
                };
            outcome.log(id, timeout);
            outcome
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::TriageConfig;
    use crate::core::error::Result;
    use crate::features::triage::classifier::{TriageCategory, TriageResult};
    use crate::features::triage::services::PredictionStore;

    struct AcceptingStore;

    #[async_trait]
    impl PredictionStore for AcceptingStore {
        async fn save(&self, _id: Uuid, _prediction: &TriageResult) -> Result<bool> {
            Ok(true)
        }
    }

    struct SlowCategorizer;

    #[async_trait]
    impl Categorizer for SlowCategorizer {
        async fn categorize(
            &self,
            _request: CategorizeRequestDto,
        ) -> std::result::Result<CategorizeResponseDto, TriageError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Err(TriageError::MissingFields)
        }
    }

    fn local() -> Arc<dyn Categorizer> {
        let service = TriageService::new(Arc::new(AcceptingStore), &TriageConfig::default());
        Arc::new(LocalCategorizer::new(Arc::new(service)))
    }

    #[tokio::test]
    async fn test_dispatch_completes_with_local_categorizer() {
        let dispatcher = TriageDispatcher::new(local(), Duration::from_secs(5));

        let outcome = dispatcher
            .dispatch(Uuid::now_v7(), "No power", "electricity outage since morning")
            .await
            .unwrap();

        match outcome {
            DispatchOutcome::Completed(response) => {
                assert_eq!(response.predicted_category, TriageCategory::Electricity)
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispatch_reports_failure() {
        let dispatcher = TriageDispatcher::new(local(), Duration::from_secs(5));

        let outcome = dispatcher.dispatch(Uuid::now_v7(), "Title", "").await.unwrap();
        assert!(matches!(outcome, DispatchOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_dispatch_times_out() {
        let dispatcher =
            TriageDispatcher::new(Arc::new(SlowCategorizer), Duration::from_millis(20));

        let outcome = dispatcher.dispatch(Uuid::now_v7(), "a", "b").await.unwrap();
        assert!(matches!(outcome, DispatchOutcome::TimedOut));
    }

    #[tokio::test]
    async fn test_dispatch_returns_before_categorization_finishes() {
        let dispatcher = TriageDispatcher::new(Arc::new(SlowCategorizer), Duration::from_secs(30));

        let started = std::time::Instant::now();
        let handle = dispatcher.dispatch(Uuid::now_v7(), "Broken pipe", "water leaking");
        assert!(started.elapsed() < Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.is_finished());
        handle.abort();
    }
}
