use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::features::triage::dtos::{CategorizeRequestDto, CategorizeResponseDto, TriageErrorDto};
use crate::features::triage::error::{cors_headers, TriageError};
use crate::features::triage::services::TriageService;

/// CORS preflight for the categorization function
#[utoipa::path(
    options,
    path = "/functions/v1/categorize-complaint",
    responses(
        (status = 204, description = "Preflight accepted")
    ),
    tag = "triage"
)]
pub async fn categorize_preflight() -> Response {
    (StatusCode::NO_CONTENT, cors_headers()).into_response()
}

/// Categorize a stored complaint and persist the prediction
///
/// The body is read as JSON whatever its content type.
#[utoipa::path(
    post,
    path = "/functions/v1/categorize-complaint",
    request_body = CategorizeRequestDto,
    responses(
        (status = 200, description = "Complaint categorized", body = CategorizeResponseDto),
        (status = 400, description = "Missing required fields", body = TriageErrorDto),
        (status = 500, description = "Unreadable body or prediction could not be stored", body = TriageErrorDto)
    ),
    tag = "triage"
)]
pub async fn categorize_complaint(
    State(service): State<Arc<TriageService>>,
    body: Bytes,
) -> std::result::Result<Response, TriageError> {
    let dto = CategorizeRequestDto::from_body(&body)?;
    let response = service.categorize(dto.into_request()?).await?;

    Ok((StatusCode::OK, cors_headers(), Json(response)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::TriageConfig;
    use crate::core::error::{AppError, Result};
    use crate::features::complaints::models::ComplaintPriority;
    use crate::features::triage::classifier::{TriageCategory, TriageResult};
    use crate::features::triage::error::CORS_ALLOW_ORIGIN;
    use crate::features::triage::routes;
    use crate::features::triage::services::PredictionStore;
    use async_trait::async_trait;
    use axum_test::TestServer;
    use serde_json::json;
    use std::time::Duration;
    use uuid::Uuid;

    struct StubStore {
        healthy: bool,
    }

    #[async_trait]
    impl PredictionStore for StubStore {
        async fn save(&self, _id: Uuid, _prediction: &TriageResult) -> Result<bool> {
            if self.healthy {
                Ok(true)
            } else {
                Err(AppError::Internal("database unavailable".to_string()))
            }
        }
    }

    fn server(healthy: bool) -> TestServer {
        let config = TriageConfig {
            persist_max_attempts: 2,
            persist_backoff: Duration::from_millis(1),
            ..TriageConfig::default()
        };
        let service = TriageService::new(Arc::new(StubStore { healthy }), &config);
        TestServer::new(routes::routes(Arc::new(service))).unwrap()
    }

    const PATH: &str = "/functions/v1/categorize-complaint";

    #[tokio::test]
    async fn test_preflight_returns_cors_headers() {
        let response = server(true).method(axum::http::Method::OPTIONS, PATH).await;

        response.assert_status(StatusCode::NO_CONTENT);
        assert_eq!(
            response.header("access-control-allow-origin"),
            CORS_ALLOW_ORIGIN
        );
        assert!(response.text().is_empty());
    }

    #[tokio::test]
    async fn test_categorize_returns_prediction() {
        let id = Uuid::now_v7();
        let response = server(true)
            .post(PATH)
            .json(&json!({
                "id": id.to_string(),
                "title": "Water leak near park",
                "description": "Urgent pipe burst flooding the street"
            }))
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.header("access-control-allow-origin"),
            CORS_ALLOW_ORIGIN
        );
        let body: CategorizeResponseDto = response.json();
        assert_eq!(body.id, id);
        assert_eq!(body.predicted_category, TriageCategory::Water);
        assert!((body.confidence_score - 0.8).abs() < 1e-9);
        assert_eq!(body.predicted_priority, ComplaintPriority::High);
    }

    #[tokio::test]
    async fn test_missing_description_is_bad_request() {
        let response = server(true)
            .post(PATH)
            .json(&json!({ "id": Uuid::now_v7().to_string(), "title": "Pothole" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "Missing required fields" }));
    }

    #[tokio::test]
    async fn test_malformed_json_is_server_error() {
        let response = server(true)
            .post(PATH)
            .text("{not json")
            .content_type("application/json")
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.header("access-control-allow-origin"),
            CORS_ALLOW_ORIGIN
        );
        let body: TriageErrorDto = response.json();
        assert!(body.error.starts_with("Invalid JSON body"));
    }

    #[tokio::test]
    async fn test_body_is_read_without_json_content_type() {
        let body = json!({
            "id": Uuid::now_v7().to_string(),
            "title": "Small pothole",
            "description": "minor road issue"
        });
        let response = server(true)
            .post(PATH)
            .text(body.to_string())
            .await;

        response.assert_status_ok();
        let body: CategorizeResponseDto = response.json();
        assert_eq!(body.predicted_category, TriageCategory::Roads);
        assert_eq!(body.predicted_priority, ComplaintPriority::Low);
    }

    #[tokio::test]
    async fn test_numeric_title_is_read_as_text() {
        let response = server(true)
            .post(PATH)
            .json(&json!({
                "id": Uuid::now_v7().to_string(),
                "title": 42,
                "description": "garbage not collected"
            }))
            .await;

        response.assert_status_ok();
        let body: CategorizeResponseDto = response.json();
        assert_eq!(body.predicted_category, TriageCategory::Sanitation);
    }

    #[tokio::test]
    async fn test_non_uuid_id_is_server_error() {
        let response = server(true)
            .post(PATH)
            .json(&json!({ "id": "42", "title": "Leak", "description": "pipe burst" }))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: TriageErrorDto = response.json();
        assert!(body.error.starts_with("Failed to store prediction"));
    }

    #[tokio::test]
    async fn test_store_failure_is_server_error() {
        let response = server(false)
            .post(PATH)
            .json(&json!({
                "id": Uuid::now_v7().to_string(),
                "title": "Garbage",
                "description": "trash not collected"
            }))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: TriageErrorDto = response.json();
        assert!(body.error.starts_with("Failed to store prediction"));
    }
}
