use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireOfficial;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::feedback::dtos::{CreateFeedbackDto, FeedbackResponseDto};
use crate::features::feedback::services::FeedbackService;
use crate::shared::types::ApiResponse;

/// Leave feedback on a resolved complaint
#[utoipa::path(
    post,
    path = "/api/complaints/{id}/feedback",
    params(("id" = Uuid, Path, description = "Complaint ID")),
    request_body = CreateFeedbackDto,
    responses(
        (status = 201, description = "Feedback recorded", body = ApiResponse<FeedbackResponseDto>),
        (status = 400, description = "Invalid rating or complaint not resolved"),
        (status = 403, description = "Not the complaint owner"),
        (status = 409, description = "Feedback already submitted")
    ),
    security(("bearer_auth" = [])),
    tag = "feedback"
)]
pub async fn create_feedback(
    user: AuthenticatedUser,
    State(service): State<Arc<FeedbackService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<CreateFeedbackDto>,
) -> Result<(StatusCode, Json<ApiResponse<FeedbackResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let feedback = service.create(&user, id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(feedback),
            Some("Thank you for your feedback".to_string()),
            None,
        )),
    ))
}

/// List feedback on a complaint
#[utoipa::path(
    get,
    path = "/api/complaints/{id}/feedback",
    params(("id" = Uuid, Path, description = "Complaint ID")),
    responses(
        (status = 200, description = "Feedback entries", body = ApiResponse<Vec<FeedbackResponseDto>>),
        (status = 403, description = "Forbidden - Official access required"),
        (status = 404, description = "Complaint not found")
    ),
    security(("bearer_auth" = [])),
    tag = "feedback"
)]
pub async fn list_feedback(
    RequireOfficial(_user): RequireOfficial,
    State(service): State<Arc<FeedbackService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<FeedbackResponseDto>>>> {
    let feedback = service.list(id).await?;
    Ok(Json(ApiResponse::success(Some(feedback), None, None)))
}

#[cfg(test)]
mod tests {
    use crate::features::feedback::{routes, FeedbackService};
    use crate::features::profiles::models::UserRole;
    use crate::features::realtime::ChangeFeed;
    use crate::shared::test_helpers::{create_user, lazy_pool, with_user};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;
    use std::sync::Arc;
    use uuid::Uuid;

    fn server(role: UserRole) -> TestServer {
        let service = Arc::new(FeedbackService::new(
            lazy_pool(),
            Arc::new(ChangeFeed::default()),
        ));
        TestServer::new(with_user(routes::routes(service), create_user(role))).unwrap()
    }

    #[tokio::test]
    async fn test_out_of_range_rating_is_rejected() {
        let path = format!("/api/complaints/{}/feedback", Uuid::now_v7());
        server(UserRole::Citizen)
            .post(&path)
            .json(&json!({ "rating": 6 }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_citizen_cannot_list_feedback() {
        let path = format!("/api/complaints/{}/feedback", Uuid::now_v7());
        server(UserRole::Citizen)
            .get(&path)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
