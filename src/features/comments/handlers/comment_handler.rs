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
use crate::features::auth::model::AuthenticatedUser;
use crate::features::comments::dtos::{CommentResponseDto, CreateCommentDto};
use crate::features::comments::services::CommentService;
use crate::shared::types::ApiResponse;

/// List comments on a complaint
#[utoipa::path(
    get,
    path = "/api/complaints/{id}/comments",
    params(("id" = Uuid, Path, description = "Complaint ID")),
    responses(
        (status = 200, description = "Comments, oldest first", body = ApiResponse<Vec<CommentResponseDto>>),
        (status = 404, description = "Complaint not found")
    ),
    security(("bearer_auth" = [])),
    tag = "comments"
)]
pub async fn list_comments(
    user: AuthenticatedUser,
    State(service): State<Arc<CommentService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<CommentResponseDto>>>> {
    let comments = service.list(&user, id).await?;
    Ok(Json(ApiResponse::success(Some(comments), None, None)))
}

/// Add a comment to a complaint
#[utoipa::path(
    post,
    path = "/api/complaints/{id}/comments",
    params(("id" = Uuid, Path, description = "Complaint ID")),
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment added", body = ApiResponse<CommentResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Complaint not found")
    ),
    security(("bearer_auth" = [])),
    tag = "comments"
)]
pub async fn create_comment(
    user: AuthenticatedUser,
    State(service): State<Arc<CommentService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<CreateCommentDto>,
) -> Result<(StatusCode, Json<ApiResponse<CommentResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let comment = service.create(&user, id, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(comment), None, None)),
    ))
}

#[cfg(test)]
mod tests {
    use crate::features::comments::{routes, CommentService};
    use crate::features::profiles::models::UserRole;
    use crate::features::realtime::ChangeFeed;
    use crate::shared::test_helpers::{create_user, lazy_pool, with_user};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;
    use std::sync::Arc;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_empty_comment_is_rejected_before_lookup() {
        let service = Arc::new(CommentService::new(
            lazy_pool(),
            Arc::new(ChangeFeed::default()),
        ));
        let server = TestServer::new(with_user(
            routes::routes(service),
            create_user(UserRole::Citizen),
        ))
        .unwrap();

        let path = format!("/api/complaints/{}/comments", Uuid::now_v7());
        server
            .post(&path)
            .json(&json!({ "content": "" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
