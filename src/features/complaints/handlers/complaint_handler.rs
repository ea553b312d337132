use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::{RequireAdmin, RequireCitizen, RequireOfficial};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::complaints::dtos::{
    AssignComplaintDto, ComplaintQueryParams, ComplaintResponseDto, CreateComplaintDto,
    UpdateStatusDto,
};
use crate::features::complaints::services::ComplaintService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Submit a complaint
///
/// The complaint is stored as pending and categorized in the background;
/// the response never waits for the prediction.
#[utoipa::path(
    post,
    path = "/api/complaints",
    request_body = CreateComplaintDto,
    responses(
        (status = 201, description = "Complaint submitted", body = ApiResponse<ComplaintResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "complaints"
)]
pub async fn create_complaint(
    RequireCitizen(user): RequireCitizen,
    State(service): State<Arc<ComplaintService>>,
    AppJson(dto): AppJson<CreateComplaintDto>,
) -> Result<(StatusCode, Json<ApiResponse<ComplaintResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let complaint = service.create(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(complaint),
            Some("Complaint submitted".to_string()),
            None,
        )),
    ))
}

/// List all complaints (official access)
#[utoipa::path(
    get,
    path = "/api/complaints",
    params(ComplaintQueryParams),
    responses(
        (status = 200, description = "Complaints", body = ApiResponse<Vec<ComplaintResponseDto>>),
        (status = 403, description = "Official access required")
    ),
    security(("bearer_auth" = [])),
    tag = "complaints"
)]
pub async fn list_complaints(
    RequireOfficial(_user): RequireOfficial,
    State(service): State<Arc<ComplaintService>>,
    Query(params): Query<ComplaintQueryParams>,
) -> Result<Json<ApiResponse<Vec<ComplaintResponseDto>>>> {
    let (complaints, total) = service.list(&params).await?;
    Ok(Json(ApiResponse::success(
        Some(complaints),
        None,
        Some(Meta { total }),
    )))
}

/// List the caller's own complaints
#[utoipa::path(
    get,
    path = "/api/complaints/mine",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Complaints, newest first", body = ApiResponse<Vec<ComplaintResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "complaints"
)]
pub async fn list_my_complaints(
    RequireCitizen(user): RequireCitizen,
    State(service): State<Arc<ComplaintService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<ComplaintResponseDto>>>> {
    let (complaints, total) = service.list_mine(&user, &pagination).await?;
    Ok(Json(ApiResponse::success(
        Some(complaints),
        None,
        Some(Meta { total }),
    )))
}

/// Get a complaint with its images
#[utoipa::path(
    get,
    path = "/api/complaints/{id}",
    params(("id" = Uuid, Path, description = "Complaint ID")),
    responses(
        (status = 200, description = "Complaint", body = ApiResponse<ComplaintResponseDto>),
        (status = 404, description = "Complaint not found")
    ),
    security(("bearer_auth" = [])),
    tag = "complaints"
)]
pub async fn get_complaint(
    user: AuthenticatedUser,
    State(service): State<Arc<ComplaintService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ComplaintResponseDto>>> {
    let complaint = service.get(&user, id).await?;
    Ok(Json(ApiResponse::success(Some(complaint), None, None)))
}

/// Change a complaint's status (official access)
#[utoipa::path(
    patch,
    path = "/api/complaints/{id}/status",
    params(("id" = Uuid, Path, description = "Complaint ID")),
    request_body = UpdateStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<ComplaintResponseDto>),
        (status = 403, description = "Official access required"),
        (status = 404, description = "Complaint not found")
    ),
    security(("bearer_auth" = [])),
    tag = "complaints"
)]
pub async fn update_complaint_status(
    RequireOfficial(user): RequireOfficial,
    State(service): State<Arc<ComplaintService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateStatusDto>,
) -> Result<Json<ApiResponse<ComplaintResponseDto>>> {
    let complaint = service.update_status(&user, id, dto.status).await?;
    Ok(Json(ApiResponse::success(
        Some(complaint),
        Some("Status updated".to_string()),
        None,
    )))
}

/// Assign a complaint to an official (admin access)
#[utoipa::path(
    patch,
    path = "/api/complaints/{id}/assign",
    params(("id" = Uuid, Path, description = "Complaint ID")),
    request_body = AssignComplaintDto,
    responses(
        (status = 200, description = "Complaint assigned", body = ApiResponse<ComplaintResponseDto>),
        (status = 400, description = "Assignee is not an official"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Complaint not found")
    ),
    security(("bearer_auth" = [])),
    tag = "complaints"
)]
pub async fn assign_complaint(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<ComplaintService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<AssignComplaintDto>,
) -> Result<Json<ApiResponse<ComplaintResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let complaint = service.assign(&user, id, dto.official_id.trim()).await?;
    Ok(Json(ApiResponse::success(
        Some(complaint),
        Some("Complaint assigned".to_string()),
        None,
    )))
}
