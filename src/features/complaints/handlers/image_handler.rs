use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::complaints::dtos::UploadImagesDto;
use crate::features::complaints::models::ComplaintImage;
use crate::features::complaints::services::{ComplaintImageService, ImageUpload};
use crate::shared::types::ApiResponse;

/// Attach images to a complaint
///
/// Accepts multipart/form-data; every part carrying a filename is an image.
#[utoipa::path(
    post,
    path = "/api/complaints/{id}/images",
    params(("id" = Uuid, Path, description = "Complaint ID")),
    request_body(
        content = UploadImagesDto,
        content_type = "multipart/form-data",
        description = "One or more image files"
    ),
    responses(
        (status = 201, description = "Images attached", body = ApiResponse<Vec<ComplaintImage>>),
        (status = 400, description = "Not an image, too large, or too many images"),
        (status = 404, description = "Complaint not found"),
        (status = 413, description = "Request too large")
    ),
    security(("bearer_auth" = [])),
    tag = "complaints"
)]
pub async fn upload_complaint_images(
    user: AuthenticatedUser,
    State(service): State<Arc<ComplaintImageService>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<Vec<ComplaintImage>>>)> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            debug!("Ignoring non-file field: {}", field.name().unwrap_or(""));
            continue;
        };

        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let data = field.bytes().await.map_err(|e| {
            debug!("Failed to read file bytes: {}", e);
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;

        let upload = ImageUpload {
            file_name,
            content_type,
            data: data.to_vec(),
        };
        upload.check()?;
        uploads.push(upload);
    }

    if uploads.is_empty() {
        return Err(AppError::BadRequest("At least one image is required".to_string()));
    }

    let images = service.upload(&user, id, uploads).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(images), None, None)),
    ))
}
