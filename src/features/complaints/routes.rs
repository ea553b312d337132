use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::features::complaints::handlers;
use crate::features::complaints::services::{ComplaintImageService, ComplaintService};
use crate::shared::constants::{MAX_IMAGES_PER_COMPLAINT, MAX_IMAGE_SIZE_BYTES};

/// Create routes for the complaints feature
///
/// Note: This feature requires authentication
pub fn routes(service: Arc<ComplaintService>, images: Arc<ComplaintImageService>) -> Router {
    Router::new()
        .route(
            "/api/complaints",
            get(handlers::list_complaints).post(handlers::create_complaint),
        )
        .route("/api/complaints/mine", get(handlers::list_my_complaints))
        .route("/api/complaints/{id}", get(handlers::get_complaint))
        .route(
            "/api/complaints/{id}/status",
            patch(handlers::update_complaint_status),
        )
        .route(
            "/api/complaints/{id}/assign",
            patch(handlers::assign_complaint),
        )
        .with_state(service)
        .merge(image_routes(images))
}

pub fn image_routes(service: Arc<ComplaintImageService>) -> Router {
    // A full batch of images plus multipart overhead
    let body_limit = MAX_IMAGES_PER_COMPLAINT as usize * MAX_IMAGE_SIZE_BYTES + 1024 * 1024;

    Router::new()
        .route(
            "/api/complaints/{id}/images",
            post(handlers::upload_complaint_images).layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(service)
}
