use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::feedback::handlers;
use crate::features::feedback::services::FeedbackService;

/// Create routes for the feedback feature
///
/// Note: This feature requires authentication
pub fn routes(service: Arc<FeedbackService>) -> Router {
    Router::new()
        .route(
            "/api/complaints/{id}/feedback",
            get(handlers::list_feedback).post(handlers::create_feedback),
        )
        .with_state(service)
}
