use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::comments::handlers;
use crate::features::comments::services::CommentService;

/// Create routes for the comments feature
///
/// Note: This feature requires authentication
pub fn routes(service: Arc<CommentService>) -> Router {
    Router::new()
        .route(
            "/api/complaints/{id}/comments",
            get(handlers::list_comments).post(handlers::create_comment),
        )
        .with_state(service)
}
