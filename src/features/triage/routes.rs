use std::sync::Arc;

use axum::{routing::post, Router};

use crate::features::triage::handlers;
use crate::features::triage::services::TriageService;

/// Create routes for the categorization function
///
/// Note: This router carries its own CORS headers and is mounted outside the
/// global CORS layer and the auth middleware
pub fn routes(service: Arc<TriageService>) -> Router {
    Router::new()
        .route(
            "/functions/v1/categorize-complaint",
            post(handlers::categorize_complaint).options(handlers::categorize_preflight),
        )
        .with_state(service)
}
