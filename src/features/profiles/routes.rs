use std::sync::Arc;

use axum::{
    routing::{delete, get, patch},
    Router,
};

use crate::features::profiles::handlers;
use crate::features::profiles::services::ProfileService;

/// Create routes for the profiles feature
///
/// Note: This feature requires authentication
pub fn routes(service: Arc<ProfileService>) -> Router {
    Router::new()
        .route(
            "/api/profiles/me",
            get(handlers::get_my_profile).patch(handlers::update_my_profile),
        )
        .route("/api/officials", get(handlers::list_officials))
        .route("/api/admin/users", get(handlers::list_users))
        .route("/api/admin/users/{id}/role", patch(handlers::update_user_role))
        .route("/api/admin/users/{id}", delete(handlers::delete_user))
        .with_state(service)
}
