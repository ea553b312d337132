use std::sync::Arc;

use axum::{routing::get, Router};
use sqlx::PgPool;

use crate::features::realtime::handlers;
use crate::features::realtime::services::ChangeFeed;

/// Shared state for the change stream
#[derive(Clone)]
pub struct RealtimeState {
    pub feed: Arc<ChangeFeed>,
    pub pool: PgPool,
}

impl RealtimeState {
    pub fn new(feed: Arc<ChangeFeed>, pool: PgPool) -> Self {
        Self { feed, pool }
    }
}

/// Create routes for the realtime feature
///
/// Note: This feature requires authentication
pub fn routes(state: RealtimeState) -> Router {
    Router::new()
        .route("/api/realtime", get(handlers::stream_changes))
        .with_state(state)
}
