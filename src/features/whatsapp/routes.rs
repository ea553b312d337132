use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::whatsapp::handlers;
use crate::features::whatsapp::services::WhatsAppService;

/// Create routes for the WhatsApp channel
///
/// Note: Meta calls these without a bearer token; posts are authenticated by
/// signature when an app secret is configured
pub fn routes(service: Arc<WhatsAppService>) -> Router {
    Router::new()
        .route(
            "/webhooks/whatsapp",
            get(handlers::verify_webhook).post(handlers::receive_webhook),
        )
        .with_state(service)
}
