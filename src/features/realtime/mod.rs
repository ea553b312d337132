//! Change notifications for complaint data.
//!
//! Services publish a [`ChangeEvent`](models::ChangeEvent) after every committed
//! mutation. In-process consumers register a callback through
//! [`ChangeFeed::subscribe`]; browsers follow the same feed as Server-Sent Events.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/realtime` | Yes | SSE stream of change events (`table`, `event`, `record_id` filters); citizens see own notifications or own complaints |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::RealtimeState;
pub use services::ChangeFeed;
