//! Per-user notification inbox.
//!
//! Notifications are written by the complaint workflow (status changes,
//! assignments) and read here.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/notifications` | Yes | Own notifications, newest first |
//! | PATCH | `/api/notifications/{id}/read` | Yes | Mark one as read |
//! | PATCH | `/api/notifications/read-all` | Yes | Mark all as read |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::NotificationService;
