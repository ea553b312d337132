//! Citizen feedback on resolved complaints.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/complaints/{id}/feedback` | Owner | Rate a resolved complaint (1-5) |
//! | GET | `/api/complaints/{id}/feedback` | Official | Feedback left on a complaint |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::FeedbackService;
