//! Discussion thread on a complaint.
//!
//! Citizens and staff comment directly; the complaint workflow adds system
//! comments for status changes and assignments.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/complaints/{id}/comments` | Owner or official | Comments, oldest first |
//! | POST | `/api/complaints/{id}/comments` | Owner or official | Add a comment |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::CommentService;
