//! Complaint lifecycle.
//!
//! Citizens submit complaints and attach images; officials move them through
//! `pending → in-progress → resolved | rejected`; admins assign them to officials.
//! Every mutation is audited and published on the change feed. Submission hands
//! the complaint to the triage heuristic in the background.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/complaints` | Citizen | Submit a complaint |
//! | GET | `/api/complaints` | Official | List with filters and sorting |
//! | GET | `/api/complaints/mine` | Citizen | Caller's complaints, newest first |
//! | GET | `/api/complaints/{id}` | Owner or official | Complaint with images |
//! | PATCH | `/api/complaints/{id}/status` | Official | Change status |
//! | PATCH | `/api/complaints/{id}/assign` | Admin | Assign to an official |
//! | POST | `/api/complaints/{id}/images` | Owner or official | Attach images (multipart) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{ComplaintImageService, ComplaintService};
