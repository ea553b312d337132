//! Complaint triage heuristic.
//!
//! Newly submitted complaints are categorized by keyword frequency and given a
//! priority from urgency terms. The prediction is written back onto the
//! complaint row and broadcast on the change feed.
//!
//! The heuristic is exposed as a standalone function endpoint and is also
//! dispatched in the background by the complaint service after every submission.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | OPTIONS | `/functions/v1/categorize-complaint` | No | CORS preflight |
//! | POST | `/functions/v1/categorize-complaint` | No | Categorize a complaint by id |

pub mod classifier;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::{TriageDispatcher, TriageService};
