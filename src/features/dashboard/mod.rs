//! Public complaint statistics.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/dashboard/summary` | No | Totals per status and per category |
//! | GET | `/api/dashboard/trend` | No | Filed and resolved counts for the last 6 months |
//! | GET | `/api/dashboard/map` | No | Complaint coordinates for the map |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::DashboardService;
