//! Append-only audit trail of complaint and profile mutations.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/admin/audit-logs` | Super admin | Paginated audit entries, optional `table_name` filter |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::AuditLogService;
