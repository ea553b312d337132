//! Profiles: one record per identity platform subject, carrying the caller's role.
//!
//! A citizen profile is created on the first authenticated request. Roles are
//! managed by super admins only.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/profiles/me` | Yes | Current user's profile |
//! | PATCH | `/api/profiles/me` | Yes | Update name, avatar, phone, language |
//! | GET | `/api/officials` | Admin | Officials available for assignment |
//! | GET | `/api/admin/users` | Super admin | List profiles |
//! | PATCH | `/api/admin/users/{id}/role` | Super admin | Change a user's role |
//! | DELETE | `/api/admin/users/{id}` | Super admin | Delete a user's profile |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::ProfileService;
