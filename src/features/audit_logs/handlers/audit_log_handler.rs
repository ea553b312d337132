use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::core::error::Result;
use crate::features::audit_logs::dtos::{AuditLogQueryParams, AuditLogResponseDto};
use crate::features::audit_logs::services::AuditLogService;
use crate::features::auth::guards::RequireSuperAdmin;
use crate::shared::types::{ApiResponse, Meta};

/// List audit log entries
#[utoipa::path(
    get,
    path = "/api/admin/audit-logs",
    params(AuditLogQueryParams),
    responses(
        (status = 200, description = "Audit log entries", body = ApiResponse<Vec<AuditLogResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Super admin access required")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn list_audit_logs(
    RequireSuperAdmin(_user): RequireSuperAdmin,
    State(service): State<Arc<AuditLogService>>,
    Query(params): Query<AuditLogQueryParams>,
) -> Result<Json<ApiResponse<Vec<AuditLogResponseDto>>>> {
    let (entries, total) = service.list(&params).await?;
    Ok(Json(ApiResponse::success(
        Some(entries),
        None,
        Some(Meta { total }),
    )))
}

#[cfg(test)]
mod tests {
    use crate::features::audit_logs::{routes, AuditLogService};
    use crate::features::profiles::models::UserRole;
    use crate::shared::test_helpers::{create_user, lazy_pool, with_super_admin_auth, with_user};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use std::sync::Arc;

    fn router() -> axum::Router {
        routes::routes(Arc::new(AuditLogService::new(lazy_pool())))
    }

    #[tokio::test]
    async fn test_admin_cannot_read_audit_trail() {
        let server = TestServer::new(with_user(router(), create_user(UserRole::Admin))).unwrap();
        server
            .get("/api/admin/audit-logs")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_super_admin_bad_page_is_rejected() {
        let server = TestServer::new(with_super_admin_auth(router())).unwrap();
        server
            .get("/api/admin/audit-logs")
            .add_query_param("page", "first")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
