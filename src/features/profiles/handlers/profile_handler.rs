use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::{RequireAdmin, RequireSuperAdmin};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::profiles::dtos::{
    ProfileQueryParams, ProfileResponseDto, UpdateProfileDto, UpdateRoleDto,
};
use crate::features::profiles::services::ProfileService;
use crate::shared::types::{ApiResponse, Meta};

/// Get the current user's profile
#[utoipa::path(
    get,
    path = "/api/profiles/me",
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<ProfileResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "profiles",
    security(("bearer_auth" = []))
)]
pub async fn get_my_profile(
    user: AuthenticatedUser,
    State(service): State<Arc<ProfileService>>,
) -> Result<Json<ApiResponse<ProfileResponseDto>>> {
    let profile = service.get(&user.sub).await?;
    Ok(Json(ApiResponse::success(Some(profile), None, None)))
}

/// Update the current user's profile
#[utoipa::path(
    patch,
    path = "/api/profiles/me",
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated successfully", body = ApiResponse<ProfileResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "profiles",
    security(("bearer_auth" = []))
)]
pub async fn update_my_profile(
    user: AuthenticatedUser,
    State(service): State<Arc<ProfileService>>,
    AppJson(dto): AppJson<UpdateProfileDto>,
) -> Result<Json<ApiResponse<ProfileResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let profile = service.update_me(&user.sub, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(profile),
        Some("Profile updated successfully".to_string()),
        None,
    )))
}

/// List officials available for assignment
#[utoipa::path(
    get,
    path = "/api/officials",
    responses(
        (status = 200, description = "Officials", body = ApiResponse<Vec<ProfileResponseDto>>),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "profiles",
    security(("bearer_auth" = []))
)]
pub async fn list_officials(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProfileService>>,
) -> Result<Json<ApiResponse<Vec<ProfileResponseDto>>>> {
    let officials = service.list_officials().await?;
    let total = officials.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(officials),
        None,
        Some(Meta { total }),
    )))
}

/// List users
#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(ProfileQueryParams),
    responses(
        (status = 200, description = "Users", body = ApiResponse<Vec<ProfileResponseDto>>),
        (status = 403, description = "Forbidden - Super admin access required")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    RequireSuperAdmin(_user): RequireSuperAdmin,
    State(service): State<Arc<ProfileService>>,
    Query(params): Query<ProfileQueryParams>,
) -> Result<Json<ApiResponse<Vec<ProfileResponseDto>>>> {
    let (users, total) = service.list_users(&params).await?;
    Ok(Json(ApiResponse::success(
        Some(users),
        None,
        Some(Meta { total }),
    )))
}

/// Change a user's role
#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}/role",
    params(("id" = String, Path, description = "Profile ID")),
    request_body = UpdateRoleDto,
    responses(
        (status = 200, description = "Role updated", body = ApiResponse<ProfileResponseDto>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Profile not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn update_user_role(
    RequireSuperAdmin(user): RequireSuperAdmin,
    State(service): State<Arc<ProfileService>>,
    Path(id): Path<String>,
    AppJson(dto): AppJson<UpdateRoleDto>,
) -> Result<Json<ApiResponse<ProfileResponseDto>>> {
    let profile = service.update_role(&user, &id, dto.role).await?;
    Ok(Json(ApiResponse::success(
        Some(profile),
        Some("Role updated successfully".to_string()),
        None,
    )))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = String, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Profile not found")
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    RequireSuperAdmin(user): RequireSuperAdmin,
    State(service): State<Arc<ProfileService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete_user(&user, &id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("User deleted successfully".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use crate::features::profiles::models::UserRole;
    use crate::features::profiles::{routes, ProfileService};
    use crate::features::realtime::ChangeFeed;
    use crate::shared::test_helpers::{create_user, lazy_pool, with_user};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;
    use std::sync::Arc;

    fn server(role: UserRole) -> TestServer {
        let service = Arc::new(ProfileService::new(
            lazy_pool(),
            Arc::new(ChangeFeed::default()),
        ));
        TestServer::new(with_user(routes::routes(service), create_user(role))).unwrap()
    }

    #[tokio::test]
    async fn test_user_management_requires_super_admin() {
        let server = server(UserRole::Admin);

        server
            .get("/api/admin/users")
            .await
            .assert_status(StatusCode::FORBIDDEN);
        server
            .delete("/api/admin/users/someone")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_officials_list_requires_admin() {
        server(UserRole::Official)
            .get("/api/officials")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_update_profile_rejects_invalid_phone() {
        let response = server(UserRole::Citizen)
            .patch("/api/profiles/me")
            .json(&json!({ "phone": "not a number" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_super_admin_cannot_delete_self() {
        let user = create_user(UserRole::SuperAdmin);
        let path = format!("/api/admin/users/{}", user.sub);

        server(UserRole::SuperAdmin)
            .delete(&path)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_super_admin_cannot_demote_self() {
        let user = create_user(UserRole::SuperAdmin);
        let path = format!("/api/admin/users/{}/role", user.sub);

        server(UserRole::SuperAdmin)
            .patch(&path)
            .json(&json!({ "role": "citizen" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
