use crate::core::error::Result;
use crate::features::auth::guards::RequireCitizen;
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::types::ApiResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Current session retrieved successfully", body = ApiResponse<AuthenticatedUser>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_session(
    RequireCitizen(user): RequireCitizen,
) -> Result<Json<ApiResponse<AuthenticatedUser>>> {
    Ok(Json(ApiResponse::success(Some(user), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::profiles::models::UserRole;
    use crate::shared::test_helpers::with_user;
    use axum::{routing::get, Router};
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_session_reflects_profile_role() {
        let router = Router::new().route("/api/auth/session", get(get_session));
        let router = with_user(router, AuthenticatedUser::new("official-7", UserRole::Official));
        let server = TestServer::new(router).unwrap();

        let response = server.get("/api/auth/session").await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["data"]["sub"], "official-7");
        assert_eq!(body["data"]["role"], "official");
    }
}
