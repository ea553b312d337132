use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::error::AppError;
use crate::features::dashboard::dtos::{DashboardSummaryDto, MapPointDto, MonthlyTrendDto};
use crate::features::dashboard::services::DashboardService;
use crate::shared::types::{ApiResponse, Meta};

/// Get complaint totals by status and category
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Dashboard summary", body = ApiResponse<DashboardSummaryDto>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_summary(
    State(service): State<Arc<DashboardService>>,
) -> Result<Json<ApiResponse<DashboardSummaryDto>>, AppError> {
    let summary = service.get_summary().await?;
    Ok(Json(ApiResponse::success(Some(summary), None, None)))
}

/// Get monthly filed and resolved counts, oldest month first
#[utoipa::path(
    get,
    path = "/api/dashboard/trend",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Monthly trend", body = ApiResponse<Vec<MonthlyTrendDto>>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_trend(
    State(service): State<Arc<DashboardService>>,
) -> Result<Json<ApiResponse<Vec<MonthlyTrendDto>>>, AppError> {
    let trend = service.get_trend().await?;
    Ok(Json(ApiResponse::success(Some(trend), None, None)))
}

/// Get map points for complaints with known coordinates
#[utoipa::path(
    get,
    path = "/api/dashboard/map",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Map points", body = ApiResponse<Vec<MapPointDto>>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_map(
    State(service): State<Arc<DashboardService>>,
) -> Result<Json<ApiResponse<Vec<MapPointDto>>>, AppError> {
    let points = service.get_map().await?;
    let total = points.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(points),
        None,
        Some(Meta { total }),
    )))
}
