use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::complaints::models::ComplaintStatus;
use crate::features::dashboard::dtos::{
    DashboardSummaryDto, MapPointDto, MonthlyTrendDto, StatusCountsDto,
};
use crate::shared::constants::TREND_MONTHS;
use crate::shared::validation::parse_coordinates;

#[derive(Debug, FromRow)]
struct MonthRow {
    month_start: NaiveDate,
    total: i64,
    resolved: i64,
}

#[derive(Debug, FromRow)]
struct LocationRow {
    id: Uuid,
    location: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    status: ComplaintStatus,
    category: String,
}

/// Service for public dashboard queries
pub struct DashboardService {
    pool: PgPool,
}

impl DashboardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Total, per-status and per-category counts
    pub async fn get_summary(&self) -> Result<DashboardSummaryDto> {
        let (total, pending, in_progress, resolved, rejected): (i64, i64, i64, i64, i64) =
            sqlx::query_as(
                "SELECT
                    COUNT(*),
                    COUNT(*) FILTER (WHERE status = 'pending'),
                    COUNT(*) FILTER (WHERE status = 'in-progress'),
                    COUNT(*) FILTER (WHERE status = 'resolved'),
                    COUNT(*) FILTER (WHERE status = 'rejected')
                 FROM complaints",
            )
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get status counts: {:?}", e);
                AppError::Database(e)
            })?;

        let categories: Vec<(String, i64)> = sqlx::query_as(
            "SELECT category, COUNT(*) FROM complaints GROUP BY category ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category counts: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(DashboardSummaryDto {
            total_complaints: total,
            by_status: StatusCountsDto {
                pending,
                in_progress,
                resolved,
                rejected,
            },
            by_category: categories.into_iter().collect(),
        })
    }

    /// Filed and resolved counts for the last calendar months, oldest first
    pub async fn get_trend(&self) -> Result<Vec<MonthlyTrendDto>> {
        let months = trend_months(Utc::now().date_naive(), TREND_MONTHS);
        let Some(&since) = months.first() else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query_as::<_, MonthRow>(
            "SELECT
                date_trunc('month', created_at)::date AS month_start,
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'resolved') AS resolved
             FROM complaints
             WHERE created_at >= $1
             GROUP BY 1",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get monthly trend: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(fill_trend(&months, rows))
    }

    /// Plottable complaints; rows without usable coordinates are skipped
    pub async fn get_map(&self) -> Result<Vec<MapPointDto>> {
        let rows = sqlx::query_as::<_, LocationRow>(
            "SELECT id, location, latitude, longitude, status, category
             FROM complaints
             ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch map data: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows.into_iter().filter_map(map_point).collect())
    }
}

/// First day of each of the `count` months ending with the month of `today`
fn trend_months(today: NaiveDate, count: u32) -> Vec<NaiveDate> {
    let Some(current) = today.with_day(1) else {
        return Vec::new();
    };

    (0..count)
        .rev()
        .filter_map(|back| current.checked_sub_months(Months::new(back)))
        .collect()
}

/// Months without complaints are reported as zero
fn fill_trend(months: &[NaiveDate], rows: Vec<MonthRow>) -> Vec<MonthlyTrendDto> {
    let counts: HashMap<NaiveDate, (i64, i64)> = rows
        .into_iter()
        .map(|r| (r.month_start, (r.total, r.resolved)))
        .collect();

    months
        .iter()
        .map(|&month_start| {
            let (total, resolved) = counts.get(&month_start).copied().unwrap_or_default();
            MonthlyTrendDto {
                month: month_start.format("%b").to_string(),
                month_start,
                total,
                resolved,
            }
        })
        .collect()
}

/// Stored coordinates first, then a "lat,lng" location string
fn map_point(row: LocationRow) -> Option<MapPointDto> {
    let (latitude, longitude) = match (row.latitude, row.longitude) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => parse_coordinates(&row.location)?,
    };

    Some(MapPointDto {
        id: row.id,
        latitude,
        longitude,
        status: row.status,
        category: row.category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_trend_months_cross_year_boundary() {
        let months = trend_months(date(2026, 2, 17), 6);
        assert_eq!(
            months,
            vec![
                date(2025, 9, 1),
                date(2025, 10, 1),
                date(2025, 11, 1),
                date(2025, 12, 1),
                date(2026, 1, 1),
                date(2026, 2, 1),
            ]
        );
    }

    #[test]
    fn test_fill_trend_zeroes_empty_months() {
        let months = trend_months(date(2026, 3, 31), 3);
        let rows = vec![MonthRow {
            month_start: date(2026, 2, 1),
            total: 4,
            resolved: 1,
        }];

        let trend = fill_trend(&months, rows);
        assert_eq!(trend.len(), 3);
        assert_eq!(trend[0].month, "Jan");
        assert_eq!((trend[0].total, trend[0].resolved), (0, 0));
        assert_eq!(trend[1].month, "Feb");
        assert_eq!((trend[1].total, trend[1].resolved), (4, 1));
        assert_eq!(trend[2].month_start, date(2026, 3, 1));
    }

    fn row(location: &str, latitude: Option<f64>, longitude: Option<f64>) -> LocationRow {
        LocationRow {
            id: Uuid::now_v7(),
            location: location.to_string(),
            latitude,
            longitude,
            status: ComplaintStatus::Pending,
            category: "roads".to_string(),
        }
    }

    #[test]
    fn test_map_point_prefers_stored_coordinates() {
        let point = map_point(row("1.0,2.0", Some(12.9), Some(77.6))).unwrap();
        assert_eq!((point.latitude, point.longitude), (12.9, 77.6));
    }

    #[test]
    fn test_map_point_falls_back_to_location_string() {
        let point = map_point(row("-6.2088, 106.8456", None, None)).unwrap();
        assert_eq!((point.latitude, point.longitude), (-6.2088, 106.8456));
    }

    #[test]
    fn test_map_point_skips_unparseable_rows() {
        assert!(map_point(row("Near the old market", None, None)).is_none());
        assert!(map_point(row("95.0,10.0", Some(1.0), None)).is_none());
    }
}
