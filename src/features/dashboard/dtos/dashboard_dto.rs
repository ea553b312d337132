use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::complaints::models::ComplaintStatus;

/// Complaint counts per status
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatusCountsDto {
    pub pending: i64,
    pub in_progress: i64,
    pub resolved: i64,
    pub rejected: i64,
}

/// Headline statistics for the public dashboard
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardSummaryDto {
    pub total_complaints: i64,
    pub by_status: StatusCountsDto,
    /// Complaint count per submitted category
    pub by_category: BTreeMap<String, i64>,
}

/// Complaints filed in one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyTrendDto {
    /// Short month name, e.g. "Mar"
    pub month: String,
    /// First day of the month
    pub month_start: NaiveDate,
    pub total: i64,
    pub resolved: i64,
}

/// One complaint plotted on the public map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MapPointDto {
    pub id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub status: ComplaintStatus,
    pub category: String,
}
