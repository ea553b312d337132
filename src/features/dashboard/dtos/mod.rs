mod dashboard_dto;

pub use dashboard_dto::{
    DashboardSummaryDto, MapPointDto, MonthlyTrendDto, StatusCountsDto,
};
