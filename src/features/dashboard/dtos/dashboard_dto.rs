use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Counts shown on the dashboard and returned by `/api/stats`
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct DashboardStatsDto {
    pub total_reports: i64,
    pub lost_reports: i64,
    pub found_reports: i64,
    pub catalog_items: i64,
    pub total_invoices: i64,
    /// Reports dated today
    pub today_lost: i64,
    pub today_found: i64,
    /// Invoices dated today
    pub today_invoices: i64,
}
