use axum::{extract::State, response::Response, Json};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use minijinja::context;
use std::sync::Arc;

use crate::core::error::{PageResult, Result};
use crate::features::auth::model::Principal;
use crate::features::dashboard::dtos::DashboardStatsDto;
use crate::features::dashboard::services::DashboardService;
use crate::features::reports::ReportService;
use crate::shared::constants::RECENT_REPORTS_LIMIT;
use crate::shared::templates::page;
use crate::shared::types::ApiResponse;

/// Dashboard statistics
#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Dashboard statistics", body = ApiResponse<DashboardStatsDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "dashboard"
)]
pub async fn get_stats(
    _principal: Principal,
    State(dashboard): State<Arc<DashboardService>>,
) -> Result<Json<ApiResponse<DashboardStatsDto>>> {
    let stats = dashboard.stats(Utc::now().date_naive()).await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

/// `GET /dashboard`
pub async fn dashboard_page(
    jar: CookieJar,
    principal: Principal,
    State(dashboard): State<Arc<DashboardService>>,
    State(reports): State<Arc<ReportService>>,
) -> PageResult<Response> {
    let stats = dashboard.stats(Utc::now().date_naive()).await?;
    let recent = reports.recent(RECENT_REPORTS_LIMIT).await?;

    Ok(page(
        jar,
        Some(&principal),
        "dashboard.html",
        context! {
            stats => stats,
            recent_reports => recent,
        },
    ))
}
