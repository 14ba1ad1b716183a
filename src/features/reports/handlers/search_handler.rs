use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::auth::model::Principal;
use crate::features::reports::dtos::{ReportResponseDto, SearchFilters, SearchQueryDto};
use crate::features::reports::services::SearchService;
use crate::shared::types::{ApiResponse, Meta};

/// Search reports by free text, category, status, date range and location
#[utoipa::path(
    get,
    path = "/api/search",
    params(SearchQueryDto),
    responses(
        (status = 200, description = "Matching reports", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 400, description = "Invalid filter value"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "search"
)]
pub async fn search_reports(
    _principal: Principal,
    State(search): State<Arc<SearchService>>,
    Query(query): Query<SearchQueryDto>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let filters = SearchFilters::try_from(query)?;
    let reports = search.search(&filters).await?;
    let total = reports.len() as i64;
    let data: Vec<ReportResponseDto> = reports.into_iter().map(Into::into).collect();

    Ok(Json(ApiResponse::success(
        Some(data),
        None,
        Some(Meta { total }),
    )))
}
