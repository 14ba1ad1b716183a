use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::model::Principal;
use crate::features::reports::dtos::{ReportRequestDto, ReportResponseDto, SearchFilters};
use crate::features::reports::services::{ReportService, SearchService};
use crate::shared::types::{ApiResponse, Meta};

/// List all reports, newest first
#[utoipa::path(
    get,
    path = "/api/reports",
    responses(
        (status = 200, description = "Reports retrieved successfully", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "reports"
)]
pub async fn list_reports(
    _principal: Principal,
    State(search): State<Arc<SearchService>>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let reports = search.search(&SearchFilters::default()).await?;
    let total = reports.len() as i64;
    let data: Vec<ReportResponseDto> = reports.into_iter().map(Into::into).collect();

    Ok(Json(ApiResponse::success(
        Some(data),
        None,
        Some(Meta { total }),
    )))
}

/// Get a single report
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(
        ("id" = i64, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report retrieved successfully", body = ApiResponse<ReportResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Report not found")
    ),
    tag = "reports"
)]
pub async fn get_report(
    _principal: Principal,
    State(reports): State<Arc<ReportService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = reports.get(id).await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Report a lost or found item. The item must already exist in the catalog.
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = ReportRequestDto,
    responses(
        (status = 201, description = "Report created", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Catalog item does not exist")
    ),
    tag = "reports"
)]
pub async fn create_report(
    principal: Principal,
    State(reports): State<Arc<ReportService>>,
    AppJson(dto): AppJson<ReportRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<ReportResponseDto>>)> {
    let data = dto.into_create()?;
    let report = reports.submit(&data, Some(principal.id)).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(report.into()),
            Some("Item reported successfully!".to_string()),
            None,
        )),
    ))
}
