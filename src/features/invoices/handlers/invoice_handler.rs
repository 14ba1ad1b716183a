use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::Principal;
use crate::features::invoices::dtos::{
    CreateInvoiceDto, InvoiceResponseDto, UpdateInvoiceStatusDto,
};
use crate::features::invoices::models::InvoiceStats;
use crate::features::invoices::services::InvoiceService;
use crate::shared::types::{ApiResponse, Meta};

pub const INVOICE_ISSUED: &str = "Invoice generated successfully!";

/// List invoices, newest first
#[utoipa::path(
    get,
    path = "/api/invoices",
    responses(
        (status = 200, description = "Invoices retrieved successfully", body = ApiResponse<Vec<InvoiceResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "invoices"
)]
pub async fn list_invoices(
    _principal: Principal,
    State(invoices): State<Arc<InvoiceService>>,
) -> Result<Json<ApiResponse<Vec<InvoiceResponseDto>>>> {
    let list = invoices.list().await?;
    let total = list.len() as i64;
    let data: Vec<InvoiceResponseDto> = list.into_iter().map(Into::into).collect();

    Ok(Json(ApiResponse::success(
        Some(data),
        None,
        Some(Meta { total }),
    )))
}

/// Invoice totals: count, revenue of non-cancelled invoices, and this month's count
#[utoipa::path(
    get,
    path = "/api/invoices/stats",
    responses(
        (status = 200, description = "Invoice statistics", body = ApiResponse<InvoiceStats>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "invoices"
)]
pub async fn invoice_stats(
    _principal: Principal,
    State(invoices): State<Arc<InvoiceService>>,
) -> Result<Json<ApiResponse<InvoiceStats>>> {
    let stats = invoices.stats(Utc::now().date_naive()).await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

/// Get a single invoice
#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    params(
        ("id" = i64, Path, description = "Invoice ID")
    ),
    responses(
        (status = 200, description = "Invoice retrieved successfully", body = ApiResponse<InvoiceResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Invoice not found")
    ),
    tag = "invoices"
)]
pub async fn get_invoice(
    _principal: Principal,
    State(invoices): State<Arc<InvoiceService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<InvoiceResponseDto>>> {
    let invoice = invoices.get(id).await?;
    Ok(Json(ApiResponse::success(Some(invoice.into()), None, None)))
}

/// Issue an invoice for a found report (admin only)
#[utoipa::path(
    post,
    path = "/api/invoices",
    request_body = CreateInvoiceDto,
    responses(
        (status = 201, description = "Invoice issued", body = ApiResponse<InvoiceResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin privileges required"),
        (status = 422, description = "Report does not exist")
    ),
    tag = "invoices"
)]
pub async fn create_invoice(
    RequireAdmin(admin): RequireAdmin,
    State(invoices): State<Arc<InvoiceService>>,
    AppJson(dto): AppJson<CreateInvoiceDto>,
) -> Result<(StatusCode, Json<ApiResponse<InvoiceResponseDto>>)> {
    let data = dto.into_create()?;
    let invoice = invoices.create(&data, Some(admin.id)).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(invoice.into()),
            Some(INVOICE_ISSUED.to_string()),
            None,
        )),
    ))
}

/// Move an invoice to another status (admin only)
#[utoipa::path(
    patch,
    path = "/api/invoices/{id}/status",
    params(
        ("id" = i64, Path, description = "Invoice ID")
    ),
    request_body = UpdateInvoiceStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<InvoiceResponseDto>),
        (status = 400, description = "Transition not allowed"),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Invoice not found")
    ),
    tag = "invoices"
)]
pub async fn update_invoice_status(
    RequireAdmin(_admin): RequireAdmin,
    State(invoices): State<Arc<InvoiceService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateInvoiceStatusDto>,
) -> Result<Json<ApiResponse<InvoiceResponseDto>>> {
    let next = dto.parse()?;
    let invoice = invoices.update_status(id, next).await?;

    Ok(Json(ApiResponse::success(
        Some(invoice.into()),
        Some(format!("Invoice marked as {}", next)),
        None,
    )))
}
