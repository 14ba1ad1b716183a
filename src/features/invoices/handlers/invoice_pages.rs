use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use minijinja::{context, Value};
use std::sync::Arc;

use crate::core::error::{AppError, PageResult};
use crate::core::extractor::{AppPayload, ResponseMode};
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::Principal;
use crate::features::invoices::dtos::{CreateInvoiceDto, InvoiceResponseDto};
use crate::features::invoices::handlers::invoice_handler::INVOICE_ISSUED;
use crate::features::invoices::models::InvoiceStatus;
use crate::features::invoices::services::InvoiceService;
use crate::features::reports::models::ReportStatus;
use crate::features::reports::ReportService;
use crate::shared::flash::{self, Flash};
use crate::shared::templates::{form_failure, page};
use crate::shared::types::ApiResponse;

/// Everything the invoice page shows besides the form
async fn invoice_context(
    invoices: &InvoiceService,
    reports: &ReportService,
    form: &CreateInvoiceDto,
) -> Result<Value, AppError> {
    let found_reports = reports.with_status(ReportStatus::Found).await?;
    let list = invoices.list().await?;
    let stats = invoices.stats(Utc::now().date_naive()).await?;
    let statuses: Vec<&str> = InvoiceStatus::ALL.iter().map(|s| s.as_str()).collect();

    Ok(context! {
        found_reports => found_reports,
        invoices => list,
        stats => stats,
        statuses => statuses,
        form => form,
    })
}

/// `GET /invoice`
pub async fn invoice_page(
    jar: CookieJar,
    principal: Principal,
    State(invoices): State<Arc<InvoiceService>>,
    State(reports): State<Arc<ReportService>>,
) -> PageResult<Response> {
    let ctx = invoice_context(&invoices, &reports, &CreateInvoiceDto::default()).await?;
    Ok(page(jar, Some(&principal), "invoice.html", ctx))
}

/// `POST /invoice` (admin only)
pub async fn submit_invoice(
    mode: ResponseMode,
    jar: CookieJar,
    RequireAdmin(admin): RequireAdmin,
    State(invoices): State<Arc<InvoiceService>>,
    State(reports): State<Arc<ReportService>>,
    AppPayload(dto): AppPayload<CreateInvoiceDto>,
) -> Response {
    let result = match dto.clone().into_create() {
        Ok(data) => invoices.create(&data, Some(admin.id)).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(invoice) if mode.is_json() => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                Some(InvoiceResponseDto::from(invoice)),
                Some(INVOICE_ISSUED.to_string()),
                None,
            )),
        )
            .into_response(),
        Ok(_) => (
            flash::push(jar, Flash::success(INVOICE_ISSUED)),
            Redirect::to("/invoice"),
        )
            .into_response(),
        Err(e) => {
            let ctx = match invoice_context(&invoices, &reports, &dto).await {
                Ok(ctx) => ctx,
                Err(load_err) => {
                    tracing::error!("Failed to reload the invoice page: {}", load_err);
                    context! { form => dto }
                }
            };
            form_failure(mode, jar, Some(&admin), "invoice.html", ctx, e)
        }
    }
}
