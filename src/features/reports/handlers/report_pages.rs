use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use minijinja::context;
use std::sync::Arc;

use crate::core::error::PageResult;
use crate::core::extractor::{AppPayload, ResponseMode};
use crate::features::auth::model::Principal;
use crate::features::catalog::models::ItemCategory;
use crate::features::catalog::CatalogService;
use crate::features::reports::dtos::{
    ReportRequestDto, ReportResponseDto, SearchFilters, SearchQueryDto, SortKey,
};
use crate::features::reports::models::Report;
use crate::features::reports::services::{ReportService, SearchService};
use crate::shared::flash::{self, Flash};
use crate::shared::templates::{form_failure, page};
use crate::shared::types::ApiResponse;

const REPORTED: &str = "Item reported successfully!";

fn category_names() -> Vec<&'static str> {
    ItemCategory::ALL.iter().map(|c| c.as_str()).collect()
}

fn sort_keys() -> Vec<&'static str> {
    SortKey::ALL.iter().map(|k| k.as_str()).collect()
}

async fn item_names(catalog: &CatalogService) -> Vec<String> {
    catalog.names().await.unwrap_or_else(|e| {
        tracing::error!("Failed to load catalog names for the report form: {}", e);
        Vec::new()
    })
}

/// `GET /report`
pub async fn report_page(
    jar: CookieJar,
    principal: Principal,
    State(catalog): State<Arc<CatalogService>>,
) -> PageResult<Response> {
    let names = catalog.names().await?;

    Ok(page(
        jar,
        Some(&principal),
        "report.html",
        context! {
            item_names => names,
            form => ReportRequestDto::default(),
        },
    ))
}

/// `POST /report`, from the form or from script
pub async fn submit_report(
    mode: ResponseMode,
    jar: CookieJar,
    principal: Principal,
    State(reports): State<Arc<ReportService>>,
    State(catalog): State<Arc<CatalogService>>,
    AppPayload(dto): AppPayload<ReportRequestDto>,
) -> Response {
    let result = match dto.clone().into_create() {
        Ok(data) => reports.submit(&data, Some(principal.id)).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(report) if mode.is_json() => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                Some(ReportResponseDto::from(report)),
                Some(REPORTED.to_string()),
                None,
            )),
        )
            .into_response(),
        Ok(_) => (
            flash::push(jar, Flash::success(REPORTED)),
            Redirect::to("/report"),
        )
            .into_response(),
        Err(e) => {
            let names = item_names(&catalog).await;
            form_failure(
                mode,
                jar,
                Some(&principal),
                "report.html",
                context! { item_names => names, form => dto },
                e,
            )
        }
    }
}

/// `GET /search`
pub async fn search_page(
    jar: CookieJar,
    principal: Principal,
    State(search): State<Arc<SearchService>>,
    Query(query): Query<SearchQueryDto>,
) -> PageResult<Response> {
    let form = query.clone();

    let filters = match SearchFilters::try_from(query) {
        Ok(filters) => filters,
        Err(e) => {
            return Ok(form_failure(
                ResponseMode::Html,
                jar,
                Some(&principal),
                "search.html",
                context! {
                    query => form,
                    reports => Vec::<Report>::new(),
                    categories => category_names(),
                    sort_keys => sort_keys(),
                    sort => SortKey::default().as_str(),
                },
                e,
            ))
        }
    };

    let reports = search.search(&filters).await?;

    Ok(page(
        jar,
        Some(&principal),
        "search.html",
        context! {
            query => form,
            total => reports.len(),
            reports => reports,
            categories => category_names(),
            sort_keys => sort_keys(),
            sort => filters.sort.as_str(),
        },
    ))
}
