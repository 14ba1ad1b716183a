use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use minijinja::context;
use std::sync::Arc;

use crate::core::error::PageResult;
use crate::core::extractor::{AppPayload, ResponseMode};
use crate::features::auth::guards::RequireAdmin;
use crate::features::catalog::dtos::{CatalogItemResponseDto, CreateCatalogItemDto};
use crate::features::catalog::models::{CatalogItem, ItemCategory};
use crate::features::catalog::services::CatalogService;
use crate::shared::flash::{self, Flash};
use crate::shared::templates::{form_failure, page};
use crate::shared::types::ApiResponse;

fn categories() -> Vec<&'static str> {
    ItemCategory::ALL.iter().map(|c| c.as_str()).collect()
}

/// `GET /create-item`
pub async fn create_item_page(
    jar: CookieJar,
    RequireAdmin(admin): RequireAdmin,
    State(catalog): State<Arc<CatalogService>>,
) -> PageResult<Response> {
    let items = catalog.list().await?;

    Ok(page(
        jar,
        Some(&admin),
        "create_item.html",
        context! {
            categories => categories(),
            items => items,
            form => CreateCatalogItemDto::default(),
        },
    ))
}

/// `POST /create-item`
pub async fn submit_item(
    mode: ResponseMode,
    jar: CookieJar,
    RequireAdmin(admin): RequireAdmin,
    State(catalog): State<Arc<CatalogService>>,
    AppPayload(dto): AppPayload<CreateCatalogItemDto>,
) -> Response {
    let result = match dto.clone().into_create(Some(admin.id)) {
        Ok(data) => catalog.create(&data).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(item) => {
            let message = format!("Item '{}' created successfully!", item.name);
            if mode.is_json() {
                let body = ApiResponse::success(
                    Some(CatalogItemResponseDto::from(item)),
                    Some(message),
                    None,
                );
                (StatusCode::CREATED, Json(body)).into_response()
            } else {
                (
                    flash::push(jar, Flash::success(message)),
                    Redirect::to("/create-item"),
                )
                    .into_response()
            }
        }
        Err(e) => {
            let items: Vec<CatalogItem> = catalog.list().await.unwrap_or_else(|err| {
                tracing::error!("Failed to list catalog items: {}", err);
                Vec::new()
            });
            form_failure(
                mode,
                jar,
                Some(&admin),
                "create_item.html",
                context! { categories => categories(), items => items, form => dto },
                e,
            )
        }
    }
}
