use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::Principal;
use crate::features::catalog::dtos::{
    CatalogItemDetailDto, CatalogItemResponseDto, CreateCatalogItemDto, UpdateCatalogItemDto,
};
use crate::features::catalog::services::CatalogService;
use crate::features::reports::services::ReportService;
use crate::shared::types::{ApiResponse, Meta};

/// List catalog items, most recently added first
#[utoipa::path(
    get,
    path = "/api/items",
    responses(
        (status = 200, description = "Catalog items retrieved successfully", body = ApiResponse<Vec<CatalogItemResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "catalog"
)]
pub async fn list_items(
    _principal: Principal,
    State(catalog): State<Arc<CatalogService>>,
) -> Result<Json<ApiResponse<Vec<CatalogItemResponseDto>>>> {
    let items = catalog.list().await?;
    let total = items.len() as i64;
    let data: Vec<CatalogItemResponseDto> = items.into_iter().map(Into::into).collect();

    Ok(Json(ApiResponse::success(
        Some(data),
        None,
        Some(Meta { total }),
    )))
}

/// Get a catalog item together with every report filed against it
#[utoipa::path(
    get,
    path = "/api/items/{name}",
    params(
        ("name" = String, Path, description = "Catalog item name")
    ),
    responses(
        (status = 200, description = "Catalog item retrieved successfully", body = ApiResponse<CatalogItemDetailDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Catalog item not found")
    ),
    tag = "catalog"
)]
pub async fn get_item(
    _principal: Principal,
    State(catalog): State<Arc<CatalogService>>,
    State(reports): State<Arc<ReportService>>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<CatalogItemDetailDto>>> {
    let item = catalog.get(&name).await?;
    let reports = reports.for_item(&item.name).await?;

    let detail = CatalogItemDetailDto {
        item: item.into(),
        reports: reports.into_iter().map(Into::into).collect(),
    };

    Ok(Json(ApiResponse::success(Some(detail), None, None)))
}

/// Add an item to the catalog (admin only)
#[utoipa::path(
    post,
    path = "/api/items",
    request_body = CreateCatalogItemDto,
    responses(
        (status = 201, description = "Catalog item created", body = ApiResponse<CatalogItemResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin privileges required"),
        (status = 409, description = "An item with this name already exists")
    ),
    tag = "catalog"
)]
pub async fn create_item(
    RequireAdmin(admin): RequireAdmin,
    State(catalog): State<Arc<CatalogService>>,
    AppJson(dto): AppJson<CreateCatalogItemDto>,
) -> Result<(StatusCode, Json<ApiResponse<CatalogItemResponseDto>>)> {
    let data = dto.into_create(Some(admin.id))?;
    let item = catalog.create(&data).await?;
    let message = format!("Item '{}' created successfully!", item.name);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(item.into()), Some(message), None)),
    ))
}

/// Update the non-key fields of a catalog item (admin only)
#[utoipa::path(
    put,
    path = "/api/items/{name}",
    params(
        ("name" = String, Path, description = "Catalog item name")
    ),
    request_body = UpdateCatalogItemDto,
    responses(
        (status = 200, description = "Catalog item updated", body = ApiResponse<CatalogItemResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Catalog item not found")
    ),
    tag = "catalog"
)]
pub async fn update_item(
    RequireAdmin(_admin): RequireAdmin,
    State(catalog): State<Arc<CatalogService>>,
    Path(name): Path<String>,
    AppJson(dto): AppJson<UpdateCatalogItemDto>,
) -> Result<Json<ApiResponse<CatalogItemResponseDto>>> {
    let data = dto.into_update()?;
    let item = catalog.update(&name, &data).await?;

    Ok(Json(ApiResponse::success(
        Some(item.into()),
        Some("Item updated successfully".to_string()),
        None,
    )))
}

/// Remove a catalog item (admin only). Refused while reports still reference it.
#[utoipa::path(
    delete,
    path = "/api/items/{name}",
    params(
        ("name" = String, Path, description = "Catalog item name")
    ),
    responses(
        (status = 200, description = "Catalog item deleted"),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Catalog item not found"),
        (status = 409, description = "Item is still referenced by reports")
    ),
    tag = "catalog"
)]
pub async fn delete_item(
    RequireAdmin(_admin): RequireAdmin,
    State(catalog): State<Arc<CatalogService>>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    catalog.delete(&name).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some("Item deleted successfully".to_string()),
        None,
    )))
}
