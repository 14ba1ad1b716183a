use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::admin::dtos::{AdminUserDto, RecordsOverviewDto, ResetPasswordDto, SetAdminDto};
use crate::features::admin::services::AdminService;
use crate::features::auth::guards::RequireAdmin;
use crate::shared::types::{ApiResponse, Meta};

/// List all accounts
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "List of accounts", body = ApiResponse<Vec<AdminUserDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin privileges required")
    ),
    tag = "admin"
)]
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
) -> Result<Json<ApiResponse<Vec<AdminUserDto>>>> {
    let users = service.users().await?;
    let total = users.len() as i64;
    let data: Vec<AdminUserDto> = users.into_iter().map(Into::into).collect();

    Ok(Json(ApiResponse::success(
        Some(data),
        None,
        Some(Meta { total }),
    )))
}

/// Grant or revoke the admin flag of an account
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/admin",
    params(
        ("id" = Uuid, Path, description = "Account ID")
    ),
    request_body = SetAdminDto,
    responses(
        (status = 200, description = "Admin flag updated", body = ApiResponse<AdminUserDto>),
        (status = 400, description = "An admin cannot revoke their own flag"),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Account not found")
    ),
    tag = "admin"
)]
pub async fn set_admin(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<SetAdminDto>,
) -> Result<Json<ApiResponse<AdminUserDto>>> {
    let user = service.set_admin(&admin, id, dto.is_admin).await?;
    let message = if user.is_admin {
        format!("{} is now an admin", user.username)
    } else {
        format!("{} is no longer an admin", user.username)
    };

    Ok(Json(ApiResponse::success(
        Some(user.into()),
        Some(message),
        None,
    )))
}

/// Reset the password of an account and sign it out everywhere
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/password",
    params(
        ("id" = Uuid, Path, description = "Account ID")
    ),
    request_body = ResetPasswordDto,
    responses(
        (status = 200, description = "Password reset", body = ApiResponse<AdminUserDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Account not found")
    ),
    tag = "admin"
)]
pub async fn reset_password(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<ResetPasswordDto>,
) -> Result<Json<ApiResponse<AdminUserDto>>> {
    let user = service.reset_password(&admin, id, &dto).await?;
    let message = format!("Password for {} has been reset", user.username);

    Ok(Json(ApiResponse::success(
        Some(user.into()),
        Some(message),
        None,
    )))
}

/// Records overview: catalog items with report counts, latest reports and invoices
#[utoipa::path(
    get,
    path = "/api/admin/records",
    responses(
        (status = 200, description = "Records overview", body = ApiResponse<RecordsOverviewDto>),
        (status = 403, description = "Admin privileges required")
    ),
    tag = "admin"
)]
pub async fn records_overview(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
) -> Result<Json<ApiResponse<RecordsOverviewDto>>> {
    let overview = service.records_overview().await?;
    Ok(Json(ApiResponse::success(Some(overview), None, None)))
}
