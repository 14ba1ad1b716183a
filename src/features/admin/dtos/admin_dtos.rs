use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::catalog::models::CatalogItemSummary;
use crate::features::invoices::dtos::InvoiceResponseDto;
use crate::features::reports::dtos::ReportResponseDto;
use crate::features::users::models::User;
use crate::shared::types::deserialize_flag;

/// An account as listed on the administration page. The password hash never leaves the service.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminUserDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for AdminUserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

/// Grant or revoke the admin flag
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetAdminDto {
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_admin: bool,
}

/// New password for another account, held to the registration rules
#[derive(Debug, Default, Clone, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordDto {
    #[serde(default, alias = "new_password")]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[serde(default, rename = "confirmPassword", alias = "confirm_password")]
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

/// Catalog items with their report counts, plus the latest reports and invoices
#[derive(Debug, Serialize, ToSchema)]
pub struct RecordsOverviewDto {
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<CatalogItemSummary>,
    pub reports: Vec<ReportResponseDto>,
    pub invoices: Vec<InvoiceResponseDto>,
}
