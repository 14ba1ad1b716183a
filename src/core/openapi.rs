use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::core::config::SessionConfig;
use crate::features::admin::{dtos as admin_dtos, handlers as admin_handlers};
use crate::features::auth::{dtos as auth_dtos, handlers as auth_handlers};
use crate::features::catalog::{
    dtos as catalog_dtos, handlers as catalog_handlers, models as catalog_models,
};
use crate::features::dashboard::{dtos as dashboard_dtos, handlers as dashboard_handlers};
use crate::features::invoices::{
    dtos as invoices_dtos, handlers as invoices_handlers, models as invoices_models,
};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::shared::types::{ApiResponse, FieldError, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth_handlers::register,
        auth_handlers::login,
        auth_handlers::logout,
        auth_handlers::me,
        // Catalog
        catalog_handlers::list_items,
        catalog_handlers::get_item,
        catalog_handlers::create_item,
        catalog_handlers::update_item,
        catalog_handlers::delete_item,
        // Reports
        reports_handlers::list_reports,
        reports_handlers::get_report,
        reports_handlers::create_report,
        reports_handlers::search_reports,
        // Invoices
        invoices_handlers::list_invoices,
        invoices_handlers::invoice_stats,
        invoices_handlers::get_invoice,
        invoices_handlers::create_invoice,
        invoices_handlers::update_invoice_status,
        // Dashboard
        dashboard_handlers::get_stats,
        // Admin
        admin_handlers::list_users,
        admin_handlers::set_admin,
        admin_handlers::reset_password,
        admin_handlers::records_overview,
    ),
    components(
        schemas(
            // Shared
            Meta,
            FieldError,
            // Auth
            auth_dtos::RegisterRequestDto,
            auth_dtos::LoginRequestDto,
            auth_dtos::AuthUserDto,
            auth_dtos::AuthResponseDto,
            ApiResponse<auth_dtos::AuthUserDto>,
            ApiResponse<auth_dtos::AuthResponseDto>,
            // Catalog
            catalog_models::ItemCategory,
            catalog_dtos::CreateCatalogItemDto,
            catalog_dtos::UpdateCatalogItemDto,
            catalog_dtos::CatalogItemResponseDto,
            catalog_dtos::CatalogItemDetailDto,
            ApiResponse<Vec<catalog_dtos::CatalogItemResponseDto>>,
            ApiResponse<catalog_dtos::CatalogItemResponseDto>,
            ApiResponse<catalog_dtos::CatalogItemDetailDto>,
            // Reports
            reports_models::ReportStatus,
            reports_dtos::SortKey,
            reports_dtos::ReportRequestDto,
            reports_dtos::ReportResponseDto,
            ApiResponse<Vec<reports_dtos::ReportResponseDto>>,
            ApiResponse<reports_dtos::ReportResponseDto>,
            // Invoices
            invoices_models::InvoiceStatus,
            invoices_models::InvoiceStats,
            invoices_dtos::CreateInvoiceDto,
            invoices_dtos::UpdateInvoiceStatusDto,
            invoices_dtos::InvoiceResponseDto,
            ApiResponse<Vec<invoices_dtos::InvoiceResponseDto>>,
            ApiResponse<invoices_dtos::InvoiceResponseDto>,
            ApiResponse<invoices_models::InvoiceStats>,
            // Dashboard
            dashboard_dtos::DashboardStatsDto,
            ApiResponse<dashboard_dtos::DashboardStatsDto>,
            // Admin
            admin_dtos::AdminUserDto,
            admin_dtos::SetAdminDto,
            admin_dtos::ResetPasswordDto,
            admin_dtos::RecordsOverviewDto,
            ApiResponse<Vec<admin_dtos::AdminUserDto>>,
            ApiResponse<admin_dtos::AdminUserDto>,
            ApiResponse<admin_dtos::RecordsOverviewDto>,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and sessions"),
        (name = "catalog", description = "Catalog of known items (changes are admin only)"),
        (name = "reports", description = "Lost and found reports"),
        (name = "search", description = "Report search with filters and sorting"),
        (name = "invoices", description = "Invoices for returned items (issuing is admin only)"),
        (name = "dashboard", description = "Headline counts"),
        (name = "admin", description = "Account administration (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Lost & Found Tracker API",
        version = "0.1.0",
        description = "API documentation for the Lost & Found Tracker",
    )
)]
pub struct ApiDoc;

/// Documents the session cookie set by `/api/auth/login`
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                    SessionConfig::DEFAULT_COOKIE_NAME,
                ))),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
