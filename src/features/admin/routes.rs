use axum::{
    routing::{get, post, put},
    Router,
};

use crate::core::app::AppState;
use crate::features::admin::handlers::{self, admin_pages};

/// Account administration and records overview. Every handler checks the admin capability.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/users", get(handlers::list_users))
        .route("/api/admin/users/{id}/admin", put(handlers::set_admin))
        .route("/api/admin/users/{id}/password", put(handlers::reset_password))
        .route("/api/admin/records", get(handlers::records_overview))
        .route("/admin/users", get(admin_pages::users_page))
        .route("/admin/users/{id}/promote", post(admin_pages::promote))
        .route("/admin/users/{id}/demote", post(admin_pages::demote))
        .route("/admin/users/{id}/password", post(admin_pages::reset_password))
        .route("/admin/files", get(admin_pages::files_page))
}
