use axum::{routing::get, Router};

use crate::core::app::AppState;
use crate::features::reports::handlers::{self, report_pages};

/// Report and search routes. Every route here needs a signed-in account.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/reports",
            get(handlers::list_reports).post(handlers::create_report),
        )
        .route("/api/reports/{id}", get(handlers::get_report))
        .route("/api/search", get(handlers::search_reports))
        .route(
            "/report",
            get(report_pages::report_page).post(report_pages::submit_report),
        )
        .route("/search", get(report_pages::search_page))
}
