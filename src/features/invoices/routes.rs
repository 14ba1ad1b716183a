use axum::{
    routing::{get, patch},
    Router,
};

use crate::core::app::AppState;
use crate::features::invoices::handlers::{self, invoice_pages};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/invoices",
            get(handlers::list_invoices).post(handlers::create_invoice),
        )
        .route("/api/invoices/stats", get(handlers::invoice_stats))
        .route("/api/invoices/{id}", get(handlers::get_invoice))
        .route(
            "/api/invoices/{id}/status",
            patch(handlers::update_invoice_status),
        )
        .route(
            "/invoice",
            get(invoice_pages::invoice_page).post(invoice_pages::submit_invoice),
        )
}
