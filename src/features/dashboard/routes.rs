use axum::{routing::get, Router};

use crate::core::app::AppState;
use crate::features::dashboard::handlers;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::dashboard_page))
        .route("/api/stats", get(handlers::get_stats))
}
