use axum::{routing::get, Router};

use crate::core::app::AppState;
use crate::features::pages::handlers;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::index))
        .route("/about", get(handlers::about))
        .route("/health", get(handlers::health_check))
}
