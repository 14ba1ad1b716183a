use axum::{routing::get, Router};

use crate::core::app::AppState;
use crate::features::catalog::handlers::{self, catalog_pages};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/items",
            get(handlers::list_items).post(handlers::create_item),
        )
        .route(
            "/api/items/{name}",
            get(handlers::get_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
        .route(
            "/create-item",
            get(catalog_pages::create_item_page).post(catalog_pages::submit_item),
        )
}
