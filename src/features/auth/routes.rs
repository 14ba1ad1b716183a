use axum::{
    routing::{get, post},
    Router,
};

use crate::core::app::AppState;
use crate::features::auth::handlers::{self, auth_pages};

/// Routes reachable without a session
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        .route(
            "/login",
            get(auth_pages::login_page).post(auth_pages::submit_login),
        )
        .route(
            "/register",
            get(auth_pages::register_page).post(auth_pages::submit_register),
        )
        .route("/logout", get(auth_pages::logout).post(auth_pages::logout))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/me", get(handlers::me))
}
