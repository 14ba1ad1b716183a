use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use minijinja::context;

use crate::core::error::AppError;
use crate::core::extractor::{ModeError, ResponseMode};
use crate::features::auth::model::Principal;
use crate::shared::templates::page;

/// `GET /`
pub async fn index(principal: Option<Principal>) -> Redirect {
    match principal {
        Some(_) => Redirect::to("/dashboard"),
        None => Redirect::to("/login"),
    }
}

/// `GET /about`, open to everyone
pub async fn about(jar: CookieJar, principal: Option<Principal>) -> Response {
    page(jar, principal.as_ref(), "about.html", context! {})
}

/// `GET /health`
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

pub async fn not_found(mode: ResponseMode) -> Response {
    ModeError(mode, AppError::NotFound("Page not found".to_string())).into_response()
}
