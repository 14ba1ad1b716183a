use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use minijinja::context;
use std::sync::Arc;

use crate::core::error::AppError;
use crate::core::extractor::{AppPayload, ResponseMode};
use crate::features::auth::dtos::{
    AuthResponseDto, AuthUserDto, LoginRequestDto, RegisterRequestDto,
};
use crate::features::auth::handlers::auth_handler::{LOGGED_IN, REGISTERED};
use crate::features::auth::model::Principal;
use crate::features::auth::services::AuthService;
use crate::shared::flash::{self, Flash};
use crate::shared::templates::{form_failure, page, page_with_status};
use crate::shared::types::ApiResponse;

/// `GET /login`; a signed-in visitor goes straight to the dashboard
pub async fn login_page(jar: CookieJar, principal: Option<Principal>) -> Response {
    if principal.is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    page(jar, None, "login.html", context! { username => "" })
}

/// `POST /login`, from the form or from script
pub async fn submit_login(
    mode: ResponseMode,
    jar: CookieJar,
    State(service): State<Arc<AuthService>>,
    AppPayload(dto): AppPayload<LoginRequestDto>,
) -> Response {
    match service.login(&dto).await {
        Ok((principal, session)) => {
            let jar = jar.add(service.sessions().cookie(&session));
            if mode.is_json() {
                let body = AuthResponseDto {
                    user: AuthUserDto::from(&principal),
                    redirect: "/dashboard".to_string(),
                };
                (
                    jar,
                    Json(ApiResponse::success(Some(body), Some(LOGGED_IN.to_string()), None)),
                )
                    .into_response()
            } else {
                (
                    flash::push(jar, Flash::success(LOGGED_IN)),
                    Redirect::to("/dashboard"),
                )
                    .into_response()
            }
        }
        Err(AppError::Auth(message)) if !mode.is_json() => page_with_status(
            StatusCode::UNAUTHORIZED,
            jar,
            None,
            "login.html",
            context! { username => dto.username, error_message => message },
        ),
        Err(e) => form_failure(
            mode,
            jar,
            None,
            "login.html",
            context! { username => dto.username },
            e,
        ),
    }
}

/// `GET /register`
pub async fn register_page(jar: CookieJar, principal: Option<Principal>) -> Response {
    if principal.is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    page(jar, None, "register.html", context! { username => "", email => "" })
}

/// `POST /register`
pub async fn submit_register(
    mode: ResponseMode,
    jar: CookieJar,
    State(service): State<Arc<AuthService>>,
    AppPayload(dto): AppPayload<RegisterRequestDto>,
) -> Response {
    match service.register(&dto).await {
        Ok(principal) if mode.is_json() => {
            let body = AuthResponseDto {
                user: AuthUserDto::from(&principal),
                redirect: "/login".to_string(),
            };
            (
                StatusCode::CREATED,
                Json(ApiResponse::success(Some(body), Some(REGISTERED.to_string()), None)),
            )
                .into_response()
        }
        Ok(_) => (
            flash::push(jar, Flash::success(REGISTERED)),
            Redirect::to("/login"),
        )
            .into_response(),
        Err(e) => form_failure(
            mode,
            jar,
            None,
            "register.html",
            context! { username => dto.username, email => dto.email },
            e,
        ),
    }
}

/// `GET|POST /logout`: drop the session row and the cookie, then say goodbye
pub async fn logout(
    jar: CookieJar,
    principal: Option<Principal>,
    State(service): State<Arc<AuthService>>,
) -> Response {
    if let Some(token) = service.sessions().token_from(&jar) {
        if let Err(e) = service.logout(&token).await {
            tracing::error!("Failed to revoke session at logout: {}", e);
        }
    }
    let jar = service.sessions().clear_cookie(jar);

    let notice = match principal {
        Some(p) => {
            tracing::info!("User {} logged out", p.username);
            Flash::info(format!("Goodbye {}! You have been logged out.", p.username))
        }
        None => Flash::info("You have been logged out."),
    };

    (flash::push(jar, notice), Redirect::to("/login")).into_response()
}
