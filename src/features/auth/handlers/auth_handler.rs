use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{
    AuthResponseDto, AuthUserDto, LoginRequestDto, RegisterRequestDto,
};
use crate::features::auth::model::Principal;
use crate::features::auth::services::AuthService;
use crate::shared::types::ApiResponse;

pub const REGISTERED: &str = "Registration successful! You can now login.";
pub const LOGGED_IN: &str = "Login successful!";

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequestDto,
    responses(
        (status = 201, description = "User registered successfully", body = ApiResponse<AuthResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username or email already taken")
    ),
    tag = "auth"
)]
pub async fn register(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<RegisterRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponseDto>>)> {
    let principal = service.register(&dto).await?;

    let body = AuthResponseDto {
        user: AuthUserDto::from(&principal),
        redirect: "/login".to_string(),
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(body), Some(REGISTERED.to_string()), None)),
    ))
}

/// Login with username or email and password. Sets the session cookie.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    jar: CookieJar,
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<(CookieJar, Json<ApiResponse<AuthResponseDto>>)> {
    let (principal, session) = service.login(&dto).await?;
    let jar = jar.add(service.sessions().cookie(&session));

    let body = AuthResponseDto {
        user: AuthUserDto::from(&principal),
        redirect: "/dashboard".to_string(),
    };
    Ok((
        jar,
        Json(ApiResponse::success(Some(body), Some(LOGGED_IN.to_string()), None)),
    ))
}

/// End the current session
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out")
    ),
    tag = "auth"
)]
pub async fn logout(
    jar: CookieJar,
    State(service): State<Arc<AuthService>>,
) -> Result<(CookieJar, Json<ApiResponse<()>>)> {
    if let Some(token) = service.sessions().token_from(&jar) {
        service.logout(&token).await?;
    }
    let jar = service.sessions().clear_cookie(jar);

    Ok((
        jar,
        Json(ApiResponse::success(
            None,
            Some("Logged out".to_string()),
            None,
        )),
    ))
}

/// The signed-in account and its capabilities
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current account", body = ApiResponse<AuthUserDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth"
)]
pub async fn me(principal: Principal) -> Json<ApiResponse<AuthUserDto>> {
    Json(ApiResponse::success(
        Some(AuthUserDto::from(&principal)),
        None,
        None,
    ))
}
