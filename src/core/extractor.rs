use axum::{
    body::Body,
    extract::{
        rejection::{FormRejection, JsonRejection},
        FromRequest, FromRequestParts, Request,
    },
    http::{header, request::Parts, HeaderMap},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::de::DeserializeOwned;
use std::convert::Infallible;

use crate::core::error::AppError;

/// How the caller wants errors and results delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Html,
    Json,
}

impl ResponseMode {
    /// JSON for `/api/` paths, AJAX requests, clients that accept JSON and JSON bodies
    pub fn detect(path: &str, headers: &HeaderMap) -> Self {
        let header_contains = |name: header::HeaderName, needle: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_ascii_lowercase().contains(needle))
                .unwrap_or(false)
        };

        let is_ajax = headers
            .get("x-requested-with")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
            .unwrap_or(false);

        if path.starts_with("/api/")
            || is_ajax
            || header_contains(header::ACCEPT, "application/json")
            || header_contains(header::CONTENT_TYPE, "application/json")
        {
            ResponseMode::Json
        } else {
            ResponseMode::Html
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, ResponseMode::Json)
    }
}

impl<S> FromRequestParts<S> for ResponseMode
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ResponseMode::detect(parts.uri.path(), &parts.headers))
    }
}

/// Custom JSON extractor that provides consistent error responses
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    let message = match rejection {
        JsonRejection::JsonDataError(err) => format!("Invalid JSON data: {}", err),
        JsonRejection::JsonSyntaxError(err) => format!("Invalid JSON syntax: {}", err),
        JsonRejection::MissingJsonContentType(err) => {
            format!("Missing JSON content type: {}", err)
        }
        _ => "Failed to parse JSON body".to_string(),
    };
    AppError::BadRequest(message)
}

/// Urlencoded form extractor with the same error shape as [`AppJson`]
pub struct AppForm<T>(pub T);

impl<T, S> FromRequest<S> for AppForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        match Form::<T>::from_request(req, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => Err(form_rejection(rejection)),
        }
    }
}

fn form_rejection(rejection: FormRejection) -> AppError {
    let message = match rejection {
        FormRejection::FailedToDeserializeForm(err) => format!("Invalid form data: {}", err),
        FormRejection::FailedToDeserializeFormBody(err) => format!("Invalid form data: {}", err),
        FormRejection::InvalidFormContentType(err) => {
            format!("Invalid form content type: {}", err)
        }
        _ => "Failed to parse form body".to_string(),
    };
    AppError::BadRequest(message)
}

/// Body that may arrive as JSON or as an urlencoded form, chosen by `Content-Type`.
/// Pages and the JSON API share one handler through this.
pub struct AppPayload<T>(pub T);

impl<T, S> FromRequest<S> for AppPayload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase().starts_with("application/json"))
            .unwrap_or(false);

        if is_json {
            let AppJson(value) = AppJson::<T>::from_request(req, state).await?;
            Ok(Self(value))
        } else {
            let AppForm(value) = AppForm::<T>::from_request(req, state).await?;
            Ok(Self(value))
        }
    }
}

/// Pair an error with the mode it should be rendered in
pub struct ModeError(pub ResponseMode, pub AppError);

impl IntoResponse for ModeError {
    fn into_response(self) -> Response {
        match self.0 {
            ResponseMode::Json => self.1.into_response(),
            ResponseMode::Html => crate::core::error::PageError(self.1).into_response(),
        }
    }
}
