use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use minijinja::context;
use thiserror::Error;

use crate::shared::templates::{self, TemplateError};
use crate::shared::types::{ApiResponse, FieldError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation failed for {} field(s)", .0.len())]
    InvalidFields(Vec<FieldError>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    /// Wrong credentials. The message never says which half was wrong.
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A write referenced a row that does not exist (e.g. a report for an unknown catalog item)
    #[error("Referential error: {0}")]
    Referential(String),

    /// Uniqueness violations, one entry per colliding field
    #[error("Conflict on {} field(s)", .0.len())]
    Conflict(Vec<FieldError>),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
}

impl AppError {
    pub fn conflict(field: &str, message: impl Into<String>) -> Self {
        AppError::Conflict(vec![FieldError::new(field, message)])
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) | AppError::Template(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::InvalidFields(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Auth(_) | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Referential(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    /// Message safe to show to the client. Server-side failures are logged here and
    /// replaced by a generic message.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            AppError::Template(e) => {
                tracing::error!("Template error: {}", e);
                "Internal server error".to_string()
            }
            AppError::InvalidFields(_) => "Please correct the highlighted fields".to_string(),
            AppError::Conflict(errors) => errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::BadRequest(msg)
            | AppError::Auth(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::Referential(msg) => msg.clone(),
        }
    }

    /// Per-field details, when the error carries any
    pub fn field_errors(&self) -> Option<Vec<FieldError>> {
        match self {
            AppError::InvalidFields(errors) | AppError::Conflict(errors) => Some(errors.clone()),
            AppError::Validation(msg) => Some(vec![FieldError::new("form", msg.clone())]),
            _ => None,
        }
    }

    /// Errors a form page shows inline next to the submitted values, instead of an error page
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::InvalidFields(_)
                | AppError::Referential(_)
                | AppError::Conflict(_)
                | AppError::BadRequest(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.public_message();
        let errors = self.field_errors();

        let body = Json(ApiResponse::<()>::error(Some(message), errors));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Error returned by HTML page handlers: same classification as [`AppError`],
/// rendered as an error page instead of a JSON envelope.
#[derive(Debug)]
pub struct PageError(pub AppError);

impl From<AppError> for PageError {
    fn from(e: AppError) -> Self {
        PageError(e)
    }
}

impl From<TemplateError> for PageError {
    fn from(e: TemplateError) -> Self {
        PageError(AppError::Template(e))
    }
}

impl From<sqlx::Error> for PageError {
    fn from(e: sqlx::Error) -> Self {
        PageError(AppError::Database(e))
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let message = self.0.public_message();

        match templates::render(
            "error.html",
            context! { status => status.as_u16(), message => message },
        ) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("Failed to render error page: {}", e);
                (status, message).into_response()
            }
        }
    }
}

pub type PageResult<T> = std::result::Result<T, PageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Validation("bad date".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Referential("missing".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::conflict("username", "Username already exists").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Auth("Invalid username/email or password".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("Access denied".into()).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let err = AppError::Internal("connection string postgres://secret".into());
        assert_eq!(err.public_message(), "Internal server error");
        let err = AppError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.public_message(), "Database error occurred");
    }

    #[test]
    fn test_conflict_lists_every_field() {
        let err = AppError::Conflict(vec![
            FieldError::new("username", "Username already exists"),
            FieldError::new("email", "Email already registered"),
        ]);
        assert_eq!(
            err.public_message(),
            "Username already exists; Email already registered"
        );
        assert_eq!(err.field_errors().unwrap().len(), 2);
    }

    #[test]
    fn test_page_error_renders_html() {
        let response = PageError(AppError::NotFound("Report 7 not found".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/html"));
    }
}
