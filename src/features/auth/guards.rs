//! Request guards built on the principal that the session middleware attaches.
//!
//! Handlers that need a signed-in account take [`Principal`]; admin-only handlers
//! take [`RequireAdmin`]. Rejections follow the caller's [`ResponseMode`]: browsers
//! are redirected with a notice, API clients get a JSON error.

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::convert::Infallible;

use crate::core::error::AppError;
use crate::core::extractor::ResponseMode;
use crate::features::auth::model::Principal;
use crate::shared::flash::{self, Flash};

pub const LOGIN_REQUIRED: &str = "Please login to access this page";
pub const ADMIN_REQUIRED: &str = "Access denied. Admin privileges required.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenied {
    SignInRequired(ResponseMode),
    Forbidden(ResponseMode),
}

impl IntoResponse for AccessDenied {
    fn into_response(self) -> Response {
        match self {
            AccessDenied::SignInRequired(ResponseMode::Html) => (
                flash::push(CookieJar::new(), Flash::warning(LOGIN_REQUIRED)),
                Redirect::to("/login"),
            )
                .into_response(),
            AccessDenied::SignInRequired(ResponseMode::Json) => {
                AppError::Unauthorized("Authentication required".to_string()).into_response()
            }
            AccessDenied::Forbidden(ResponseMode::Html) => (
                flash::push(CookieJar::new(), Flash::error(ADMIN_REQUIRED)),
                Redirect::to("/dashboard"),
            )
                .into_response(),
            AccessDenied::Forbidden(ResponseMode::Json) => {
                AppError::Forbidden("Admin privileges required".to_string()).into_response()
            }
        }
    }
}

fn mode(parts: &Parts) -> ResponseMode {
    ResponseMode::detect(parts.uri.path(), &parts.headers)
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AccessDenied;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| AccessDenied::SignInRequired(mode(parts)))
    }
}

impl<S> OptionalFromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<Principal>().cloned())
    }
}

/// Guard for admin-only operations: catalog management, invoice issuance and
/// account administration.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(admin): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub Principal);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AccessDenied;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = <Principal as FromRequestParts<S>>::from_request_parts(parts, state).await?;

        if !principal.capabilities().is_admin() {
            tracing::warn!(
                "Denied admin route {} to {}",
                parts.uri.path(),
                principal.username
            );
            return Err(AccessDenied::Forbidden(mode(parts)));
        }

        Ok(RequireAdmin(principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Request, StatusCode};
    use uuid::Uuid;

    fn parts(path: &str, principal: Option<Principal>) -> Parts {
        let (mut parts, _) = Request::builder()
            .uri(path)
            .body(())
            .unwrap()
            .into_parts();
        if let Some(p) = principal {
            parts.extensions.insert(p);
        }
        parts
    }

    fn member(is_admin: bool) -> Principal {
        Principal {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@x.com".into(),
            is_admin,
        }
    }

    #[tokio::test]
    async fn test_missing_principal_on_page_redirects_to_login() {
        let mut parts = parts("/dashboard", None);
        let rejection = <Principal as FromRequestParts<()>>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(rejection, AccessDenied::SignInRequired(ResponseMode::Html));

        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/login");
        assert!(response.headers().contains_key(header::SET_COOKIE));
    }

    #[tokio::test]
    async fn test_missing_principal_on_api_is_401() {
        let mut parts = parts("/api/items", None);
        let rejection = <Principal as FromRequestParts<()>>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(
            rejection.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_optional_principal() {
        let mut anonymous = parts("/login", None);
        let found =
            <Principal as OptionalFromRequestParts<()>>::from_request_parts(&mut anonymous, &())
                .await
                .unwrap();
        assert!(found.is_none());

        let mut signed_in = parts("/login", Some(member(false)));
        let found =
            <Principal as OptionalFromRequestParts<()>>::from_request_parts(&mut signed_in, &())
                .await
                .unwrap();
        assert_eq!(found.map(|p| p.username), Some("alice".to_string()));
    }

    #[tokio::test]
    async fn test_require_admin() {
        let mut parts_member = parts("/create-item", Some(member(false)));
        let rejection = RequireAdmin::from_request_parts(&mut parts_member, &())
            .await
            .err()
            .unwrap();
        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/dashboard");

        let mut parts_api = parts("/api/items", Some(member(false)));
        let rejection = RequireAdmin::from_request_parts(&mut parts_api, &())
            .await
            .err()
            .unwrap();
        assert_eq!(rejection.into_response().status(), StatusCode::FORBIDDEN);

        let mut parts_admin = parts("/create-item", Some(member(true)));
        assert!(RequireAdmin::from_request_parts(&mut parts_admin, &())
            .await
            .is_ok());
    }
}
