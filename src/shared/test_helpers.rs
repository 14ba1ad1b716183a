use axum::{extract::Request, middleware::Next, Router};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::app::{build_router, AppState};
use crate::core::config::SessionConfig;
use crate::features::auth::model::Principal;

/// Pool that never connects until a query runs. Needs a Tokio runtime.
pub fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .connect_lazy("postgres://postgres@localhost:5432/lost_found")
        .expect("lazy pool")
}

pub fn member() -> Principal {
    Principal {
        id: Uuid::new_v4(),
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        is_admin: false,
    }
}

pub fn admin() -> Principal {
    Principal {
        id: Uuid::new_v4(),
        username: "carol".to_string(),
        email: "carol@example.com".to_string(),
        is_admin: true,
    }
}

/// The application router over a lazy pool, as an anonymous visitor sees it
pub fn test_app() -> Router {
    build_router(AppState::new(lazy_pool(), SessionConfig::default()))
}

/// The application router with `principal` already signed in
pub fn test_app_as(principal: Principal) -> Router {
    test_app().layer(axum::middleware::from_fn(move |mut request: Request, next: Next| {
        let principal = principal.clone();
        async move {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
    }))
}

