use axum::{
    extract::FromRef,
    middleware::{from_fn, from_fn_with_state},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::core::config::SessionConfig;
use crate::core::middleware;
use crate::features::admin::{self, AdminService};
use crate::features::auth::{self, AuthService, SessionService};
use crate::features::catalog::{self, CatalogService};
use crate::features::dashboard::{self, DashboardService};
use crate::features::invoices::{self, InvoiceService};
use crate::features::pages;
use crate::features::reports::{self, ReportService, SearchService};
use crate::features::users::UserService;

/// Services shared by every handler; each handler extracts only the one it needs
#[derive(Clone, FromRef)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub sessions: Arc<SessionService>,
    pub auth: Arc<AuthService>,
    pub catalog: Arc<CatalogService>,
    pub reports: Arc<ReportService>,
    pub search: Arc<SearchService>,
    pub invoices: Arc<InvoiceService>,
    pub dashboard: Arc<DashboardService>,
    pub admin: Arc<AdminService>,
}

impl AppState {
    pub fn new(pool: PgPool, session: SessionConfig) -> Self {
        let users = Arc::new(UserService::new(pool.clone()));
        let sessions = Arc::new(SessionService::new(pool.clone(), session));
        let auth = Arc::new(AuthService::new(Arc::clone(&users), Arc::clone(&sessions)));
        let catalog = Arc::new(CatalogService::new(pool.clone()));
        let reports = Arc::new(ReportService::new(pool.clone()));
        let search = Arc::new(SearchService::new(pool.clone()));
        let invoices = Arc::new(InvoiceService::new(pool.clone()));
        let dashboard = Arc::new(DashboardService::new(pool));
        let admin = Arc::new(AdminService::new(
            Arc::clone(&users),
            Arc::clone(&catalog),
            Arc::clone(&reports),
            Arc::clone(&invoices),
        ));

        Self {
            users,
            sessions,
            auth,
            catalog,
            reports,
            search,
            invoices,
            dashboard,
            admin,
        }
    }
}

/// Every page and API route. Transport layers (tracing, CORS, request ids) and the
/// Swagger UI are added by `main`.
pub fn build_router(state: AppState) -> Router {
    // Require a session; admin-only handlers check the capability themselves
    let protected_routes = Router::new()
        .merge(auth::routes::routes())
        .merge(dashboard::routes::routes())
        .merge(catalog::routes::routes())
        .merge(reports::routes::routes())
        .merge(invoices::routes::routes())
        .merge(admin::routes::routes())
        .route_layer(from_fn(middleware::require_session));

    let public_routes = Router::new()
        .merge(auth::routes::public_routes())
        .merge(pages::routes::routes());

    Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .fallback(pages::handlers::not_found)
        .layer(from_fn_with_state(
            Arc::clone(&state.sessions),
            middleware::attach_principal,
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use crate::shared::test_helpers::{admin, member, test_app, test_app_as};
    use axum::http::{header, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn server(app: axum::Router) -> TestServer {
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let response = server(test_app()).get("/health").await;
        response.assert_status_ok();
    }

    #[tokio::test]
    async fn test_root_redirects_by_session() {
        let response = server(test_app()).get("/").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header(header::LOCATION), "/login");

        let response = server(test_app_as(member())).get("/").await;
        assert_eq!(response.header(header::LOCATION), "/dashboard");
    }

    #[tokio::test]
    async fn test_pages_require_login() {
        let server = server(test_app());
        for path in ["/dashboard", "/report", "/search", "/invoice", "/create-item"] {
            let response = server.get(path).await;
            response.assert_status(StatusCode::SEE_OTHER);
            assert_eq!(response.header(header::LOCATION), "/login", "{}", path);
        }
    }

    #[tokio::test]
    async fn test_api_requires_session() {
        let response = server(test_app()).get("/api/reports").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn test_login_page_renders_and_redirects_when_signed_in() {
        let response = server(test_app()).get("/login").await;
        response.assert_status_ok();
        assert!(response.text().contains("<form"));

        let response = server(test_app_as(member())).get("/login").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header(header::LOCATION), "/dashboard");
    }

    #[tokio::test]
    async fn test_about_is_public() {
        server(test_app()).get("/about").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_members_cannot_reach_admin_routes() {
        let server = server(test_app_as(member()));

        let response = server.get("/create-item").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header(header::LOCATION), "/dashboard");

        let response = server
            .post("/api/items")
            .json(&json!({ "name": "Lamp", "category": "other", "date": "2024-03-01", "description": "desk lamp" }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        server.get("/admin/users").await.assert_status(StatusCode::SEE_OTHER);
        server
            .get("/api/admin/users")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_invalid_report_is_rejected_before_storage() {
        let response = server(test_app_as(member()))
            .post("/api/reports")
            .json(&json!({ "form_type": "found", "item_name": "Car Keys" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert!(fields.contains(&"phone"));
        assert!(fields.contains(&"location"));
        assert!(fields.contains(&"date"));
    }

    #[tokio::test]
    async fn test_invoice_total_must_match_fees() {
        let response = server(test_app_as(admin()))
            .post("/api/invoices")
            .json(&json!({
                "date": "2024-03-05",
                "due_date": "2024-03-19",
                "client_name": "Bob",
                "client_email": "bob@example.com",
                "report_id": 1,
                "total_amount": "99.00"
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("total_amount"));
    }

    #[tokio::test]
    async fn test_inverted_search_range_is_rejected() {
        let response = server(test_app_as(member()))
            .get("/api/search")
            .add_query_param("date_from", "2024-03-10")
            .add_query_param("date_to", "2024-03-01")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_form_errors_are_rendered_inline() {
        let response = server(test_app())
            .post("/register")
            .form(&[
                ("username", "bob"),
                ("email", "bob@example.com"),
                ("password", "secret1"),
                ("confirmPassword", "secret2"),
            ])
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().contains("Passwords do not match"));
    }

    #[tokio::test]
    async fn test_empty_login_is_a_validation_error() {
        let response = server(test_app())
            .post("/login")
            .add_header(header::ACCEPT, HeaderValue::from_static("application/json"))
            .form(&[("username", ""), ("password", "")])
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn test_unknown_routes() {
        let server = server(test_app());
        server.get("/nope").await.assert_status_not_found();

        let response = server.get("/api/nope").await;
        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["success"], json!(false));
    }
}
