use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use minijinja::context;
use uuid::Uuid;

use crate::core::error::{AppError, PageResult};
use crate::core::extractor::AppForm;
use crate::features::admin::dtos::{AdminUserDto, ResetPasswordDto};
use crate::features::admin::services::AdminService;
use crate::features::auth::guards::RequireAdmin;
use crate::shared::flash::{self, Flash};
use crate::shared::templates::page;

/// Flash the outcome of an account action and go back to the account list.
/// Field errors are flattened into the notice because the list page has no per-row form state.
fn back_to_users(jar: CookieJar, outcome: Result<String, AppError>) -> Response {
    let notice = match outcome {
        Ok(message) => Flash::success(message),
        Err(AppError::InvalidFields(errors)) => Flash::error(
            errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        ),
        Err(e) => Flash::error(e.public_message()),
    };

    (flash::push(jar, notice), Redirect::to("/admin/users")).into_response()
}

/// `GET /admin/users`
pub async fn users_page(
    jar: CookieJar,
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
) -> PageResult<Response> {
    let users: Vec<AdminUserDto> = service
        .users()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(page(
        jar,
        Some(&admin),
        "admin_users.html",
        context! { users => users, current_user_id => admin.id.to_string() },
    ))
}

/// `POST /admin/users/{id}/promote`
pub async fn promote(
    jar: CookieJar,
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
) -> Response {
    let outcome = service
        .set_admin(&admin, id, true)
        .await
        .map(|user| format!("{} is now an admin", user.username));
    back_to_users(jar, outcome)
}

/// `POST /admin/users/{id}/demote`
pub async fn demote(
    jar: CookieJar,
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
) -> Response {
    let outcome = service
        .set_admin(&admin, id, false)
        .await
        .map(|user| format!("{} is no longer an admin", user.username));
    back_to_users(jar, outcome)
}

/// `POST /admin/users/{id}/password`
pub async fn reset_password(
    jar: CookieJar,
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
    AppForm(dto): AppForm<ResetPasswordDto>,
) -> Response {
    let outcome = service
        .reset_password(&admin, id, &dto)
        .await
        .map(|user| format!("Password for {} has been reset", user.username));
    back_to_users(jar, outcome)
}

/// `GET /admin/files`
pub async fn files_page(
    jar: CookieJar,
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<AdminService>>,
) -> PageResult<Response> {
    let overview = service.records_overview().await?;

    Ok(page(
        jar,
        Some(&admin),
        "admin_files.html",
        context! {
            items => overview.items,
            reports => overview.reports,
            invoices => overview.invoices,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::types::FieldError;
    use axum::http::{header, StatusCode};

    #[test]
    fn test_field_errors_become_one_notice() {
        let response = back_to_users(
            CookieJar::new(),
            Err(AppError::InvalidFields(vec![
                FieldError::new("confirm_password", "Passwords do not match"),
                FieldError::new("password", "Password must be at least 6 characters"),
            ])),
        );
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/admin/users");
        assert!(response.headers().contains_key(header::SET_COOKIE));
    }
}
