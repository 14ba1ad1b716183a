//! Full-page responses: every page gets the signed-in account and the pending flash
//! notice, and form pages re-render inline when the submission was rejected.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use minijinja::{context, Value};
use std::collections::BTreeMap;

use crate::core::error::{AppError, PageError};
use crate::core::extractor::ResponseMode;
use crate::features::auth::model::Principal;
use crate::shared::flash;
use crate::shared::templates::render;
use crate::shared::types::FieldError;

fn current_user(principal: Option<&Principal>) -> Value {
    match principal {
        Some(p) => context! {
            username => p.username,
            email => p.email,
            is_admin => p.capabilities().is_admin(),
        },
        None => Value::from(()),
    }
}

/// Render `template` with `ctx`, consuming any pending flash notice
pub fn page(jar: CookieJar, principal: Option<&Principal>, template: &str, ctx: Value) -> Response {
    page_with_status(StatusCode::OK, jar, principal, template, ctx)
}

pub fn page_with_status(
    status: StatusCode,
    jar: CookieJar,
    principal: Option<&Principal>,
    template: &str,
    ctx: Value,
) -> Response {
    let (jar, flash) = flash::take(jar);

    match render(
        template,
        context! {
            current_user => current_user(principal),
            flash => flash,
            ..ctx
        },
    ) {
        Ok(html) => (status, jar, Html(html)).into_response(),
        Err(e) => PageError(AppError::Template(e)).into_response(),
    }
}

/// First message per field, for inline display next to inputs
pub fn messages_by_field(errors: &[FieldError]) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for error in errors {
        map.entry(error.field.clone())
            .or_insert_with(|| error.message.clone());
    }
    map
}

/// Answer a rejected submission. API callers get the JSON error; browsers see the form
/// again with the problems listed, unless the failure was not theirs to fix.
pub fn form_failure(
    mode: ResponseMode,
    jar: CookieJar,
    principal: Option<&Principal>,
    template: &str,
    ctx: Value,
    error: AppError,
) -> Response {
    if mode.is_json() {
        return error.into_response();
    }
    if !error.is_user_correctable() {
        return PageError(error).into_response();
    }

    let status = error.status_code();
    let message = error.public_message();
    let errors = error.field_errors().unwrap_or_default();
    let by_field = messages_by_field(&errors);

    page_with_status(
        status,
        jar,
        principal,
        template,
        context! {
            error_message => message,
            errors => errors,
            field_errors => by_field,
            ..ctx
        },
    )
}
