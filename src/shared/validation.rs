use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationErrors;

use crate::shared::constants::DATE_FORMAT;
use crate::shared::types::FieldError;

lazy_static! {
    /// Regex for validating username fields
    /// Must start with letter or underscore and contain only alphanumeric characters,
    /// underscores and dots
    /// - Valid: "john_doe", "user123", "_admin", "redowan.alif"
    /// - Invalid: "123user", "-user", "user-name", "user name", "a@b.com"
    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_.]*$").unwrap();
}

/// Flatten `validator` errors into one `FieldError` per failed rule, ordered by field name
/// so rendered pages and API responses are stable.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                FieldError::new(field.clone(), message)
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

/// Parse a `YYYY-MM-DD` date, reporting failures against `field`.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, FieldError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        FieldError::new(field, format!("{} must be a date in YYYY-MM-DD format", label(field)))
    })
}

/// Turn a snake_case field name into a sentence-case label ("due_date" -> "Due date")
pub fn label(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
