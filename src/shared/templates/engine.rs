//! HTML page rendering using Jinja2 syntax.
//!
//! Page templates live in `templates/pages/` and are compiled into the binary, so the
//! server renders the same pages regardless of its working directory.

use chrono::NaiveDate;
use minijinja::{Environment, Value};
use std::sync::OnceLock;
use thiserror::Error;

use crate::features::catalog::models::ItemCategory;
use crate::shared::constants::{DATE_FORMAT, DISPLAY_DATE_FORMAT};

/// Global template environment
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// Page templates, keyed by the name used in `{% extends %}` and `render`
const PAGES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../../templates/pages/base.html")),
    ("error.html", include_str!("../../../templates/pages/error.html")),
    ("login.html", include_str!("../../../templates/pages/login.html")),
    ("register.html", include_str!("../../../templates/pages/register.html")),
    ("dashboard.html", include_str!("../../../templates/pages/dashboard.html")),
    ("report.html", include_str!("../../../templates/pages/report.html")),
    ("search.html", include_str!("../../../templates/pages/search.html")),
    ("create_item.html", include_str!("../../../templates/pages/create_item.html")),
    ("invoice.html", include_str!("../../../templates/pages/invoice.html")),
    ("about.html", include_str!("../../../templates/pages/about.html")),
    ("admin_files.html", include_str!("../../../templates/pages/admin_files.html")),
    ("admin_users.html", include_str!("../../../templates/pages/admin_users.html")),
];

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.add_filter("display_date", display_date);
    env.add_filter("category_icon", category_icon);

    for (name, source) in PAGES {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load template {}: {}", name, e);
        } else {
            tracing::debug!("Loaded template: {}", name);
        }
    }

    env
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// `{{ report.date | display_date }}` -> "Mar 01, 2024"; unparsable input is passed through.
fn display_date(value: String) -> String {
    NaiveDate::parse_from_str(&value, DATE_FORMAT)
        .map(|d| d.format(DISPLAY_DATE_FORMAT).to_string())
        .unwrap_or(value)
}

/// `{{ item.category | category_icon }}` -> FontAwesome class
fn category_icon(value: String) -> String {
    value
        .parse::<ItemCategory>()
        .map(|c| c.icon())
        .unwrap_or(ItemCategory::Other.icon())
        .to_string()
}

/// Render a page template with the given context.
///
/// `.html` templates are auto-escaped, so user-submitted text can be passed as is.
pub fn render(template_name: &str, ctx: Value) -> Result<String, TemplateError> {
    let env = get_environment();

    let template = env
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    template
        .render(ctx)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}

/// Check if a template exists
#[cfg(test)]
pub fn template_exists(template_name: &str) -> bool {
    get_environment().get_template(template_name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_all_pages_compile() {
        for (name, _) in PAGES {
            assert!(template_exists(name), "template {} failed to load", name);
        }
    }

    #[test]
    fn test_missing_template() {
        let result = render("definitely_not_a_real_template.html", context! {});
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let html = render(
            "error.html",
            context! { status => 400, message => "<script>alert(1)</script>" },
        )
        .unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_display_date_filter() {
        assert_eq!(display_date("2024-03-01".into()), "Mar 01, 2024");
        assert_eq!(display_date("someday".into()), "someday");
    }

    #[test]
    fn test_category_icon_filter() {
        assert_eq!(category_icon("keys".into()), "fas fa-key");
        assert_eq!(category_icon("spaceship".into()), "fas fa-question-circle");
    }
}
