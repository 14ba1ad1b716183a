//! Server-rendered HTML pages.
//!
//! # Usage
//!
//! ```ignore
//! use minijinja::context;
//! use crate::shared::templates::page;
//!
//! page(jar, Some(&principal), "about.html", context! {})
//! ```

pub mod engine;
pub mod page;

pub use engine::{render, TemplateError};
pub use page::{form_failure, page, page_with_status};
