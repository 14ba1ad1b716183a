mod report_service;
mod search_service;

pub use report_service::{missing_item_message, ReportService};
pub use search_service::{build_search_query, SearchService};
