mod dashboard_handler;

pub use dashboard_handler::{__path_get_stats, dashboard_page, get_stats};
