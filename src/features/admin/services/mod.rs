mod admin_service;

pub use admin_service::{check_admin_change, AdminService, SELF_DEMOTION};
