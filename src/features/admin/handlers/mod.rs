pub mod admin_handlers;
pub mod admin_pages;

pub use admin_handlers::{
    __path_list_users, __path_records_overview, __path_reset_password, __path_set_admin,
    list_users, records_overview, reset_password, set_admin,
};
