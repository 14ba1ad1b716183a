pub mod catalog_handler;
pub mod catalog_pages;

pub use catalog_handler::{
    __path_create_item, __path_delete_item, __path_get_item, __path_list_items,
    __path_update_item, create_item, delete_item, get_item, list_items, update_item,
};
