pub mod invoice_handler;
pub mod invoice_pages;

pub use invoice_handler::{
    __path_create_invoice, __path_get_invoice, __path_invoice_stats, __path_list_invoices,
    __path_update_invoice_status, create_invoice, get_invoice, invoice_stats, list_invoices,
    update_invoice_status,
};
