mod invoice_service;

pub use invoice_service::{format_invoice_number, month_bounds, InvoiceService};
