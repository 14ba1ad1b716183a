mod invoice;

pub use invoice::{CreateInvoice, Invoice, InvoiceFees, InvoiceStats, InvoiceStatus};
