use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::constants::{DEFAULT_LATE_FEE, DEFAULT_PROCESSING_FEE, DEFAULT_STORAGE_FEE};

/// Invoice status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "invoice_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 4] = [
        InvoiceStatus::Pending,
        InvoiceStatus::Paid,
        InvoiceStatus::Overdue,
        InvoiceStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    /// Statuses reachable from this one
    pub fn next_statuses(&self) -> &'static [InvoiceStatus] {
        match self {
            InvoiceStatus::Pending => &[
                InvoiceStatus::Paid,
                InvoiceStatus::Overdue,
                InvoiceStatus::Cancelled,
            ],
            InvoiceStatus::Overdue => &[InvoiceStatus::Paid, InvoiceStatus::Cancelled],
            InvoiceStatus::Paid | InvoiceStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: InvoiceStatus) -> bool {
        self.next_statuses().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.next_statuses().is_empty()
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        InvoiceStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| {
                format!(
                    "Status must be one of pending, paid, overdue, cancelled, got '{}'",
                    wanted
                )
            })
    }
}

/// Database model for an invoice
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invoice {
    pub id: i64,
    pub invoice_number: String,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub client_id: Option<String>,
    pub report_id: i64,
    pub item_description: Option<String>,
    pub item_location: Option<String>,
    pub item_date: Option<NaiveDate>,
    pub processing_fee: Decimal,
    pub storage_fee: Decimal,
    pub late_fee: Decimal,
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub issued_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceFees {
    pub processing: Decimal,
    pub storage: Decimal,
    pub late: Decimal,
}

impl Default for InvoiceFees {
    fn default() -> Self {
        Self {
            processing: DEFAULT_PROCESSING_FEE,
            storage: DEFAULT_STORAGE_FEE,
            late: DEFAULT_LATE_FEE,
        }
    }
}

impl InvoiceFees {
    pub fn total(&self) -> Decimal {
        self.processing + self.storage + self.late
    }
}

/// A validated invoice; the total is always derived from `fees`
#[derive(Debug, Clone)]
pub struct CreateInvoice {
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub client_id: Option<String>,
    pub report_id: i64,
    pub item_description: Option<String>,
    pub item_location: Option<String>,
    pub item_date: Option<NaiveDate>,
    pub fees: InvoiceFees,
    pub notes: Option<String>,
}

/// Figures shown above the invoice list
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize, ToSchema)]
pub struct InvoiceStats {
    pub total: i64,
    /// Sum of totals over invoices that are not cancelled
    #[schema(value_type = String)]
    pub revenue: Decimal,
    pub this_month: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use InvoiceStatus::*;

        assert!(Pending.can_transition_to(Paid));
        assert!(Pending.can_transition_to(Overdue));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Overdue.can_transition_to(Paid));
        assert!(Overdue.can_transition_to(Cancelled));

        assert!(!Overdue.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
        for next in InvoiceStatus::ALL {
            assert!(!Paid.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
        assert!(Paid.is_terminal() && Cancelled.is_terminal());
        assert!(!Overdue.is_terminal());
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(" PAID ".parse::<InvoiceStatus>(), Ok(InvoiceStatus::Paid));
        assert!("refunded".parse::<InvoiceStatus>().is_err());
    }

    #[test]
    fn test_default_fees_total_eight() {
        assert_eq!(InvoiceFees::default().total(), Decimal::new(800, 2));
    }
}
