use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::core::error::AppError;
use crate::features::invoices::models::{CreateInvoice, Invoice, InvoiceFees, InvoiceStatus};
use crate::shared::constants::MAX_INVOICE_AMOUNT;
use crate::shared::types::{non_empty, optional_decimal, FieldError, NumberInput};
use crate::shared::validation::{field_errors, label, parse_date};

/// Request DTO for issuing an invoice (JSON body or the invoice form).
///
/// The form posts hyphenated names (`invoice-date`, `client-name`, ...), accepted as aliases.
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateInvoiceDto {
    /// `YYYY-MM-DD`
    #[serde(default, alias = "invoice-date")]
    pub date: String,

    /// `YYYY-MM-DD`, not before `date`
    #[serde(default, alias = "due-date")]
    pub due_date: String,

    /// Initial status, `pending` when blank
    #[serde(default, alias = "invoice-status")]
    pub status: Option<String>,

    #[serde(default, alias = "client-name")]
    #[validate(length(min = 1, max = 200, message = "Client name is required (at most 200 characters)"))]
    pub client_name: String,

    #[serde(default, alias = "client-email")]
    #[validate(
        email(message = "Client email must be a valid email address"),
        length(max = 120, message = "Client email must be at most 120 characters")
    )]
    pub client_email: String,

    #[serde(default, alias = "client-phone")]
    #[validate(length(max = 20, message = "Client phone must be at most 20 characters"))]
    pub client_phone: Option<String>,

    #[serde(default, alias = "client-id")]
    #[validate(length(max = 50, message = "Client ID must be at most 50 characters"))]
    pub client_id: Option<String>,

    /// Id of a `found` report
    #[serde(default, alias = "invoice-item", alias = "item_id")]
    #[schema(value_type = Option<i64>)]
    pub report_id: Option<NumberInput>,

    #[serde(default, alias = "item-description")]
    pub item_description: Option<String>,

    #[serde(default, alias = "item-location")]
    #[validate(length(max = 200, message = "Item location must be at most 200 characters"))]
    pub item_location: Option<String>,

    #[serde(default, alias = "item-date")]
    pub item_date: Option<String>,

    /// Defaults to 5.00
    #[serde(default, alias = "processing-fee")]
    #[schema(value_type = Option<String>)]
    pub processing_fee: Option<NumberInput>,

    /// Defaults to 2.00
    #[serde(default, alias = "storage-fee")]
    #[schema(value_type = Option<String>)]
    pub storage_fee: Option<NumberInput>,

    /// Defaults to 1.00
    #[serde(default, alias = "late-fee")]
    #[schema(value_type = Option<String>)]
    pub late_fee: Option<NumberInput>,

    /// Optional; when present it must equal the sum of the fees
    #[serde(default, alias = "total-amount")]
    #[schema(value_type = Option<String>)]
    pub total_amount: Option<NumberInput>,

    #[serde(default, alias = "invoice-notes")]
    pub notes: Option<String>,
}

fn fee(
    input: Option<NumberInput>,
    field: &str,
    default: Decimal,
    errors: &mut Vec<FieldError>,
) -> Decimal {
    match optional_decimal(input, field) {
        Ok(Some(value)) if value.is_sign_negative() => {
            errors.push(FieldError::new(field, format!("{} must not be negative", label(field))));
            default
        }
        Ok(Some(value)) if value.round_dp(2) != value => {
            errors.push(FieldError::new(
                field,
                format!("{} can have at most 2 decimal places", label(field)),
            ));
            default
        }
        Ok(Some(value)) if value > MAX_INVOICE_AMOUNT => {
            errors.push(FieldError::new(
                field,
                format!("{} must be at most {}", label(field), MAX_INVOICE_AMOUNT),
            ));
            default
        }
        Ok(Some(value)) => value,
        Ok(None) => default,
        Err(e) => {
            errors.push(e);
            default
        }
    }
}

fn required_date(field: &str, value: &str, errors: &mut Vec<FieldError>) -> Option<NaiveDate> {
    if value.is_empty() {
        errors.push(FieldError::new(field, format!("{} is required", label(field))));
        return None;
    }
    parse_date(field, value).map_err(|e| errors.push(e)).ok()
}

impl CreateInvoiceDto {
    fn trimmed(self) -> Self {
        Self {
            date: self.date.trim().to_string(),
            due_date: self.due_date.trim().to_string(),
            status: non_empty(self.status),
            client_name: self.client_name.trim().to_string(),
            client_email: self.client_email.trim().to_string(),
            client_phone: non_empty(self.client_phone),
            client_id: non_empty(self.client_id),
            item_description: non_empty(self.item_description),
            item_location: non_empty(self.item_location),
            item_date: non_empty(self.item_date),
            notes: non_empty(self.notes),
            ..self
        }
    }

    /// Validate the whole form at once. The stored total is always the sum of the fees.
    pub fn into_create(self) -> Result<CreateInvoice, AppError> {
        let dto = self.trimmed();
        let mut errors = match dto.validate() {
            Ok(()) => Vec::new(),
            Err(e) => field_errors(&e),
        };

        let date = required_date("date", &dto.date, &mut errors);
        let due_date = required_date("due_date", &dto.due_date, &mut errors);
        if let (Some(date), Some(due)) = (date, due_date) {
            if due < date {
                errors.push(FieldError::new(
                    "due_date",
                    "Due date cannot be before the invoice date",
                ));
            }
        }

        let status = match dto.status.as_deref() {
            None => InvoiceStatus::Pending,
            Some(s) => s.parse::<InvoiceStatus>().unwrap_or_else(|msg| {
                errors.push(FieldError::new("status", msg));
                InvoiceStatus::Pending
            }),
        };

        let report_id = match optional_decimal(dto.report_id, "report_id") {
            Ok(Some(id)) if id.fract().is_zero() && id.is_sign_positive() && !id.is_zero() => {
                id.to_i64()
            }
            Ok(Some(_)) => {
                errors.push(FieldError::new("report_id", "Report must be a valid report id"));
                None
            }
            Ok(None) => {
                errors.push(FieldError::new("report_id", "Report is required"));
                None
            }
            Err(e) => {
                errors.push(e);
                None
            }
        };

        let item_date = dto
            .item_date
            .as_deref()
            .and_then(|d| parse_date("item_date", d).map_err(|e| errors.push(e)).ok());

        let defaults = InvoiceFees::default();
        let fees = InvoiceFees {
            processing: fee(dto.processing_fee, "processing_fee", defaults.processing, &mut errors),
            storage: fee(dto.storage_fee, "storage_fee", defaults.storage, &mut errors),
            late: fee(dto.late_fee, "late_fee", defaults.late, &mut errors),
        };

        match optional_decimal(dto.total_amount, "total_amount") {
            _ if fees.total() > MAX_INVOICE_AMOUNT => errors.push(FieldError::new(
                "total_amount",
                format!("The fees add up to more than {}", MAX_INVOICE_AMOUNT),
            )),
            Ok(Some(total)) if total != fees.total() => errors.push(FieldError::new(
                "total_amount",
                format!(
                    "Total amount must equal the sum of the fees ({})",
                    fees.total().round_dp(2)
                ),
            )),
            Ok(_) => {}
            Err(e) => errors.push(e),
        }

        if !errors.is_empty() {
            errors.sort_by(|a, b| a.field.cmp(&b.field));
            return Err(AppError::InvalidFields(errors));
        }

        match (date, due_date, report_id) {
            (Some(date), Some(due_date), Some(report_id)) => Ok(CreateInvoice {
                date,
                due_date,
                status,
                client_name: dto.client_name,
                client_email: dto.client_email.to_lowercase(),
                client_phone: dto.client_phone,
                client_id: dto.client_id,
                report_id,
                item_description: dto.item_description,
                item_location: dto.item_location,
                item_date,
                fees,
                notes: dto.notes,
            }),
            _ => Err(AppError::Validation("Invoice is incomplete".to_string())),
        }
    }
}

/// Request DTO for moving an invoice to another status
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateInvoiceStatusDto {
    pub status: String,
}

impl UpdateInvoiceStatusDto {
    pub fn parse(&self) -> Result<InvoiceStatus, AppError> {
        self.status
            .parse::<InvoiceStatus>()
            .map_err(|msg| AppError::InvalidFields(vec![FieldError::new("status", msg)]))
    }
}

/// Response DTO for an invoice
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvoiceResponseDto {
    pub id: i64,
    pub invoice_number: String,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    /// Statuses this invoice may move to next
    pub next_statuses: Vec<InvoiceStatus>,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub client_id: Option<String>,
    pub report_id: i64,
    pub item_description: Option<String>,
    pub item_location: Option<String>,
    pub item_date: Option<NaiveDate>,
    #[schema(value_type = String)]
    pub processing_fee: Decimal,
    #[schema(value_type = String)]
    pub storage_fee: Decimal,
    #[schema(value_type = String)]
    pub late_fee: Decimal,
    #[schema(value_type = String)]
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Invoice> for InvoiceResponseDto {
    fn from(invoice: Invoice) -> Self {
        Self {
            next_statuses: invoice.status.next_statuses().to_vec(),
            id: invoice.id,
            invoice_number: invoice.invoice_number,
            date: invoice.date,
            due_date: invoice.due_date,
            status: invoice.status,
            client_name: invoice.client_name,
            client_email: invoice.client_email,
            client_phone: invoice.client_phone,
            client_id: invoice.client_id,
            report_id: invoice.report_id,
            item_description: invoice.item_description,
            item_location: invoice.item_location,
            item_date: invoice.item_date,
            processing_fee: invoice.processing_fee,
            storage_fee: invoice.storage_fee,
            late_fee: invoice.late_fee,
            total_amount: invoice.total_amount,
            notes: invoice.notes,
            created_at: invoice.created_at,
        }
    }
}
