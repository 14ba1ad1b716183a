use chrono::{Datelike, NaiveDate};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::database::{constraint_violation, ConstraintViolation};
use crate::core::error::{AppError, Result};
use crate::features::invoices::models::{CreateInvoice, Invoice, InvoiceStats, InvoiceStatus};
use crate::features::reports::models::ReportStatus;
use crate::shared::types::FieldError;

const INVOICE_COLUMNS: &str = "id, invoice_number, date, due_date, status, client_name, \
     client_email, client_phone, client_id, report_id, item_description, item_location, \
     item_date, processing_fee, storage_fee, late_fee, total_amount, notes, issued_by, \
     created_at, updated_at";

pub const FOUND_REPORT_REQUIRED: &str = "Invoices can only be issued for found items";

/// `INV-<year>-<7-digit sequence>`
pub fn format_invoice_number(year: i32, sequence: i64) -> String {
    format!("INV-{}-{:07}", year, sequence)
}

/// First day of `today`'s month and first day of the following month
pub fn month_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today.with_day(1).unwrap_or(today);
    let next = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
    };
    (start, next.unwrap_or(start))
}

fn missing_report(report_id: i64) -> AppError {
    AppError::Referential(format!(
        "Report {} does not exist. Pick a found item from the list.",
        report_id
    ))
}

/// Service for invoices issued against found reports
pub struct InvoiceService {
    pool: PgPool,
}

impl InvoiceService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Issue an invoice. The referenced report is share-locked while its status is checked.
    pub async fn create(&self, data: &CreateInvoice, issued_by: Option<Uuid>) -> Result<Invoice> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let status: Option<ReportStatus> =
            sqlx::query_scalar("SELECT status FROM reports WHERE id = $1 FOR SHARE")
                .bind(data.report_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to look up report {}: {:?}", data.report_id, e);
                    AppError::Database(e)
                })?;

        match status {
            None => return Err(missing_report(data.report_id)),
            Some(ReportStatus::Lost) => {
                return Err(AppError::InvalidFields(vec![FieldError::new(
                    "report_id",
                    FOUND_REPORT_REQUIRED,
                )]))
            }
            Some(ReportStatus::Found) => {}
        }

        let sequence: i64 = sqlx::query_scalar("SELECT nextval('invoice_number_seq')")
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to draw invoice number: {:?}", e);
                AppError::Database(e)
            })?;
        let invoice_number = format_invoice_number(data.date.year(), sequence);

        let query = format!(
            r#"
            INSERT INTO invoices (
                invoice_number, date, due_date, status, client_name, client_email,
                client_phone, client_id, report_id, item_description, item_location, item_date,
                processing_fee, storage_fee, late_fee, total_amount, notes, issued_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING {}
            "#,
            INVOICE_COLUMNS
        );

        let invoice = sqlx::query_as::<_, Invoice>(&query)
            .bind(&invoice_number)
            .bind(data.date)
            .bind(data.due_date)
            .bind(data.status)
            .bind(&data.client_name)
            .bind(&data.client_email)
            .bind(&data.client_phone)
            .bind(&data.client_id)
            .bind(data.report_id)
            .bind(&data.item_description)
            .bind(&data.item_location)
            .bind(data.item_date)
            .bind(data.fees.processing)
            .bind(data.fees.storage)
            .bind(data.fees.late)
            .bind(data.fees.total())
            .bind(&data.notes)
            .bind(issued_by)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match constraint_violation(&e) {
                Some(ConstraintViolation::ForeignKey(_)) => missing_report(data.report_id),
                _ => {
                    tracing::error!("Failed to create invoice: {:?}", e);
                    AppError::Database(e)
                }
            })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit invoice: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Issued invoice {} for report {} ({})",
            invoice.invoice_number,
            invoice.report_id,
            invoice.total_amount
        );

        Ok(invoice)
    }

    /// Newest first
    pub async fn list(&self) -> Result<Vec<Invoice>> {
        let query = format!(
            "SELECT {} FROM invoices ORDER BY created_at DESC, id DESC",
            INVOICE_COLUMNS
        );

        sqlx::query_as::<_, Invoice>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list invoices: {:?}", e);
                AppError::Database(e)
            })
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<Invoice>> {
        let query = format!(
            "SELECT {} FROM invoices ORDER BY created_at DESC, id DESC LIMIT $1",
            INVOICE_COLUMNS
        );

        sqlx::query_as::<_, Invoice>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch recent invoices: {:?}", e);
                AppError::Database(e)
            })
    }

    pub async fn get(&self, id: i64) -> Result<Invoice> {
        let query = format!("SELECT {} FROM invoices WHERE id = $1", INVOICE_COLUMNS);

        sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch invoice {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Invoice {} not found", id)))
    }

    /// Move an invoice along the status table. The row is locked for the check.
    pub async fn update_status(&self, id: i64, next: InvoiceStatus) -> Result<Invoice> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let current: InvoiceStatus =
            sqlx::query_scalar("SELECT status FROM invoices WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to lock invoice {}: {:?}", id, e);
                    AppError::Database(e)
                })?
                .ok_or_else(|| AppError::NotFound(format!("Invoice {} not found", id)))?;

        if !current.can_transition_to(next) {
            return Err(AppError::InvalidFields(vec![FieldError::new(
                "status",
                format!("An invoice cannot move from {} to {}", current, next),
            )]));
        }

        let query = format!(
            "UPDATE invoices SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            INVOICE_COLUMNS
        );
        let invoice = sqlx::query_as::<_, Invoice>(&query)
            .bind(id)
            .bind(next)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update invoice {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit invoice status: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Invoice {} moved from {} to {}",
            invoice.invoice_number,
            current,
            next
        );

        Ok(invoice)
    }

    /// Totals for the invoice page, with "this month" taken relative to `today`
    pub async fn stats(&self, today: NaiveDate) -> Result<InvoiceStats> {
        let (month_start, next_month) = month_bounds(today);

        sqlx::query_as::<_, InvoiceStats>(
            r#"
            SELECT
                COUNT(*) AS total,
                COALESCE(SUM(total_amount) FILTER (WHERE status <> 'cancelled'), 0) AS revenue,
                COUNT(*) FILTER (WHERE date >= $1 AND date < $2) AS this_month
            FROM invoices
            "#,
        )
        .bind(month_start)
        .bind(next_month)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to compute invoice stats: {:?}", e);
            AppError::Database(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::catalog::models::{CreateCatalogItem, ItemCategory};
    use crate::features::catalog::CatalogService;
    use crate::features::invoices::models::InvoiceFees;
    use crate::features::reports::models::{CreateReport, ReportDetails};
    use crate::features::reports::ReportService;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_invoice_number_format() {
        assert_eq!(format_invoice_number(2024, 42), "INV-2024-0000042");
        assert_eq!(format_invoice_number(2025, 12345678), "INV-2025-12345678");
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(
            month_bounds(date(2024, 2, 29)),
            (date(2024, 2, 1), date(2024, 3, 1))
        );
        assert_eq!(
            month_bounds(date(2024, 12, 31)),
            (date(2024, 12, 1), date(2025, 1, 1))
        );
    }

    fn invoice_for(report_id: i64) -> CreateInvoice {
        CreateInvoice {
            date: date(2024, 3, 5),
            due_date: date(2024, 3, 19),
            status: InvoiceStatus::Pending,
            client_name: "Bob".into(),
            client_email: "bob@example.com".into(),
            client_phone: None,
            client_id: None,
            report_id,
            item_description: None,
            item_location: None,
            item_date: None,
            fees: InvoiceFees::default(),
            notes: None,
        }
    }

    async fn report(pool: &PgPool, details: ReportDetails) -> i64 {
        let catalog = CatalogService::new(pool.clone());
        if catalog.find("Car Keys").await.unwrap().is_none() {
            catalog
                .create(&CreateCatalogItem {
                    name: "Car Keys".into(),
                    category: ItemCategory::Keys,
                    date: date(2024, 3, 1),
                    description: "Toyota key with a red tag".into(),
                    color: None,
                    brand: None,
                    value: None,
                    created_by: None,
                })
                .await
                .unwrap();
        }

        ReportService::new(pool.clone())
            .submit(
                &CreateReport {
                    item_name: "Car Keys".into(),
                    details,
                    date: date(2024, 3, 2),
                    location: "Parking lot B".into(),
                    description: "on the ground".into(),
                    contact: "carol@example.com".into(),
                    program: None,
                    department: None,
                },
                None,
            )
            .await
            .unwrap()
            .id
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_issue_and_settle_invoice(pool: PgPool) {
        let invoices = InvoiceService::new(pool.clone());

        let found = report(
            &pool,
            ReportDetails::Found {
                phone: "555-0100".into(),
                student_id: None,
            },
        )
        .await;
        let lost = report(
            &pool,
            ReportDetails::Lost {
                student_id: "21-001".into(),
                phone: None,
            },
        )
        .await;

        let invoice = invoices.create(&invoice_for(found), None).await.unwrap();
        assert!(invoice.invoice_number.starts_with("INV-2024-"));
        assert_eq!(invoice.total_amount, Decimal::new(800, 2));

        let err = invoices.create(&invoice_for(lost), None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidFields(_)));
        let err = invoices.create(&invoice_for(9999), None).await.unwrap_err();
        assert!(matches!(err, AppError::Referential(_)));

        let paid = invoices
            .update_status(invoice.id, InvoiceStatus::Paid)
            .await
            .unwrap();
        assert_eq!(paid.status, InvoiceStatus::Paid);
        let err = invoices
            .update_status(invoice.id, InvoiceStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidFields(_)));

        let stats = invoices.stats(date(2024, 3, 20)).await.unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.this_month, 1);
        assert_eq!(stats.revenue, Decimal::new(800, 2));
    }
}
