use sqlx::PgPool;
use uuid::Uuid;

use crate::core::database::{constraint_violation, ConstraintViolation};
use crate::core::error::{AppError, Result};
use crate::features::catalog::models::ItemCategory;
use crate::features::reports::models::{CreateReport, Report, ReportStatus};

pub(crate) const REPORT_COLUMNS: &str = "r.id, r.item_name, r.category, r.status, r.date, r.location, \
     r.description, r.contact, r.phone, r.student_id, r.program, r.department, r.reported_by, \
     r.created_at, r.updated_at";

/// Message shown when a report names an item the catalog does not have
pub fn missing_item_message(name: &str) -> String {
    format!(
        "Catalog item '{}' does not exist. Ask an administrator to create it in the catalog \
         first, then submit your report again.",
        name
    )
}

/// Service for lost/found reports
pub struct ReportService {
    pool: PgPool,
}

impl ReportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a report for an existing catalog item, copying its category.
    ///
    /// The catalog row is share-locked for the duration of the transaction, so it
    /// cannot be deleted or renamed between the check and the insert.
    pub async fn submit(&self, data: &CreateReport, reported_by: Option<Uuid>) -> Result<Report> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let category: Option<ItemCategory> =
            sqlx::query_scalar("SELECT category FROM catalog_items WHERE name = $1 FOR SHARE")
                .bind(&data.item_name)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to look up catalog item: {:?}", e);
                    AppError::Database(e)
                })?;

        let Some(category) = category else {
            tracing::info!(
                "Rejected report for unknown catalog item: {}",
                data.item_name
            );
            return Err(AppError::Referential(missing_item_message(&data.item_name)));
        };

        let (phone, student_id) = data.details.contact_columns();
        let query = format!(
            r#"
            INSERT INTO reports AS r (
                item_name, category, status, date, location, description, contact,
                phone, student_id, program, department, reported_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        );

        let report = sqlx::query_as::<_, Report>(&query)
            .bind(&data.item_name)
            .bind(category)
            .bind(data.details.status())
            .bind(data.date)
            .bind(&data.location)
            .bind(&data.description)
            .bind(&data.contact)
            .bind(phone)
            .bind(student_id)
            .bind(&data.program)
            .bind(&data.department)
            .bind(reported_by)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match constraint_violation(&e) {
                Some(ConstraintViolation::ForeignKey(_)) => {
                    AppError::Referential(missing_item_message(&data.item_name))
                }
                _ => {
                    tracing::error!("Failed to create report: {:?}", e);
                    AppError::Database(e)
                }
            })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit report: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Created {} report {} for catalog item: {}",
            report.status,
            report.id,
            report.item_name
        );

        Ok(report)
    }

    pub async fn get(&self, id: i64) -> Result<Report> {
        let query = format!("SELECT {} FROM reports r WHERE r.id = $1", REPORT_COLUMNS);

        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch report {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))
    }

    /// Most recently submitted reports
    pub async fn recent(&self, limit: i64) -> Result<Vec<Report>> {
        let query = format!(
            "SELECT {} FROM reports r ORDER BY r.created_at DESC, r.id DESC LIMIT $1",
            REPORT_COLUMNS
        );

        sqlx::query_as::<_, Report>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch recent reports: {:?}", e);
                AppError::Database(e)
            })
    }

    pub async fn for_item(&self, item_name: &str) -> Result<Vec<Report>> {
        let query = format!(
            "SELECT {} FROM reports r WHERE r.item_name = $1 ORDER BY r.date DESC, r.id DESC",
            REPORT_COLUMNS
        );

        sqlx::query_as::<_, Report>(&query)
            .bind(item_name)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch reports for {}: {:?}", item_name, e);
                AppError::Database(e)
            })
    }

    pub async fn with_status(&self, status: ReportStatus) -> Result<Vec<Report>> {
        let query = format!(
            "SELECT {} FROM reports r WHERE r.status = $1 ORDER BY r.date DESC, r.id DESC",
            REPORT_COLUMNS
        );

        sqlx::query_as::<_, Report>(&query)
            .bind(status)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch {} reports: {:?}", status, e);
                AppError::Database(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::catalog::models::CreateCatalogItem;
    use crate::features::catalog::CatalogService;
    use crate::features::reports::models::ReportDetails;
    use chrono::NaiveDate;

    fn report_for(name: &str) -> CreateReport {
        CreateReport {
            item_name: name.to_string(),
            details: ReportDetails::Lost {
                student_id: "21-001".into(),
                phone: None,
            },
            date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            location: "Main Library".into(),
            description: "left near the entrance".into(),
            contact: "alice@x.com".into(),
            program: None,
            department: None,
        }
    }

    async fn report_count(pool: &PgPool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM reports")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[test]
    fn test_missing_item_message_names_the_remedy() {
        let message = missing_item_message("Red Umbrella");
        assert!(message.contains("'Red Umbrella'"));
        assert!(message.contains("create it in the catalog"));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_umbrella_scenario(pool: PgPool) {
        let catalog = CatalogService::new(pool.clone());
        let reports = ReportService::new(pool.clone());

        catalog
            .create(&CreateCatalogItem {
                name: "Black Umbrella".into(),
                category: ItemCategory::Other,
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                description: "plain black umbrella".into(),
                color: None,
                brand: None,
                value: None,
                created_by: None,
            })
            .await
            .unwrap();

        let report = reports
            .submit(&report_for("Black Umbrella"), None)
            .await
            .unwrap();
        assert_eq!(report.category, ItemCategory::Other);
        assert_eq!(report.status, ReportStatus::Lost);
        assert_eq!(report_count(&pool).await, 1);

        let err = reports
            .submit(&report_for("Red Umbrella"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Referential(_)));
        assert!(err.public_message().contains("Red Umbrella"));
        assert_eq!(report_count(&pool).await, 1);

        // referenced items cannot be deleted out from under their reports
        let err = catalog.delete("Black Umbrella").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
