use sqlx::PgPool;

use crate::core::database::{constraint_violation, ConstraintViolation};
use crate::core::error::{AppError, Result};
use crate::features::catalog::models::{
    CatalogItem, CatalogItemSummary, CreateCatalogItem, ItemCategory, UpdateCatalogItem,
};

const ITEM_COLUMNS: &str =
    "name, category, date, description, color, brand, value, created_by, created_at, updated_at";

/// Service for the name-keyed item catalog
pub struct CatalogService {
    pool: PgPool,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn duplicate(name: &str) -> AppError {
        AppError::conflict(
            "name",
            format!("A catalog item named '{}' already exists", name),
        )
    }

    pub async fn list(&self) -> Result<Vec<CatalogItem>> {
        let query = format!("SELECT {} FROM catalog_items ORDER BY name ASC", ITEM_COLUMNS);

        sqlx::query_as::<_, CatalogItem>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list catalog items: {:?}", e);
                AppError::Database(e)
            })
    }

    /// Item names for the report form's picker
    pub async fn names(&self) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT name FROM catalog_items ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list catalog item names: {:?}", e);
                AppError::Database(e)
            })
    }

    pub async fn find(&self, name: &str) -> Result<Option<CatalogItem>> {
        let query = format!("SELECT {} FROM catalog_items WHERE name = $1", ITEM_COLUMNS);

        sqlx::query_as::<_, CatalogItem>(&query)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch catalog item {}: {:?}", name, e);
                AppError::Database(e)
            })
    }

    pub async fn get(&self, name: &str) -> Result<CatalogItem> {
        self.find(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Catalog item '{}' not found", name)))
    }

    pub async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM catalog_items")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count catalog items: {:?}", e);
                AppError::Database(e)
            })
    }

    /// Every item with the number of reports referencing it
    pub async fn summaries(&self) -> Result<Vec<CatalogItemSummary>> {
        sqlx::query_as::<_, CatalogItemSummary>(
            r#"
            SELECT c.name, c.category, c.date, COUNT(r.id) AS report_count
            FROM catalog_items c
            LEFT JOIN reports r ON r.item_name = c.name
            GROUP BY c.name, c.category, c.date
            ORDER BY c.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to summarize catalog items: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn create(&self, data: &CreateCatalogItem) -> Result<CatalogItem> {
        if self.find(&data.name).await?.is_some() {
            return Err(Self::duplicate(&data.name));
        }

        let query = format!(
            "INSERT INTO catalog_items (name, category, date, description, color, brand, value, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            ITEM_COLUMNS
        );

        let item = sqlx::query_as::<_, CatalogItem>(&query)
            .bind(&data.name)
            .bind(data.category)
            .bind(data.date)
            .bind(&data.description)
            .bind(&data.color)
            .bind(&data.brand)
            .bind(data.value)
            .bind(data.created_by)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match constraint_violation(&e) {
                Some(ConstraintViolation::Unique(_)) => Self::duplicate(&data.name),
                _ => {
                    tracing::error!("Failed to create catalog item: {:?}", e);
                    AppError::Database(e)
                }
            })?;

        tracing::info!("Created catalog item: {} ({})", item.name, item.category);

        Ok(item)
    }

    /// Update the non-key fields. Reports keep the category they were filed under, so
    /// the category cannot change while any report references the item.
    pub async fn update(&self, name: &str, data: &UpdateCatalogItem) -> Result<CatalogItem> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        // FOR UPDATE waits out report submissions holding a share lock on the row
        let current: ItemCategory = sqlx::query_scalar(
            "SELECT category FROM catalog_items WHERE name = $1 FOR UPDATE",
        )
        .bind(name)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to lock catalog item {}: {:?}", name, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Catalog item '{}' not found", name)))?;

        if current != data.category {
            let report_count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE item_name = $1")
                    .bind(name)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to count reports for {}: {:?}", name, e);
                        AppError::Database(e)
                    })?;
            if report_count > 0 {
                return Err(AppError::conflict(
                    "category",
                    format!(
                        "Catalog item '{}' is referenced by {} report(s); its category cannot change",
                        name, report_count
                    ),
                ));
            }
        }

        let query = format!(
            "UPDATE catalog_items SET category = $2, date = $3, description = $4, color = $5, \
             brand = $6, value = $7, updated_at = NOW() WHERE name = $1 RETURNING {}",
            ITEM_COLUMNS
        );

        let item = sqlx::query_as::<_, CatalogItem>(&query)
            .bind(name)
            .bind(data.category)
            .bind(data.date)
            .bind(&data.description)
            .bind(&data.color)
            .bind(&data.brand)
            .bind(data.value)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update catalog item {}: {:?}", name, e);
                AppError::Database(e)
            })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit catalog update: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Updated catalog item: {}", item.name);

        Ok(item)
    }

    /// Delete an item nobody reported. Referenced items are refused with a conflict.
    pub async fn delete(&self, name: &str) -> Result<()> {
        let referenced = |count: i64| {
            AppError::conflict(
                "name",
                format!(
                    "Catalog item '{}' is referenced by {} report(s) and cannot be deleted",
                    name, count
                ),
            )
        };

        let report_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE item_name = $1")
                .bind(name)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to count reports for {}: {:?}", name, e);
                    AppError::Database(e)
                })?;
        if report_count > 0 {
            return Err(referenced(report_count));
        }

        let result = sqlx::query("DELETE FROM catalog_items WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| match constraint_violation(&e) {
                // a report landed between the count and the delete
                Some(ConstraintViolation::ForeignKey(_)) => referenced(1),
                _ => {
                    tracing::error!("Failed to delete catalog item {}: {:?}", name, e);
                    AppError::Database(e)
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Catalog item '{}' not found",
                name
            )));
        }

        tracing::info!("Deleted catalog item: {}", name);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::models::{CreateReport, ReportDetails};
    use crate::features::reports::ReportService;
    use chrono::NaiveDate;

    fn umbrella() -> CreateCatalogItem {
        CreateCatalogItem {
            name: "Black Umbrella".into(),
            category: ItemCategory::Other,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            description: "plain black umbrella".into(),
            color: None,
            brand: None,
            value: None,
            created_by: None,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_names_are_unique(pool: PgPool) {
        let service = CatalogService::new(pool);
        service.create(&umbrella()).await.unwrap();

        let err = service.create(&umbrella()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(service.count().await.unwrap(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_update_and_delete(pool: PgPool) {
        let service = CatalogService::new(pool);
        service.create(&umbrella()).await.unwrap();

        let updated = service
            .update(
                "Black Umbrella",
                &UpdateCatalogItem {
                    category: ItemCategory::Bags,
                    date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
                    description: "folding umbrella".into(),
                    color: Some("black".into()),
                    brand: None,
                    value: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.category, ItemCategory::Bags);

        service.delete("Black Umbrella").await.unwrap();
        assert!(service.find("Black Umbrella").await.unwrap().is_none());
        assert!(matches!(
            service.delete("Black Umbrella").await,
            Err(AppError::NotFound(_))
        ));
    }

    fn folding_umbrella(category: ItemCategory) -> UpdateCatalogItem {
        UpdateCatalogItem {
            category,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            description: "folding umbrella".into(),
            color: Some("black".into()),
            brand: None,
            value: None,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_reported_item_keeps_its_category(pool: PgPool) {
        let service = CatalogService::new(pool.clone());
        service.create(&umbrella()).await.unwrap();
        let report = ReportService::new(pool.clone())
            .submit(
                &CreateReport {
                    item_name: "Black Umbrella".into(),
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
                },
                None,
            )
            .await
            .unwrap();

        let err = service
            .update("Black Umbrella", &folding_umbrella(ItemCategory::Bags))
            .await
            .unwrap_err();
        match err {
            AppError::Conflict(errors) => assert_eq!(errors[0].field, "category"),
            other => panic!("expected a conflict, got {:?}", other),
        }
        let item = service.find("Black Umbrella").await.unwrap().unwrap();
        assert_eq!(item.category, ItemCategory::Other);
        assert_eq!(item.description, "plain black umbrella");

        // other fields may still change, and the report is left as filed
        let updated = service
            .update("Black Umbrella", &folding_umbrella(ItemCategory::Other))
            .await
            .unwrap();
        assert_eq!(updated.description, "folding umbrella");
        let (category, updated_at): (ItemCategory, chrono::DateTime<chrono::Utc>) =
            sqlx::query_as("SELECT category, updated_at FROM reports WHERE id = $1")
                .bind(report.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(category, ItemCategory::Other);
        assert_eq!(updated_at, report.updated_at);
    }
}
