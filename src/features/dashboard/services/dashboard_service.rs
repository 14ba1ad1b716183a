use chrono::NaiveDate;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::dashboard::dtos::DashboardStatsDto;

/// Read-only statistics over reports, catalog items and invoices
pub struct DashboardService {
    pool: PgPool,
}

impl DashboardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All dashboard counts in one round trip; "today" is `today`
    pub async fn stats(&self, today: NaiveDate) -> Result<DashboardStatsDto> {
        sqlx::query_as::<_, DashboardStatsDto>(
            r#"
            SELECT
                r.total_reports,
                r.lost_reports,
                r.found_reports,
                (SELECT COUNT(*) FROM catalog_items) AS catalog_items,
                i.total_invoices,
                r.today_lost,
                r.today_found,
                i.today_invoices
            FROM (
                SELECT
                    COUNT(*) AS total_reports,
                    COUNT(*) FILTER (WHERE status = 'lost') AS lost_reports,
                    COUNT(*) FILTER (WHERE status = 'found') AS found_reports,
                    COUNT(*) FILTER (WHERE status = 'lost' AND date = $1) AS today_lost,
                    COUNT(*) FILTER (WHERE status = 'found' AND date = $1) AS today_found
                FROM reports
            ) r,
            (
                SELECT
                    COUNT(*) AS total_invoices,
                    COUNT(*) FILTER (WHERE date = $1) AS today_invoices
                FROM invoices
            ) i
            "#,
        )
        .bind(today)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to compute dashboard stats: {:?}", e);
            AppError::Database(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::catalog::models::{CreateCatalogItem, ItemCategory};
    use crate::features::catalog::CatalogService;
    use crate::features::reports::models::{CreateReport, ReportDetails};
    use crate::features::reports::ReportService;

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_stats_count_by_status_and_day(pool: PgPool) {
        let today = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let dashboard = DashboardService::new(pool.clone());
        assert_eq!(dashboard.stats(today).await.unwrap(), DashboardStatsDto::default());

        CatalogService::new(pool.clone())
            .create(&CreateCatalogItem {
                name: "Gold Necklace".into(),
                category: ItemCategory::Jewelry,
                date: today,
                description: "thin chain".into(),
                color: None,
                brand: None,
                value: None,
                created_by: None,
            })
            .await
            .unwrap();

        let reports = ReportService::new(pool.clone());
        for (details, date) in [
            (
                ReportDetails::Lost {
                    student_id: "21-001".into(),
                    phone: None,
                },
                today,
            ),
            (
                ReportDetails::Found {
                    phone: "555-0100".into(),
                    student_id: None,
                },
                today.pred_opt().unwrap(),
            ),
        ] {
            reports
                .submit(
                    &CreateReport {
                        item_name: "Gold Necklace".into(),
                        details,
                        date,
                        location: "Gym".into(),
                        description: "by the lockers".into(),
                        contact: "x@example.com".into(),
                        program: None,
                        department: None,
                    },
                    None,
                )
                .await
                .unwrap();
        }

        let stats = dashboard.stats(today).await.unwrap();
        assert_eq!(stats.total_reports, 2);
        assert_eq!(stats.lost_reports, 1);
        assert_eq!(stats.found_reports, 1);
        assert_eq!(stats.catalog_items, 1);
        assert_eq!(stats.today_lost, 1);
        assert_eq!(stats.today_found, 0);
        assert_eq!(stats.total_invoices, 0);
    }
}
