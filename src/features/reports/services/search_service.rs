use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::error::{AppError, Result};
use crate::features::reports::dtos::SearchFilters;
use crate::features::reports::models::Report;
use crate::features::reports::services::report_service::REPORT_COLUMNS;

/// Escape LIKE wildcards so user text matches literally
fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Build the filtered, ordered report query. No pagination: every match is returned.
pub fn build_search_query(filters: &SearchFilters) -> QueryBuilder<'static, Postgres> {
    let mut builder: QueryBuilder<'static, Postgres> =
        QueryBuilder::new(format!("SELECT {} FROM reports r WHERE TRUE", REPORT_COLUMNS));

    if let Some(term) = &filters.term {
        let pattern = like_pattern(term);
        builder
            .push(" AND (r.item_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR r.description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR r.location ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(category) = filters.category {
        builder.push(" AND r.category = ").push_bind(category);
    }

    if let Some(status) = filters.status {
        builder.push(" AND r.status = ").push_bind(status);
    }

    if let Some(from) = filters.date_from {
        builder.push(" AND r.date >= ").push_bind(from);
    }

    if let Some(to) = filters.date_to {
        builder.push(" AND r.date <= ").push_bind(to);
    }

    if let Some(location) = &filters.location {
        builder
            .push(" AND r.location ILIKE ")
            .push_bind(like_pattern(location));
    }

    builder.push(" ORDER BY ").push(filters.sort.order_clause());
    builder
}

/// Service for report search; pages and the JSON API share it
pub struct SearchService {
    pool: PgPool,
}

impl SearchService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn search(&self, filters: &SearchFilters) -> Result<Vec<Report>> {
        let mut builder = build_search_query(filters);

        let reports = builder
            .build_query_as::<Report>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to search reports: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::debug!("Search {:?} matched {} report(s)", filters, reports.len());

        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::catalog::models::{CreateCatalogItem, ItemCategory};
    use crate::features::catalog::CatalogService;
    use crate::features::reports::dtos::SortKey;
    use crate::features::reports::models::{CreateReport, ReportDetails, ReportStatus};
    use crate::features::reports::ReportService;
    use chrono::NaiveDate;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("100%_off"), "%100\\%\\_off%");
        assert_eq!(like_pattern("umbrella"), "%umbrella%");
    }

    #[test]
    fn test_empty_filters_have_no_conditions() {
        let builder = build_search_query(&SearchFilters::default());
        let sql = builder.sql();
        assert!(sql.ends_with("WHERE TRUE ORDER BY r.date DESC, r.id DESC"));
    }

    #[test]
    fn test_filters_become_bound_parameters() {
        let filters = SearchFilters {
            term: Some("umbrella".into()),
            status: Some(ReportStatus::Found),
            location: Some("library".into()),
            sort: SortKey::NameAsc,
            ..Default::default()
        };
        let builder = build_search_query(&filters);
        let sql = builder.sql();
        assert!(sql.contains("r.item_name ILIKE $1"));
        assert!(sql.contains("r.location ILIKE $3"));
        assert!(sql.contains("r.status = $4"));
        assert!(sql.contains("r.location ILIKE $5"));
        assert!(!sql.contains("umbrella"));
        assert!(sql.ends_with("ORDER BY r.item_name ASC, r.id ASC"));
    }

    async fn seed(pool: &PgPool) {
        let catalog = CatalogService::new(pool.clone());
        let reports = ReportService::new(pool.clone());
        for (name, category) in [
            ("Black Umbrella", ItemCategory::Other),
            ("Car Keys", ItemCategory::Keys),
        ] {
            catalog
                .create(&CreateCatalogItem {
                    name: name.into(),
                    category,
                    date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                    description: format!("{} in the catalog", name),
                    color: None,
                    brand: None,
                    value: None,
                    created_by: None,
                })
                .await
                .unwrap();
        }

        let lost = ReportDetails::Lost {
            student_id: "21-001".into(),
            phone: None,
        };
        let found = ReportDetails::Found {
            phone: "01700000000".into(),
            student_id: None,
        };
        for (name, details, day, location) in [
            ("Black Umbrella", lost.clone(), 2, "Main Library"),
            ("Black Umbrella", found, 3, "Cafeteria"),
            ("Car Keys", lost, 4, "Parking Lot A"),
        ] {
            reports
                .submit(
                    &CreateReport {
                        item_name: name.into(),
                        details,
                        date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
                        location: location.into(),
                        description: "reported in tests".into(),
                        contact: "alice@x.com".into(),
                        program: None,
                        department: None,
                    },
                    None,
                )
                .await
                .unwrap();
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_no_filters_returns_every_report_once(pool: PgPool) {
        seed(&pool).await;
        let service = SearchService::new(pool);

        let all = service.search(&SearchFilters::default()).await.unwrap();
        let mut ids: Vec<_> = all.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 3);
        ids.dedup();
        assert_eq!(ids.len(), 3);
        assert!(all.windows(2).all(|w| w[0].date >= w[1].date));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_status_filter_returns_matching_subset(pool: PgPool) {
        seed(&pool).await;
        let service = SearchService::new(pool);

        let lost = service
            .search(&SearchFilters {
                status: Some(ReportStatus::Lost),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(lost.len(), 2);
        assert!(lost.iter().all(|r| r.status == ReportStatus::Lost));

        let by_term = service
            .search(&SearchFilters {
                term: Some("LIBRARY".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_term.len(), 1);
        assert_eq!(by_term[0].item_name, "Black Umbrella");
    }
}
