//! First-run data: the administrator account and a few sample catalog entries.

use chrono::NaiveDate;

use crate::core::config::SeedConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::password::hash_password_async;
use crate::features::catalog::models::{CreateCatalogItem, ItemCategory};
use crate::features::catalog::CatalogService;
use crate::features::reports::models::{CreateReport, ReportDetails};
use crate::features::reports::ReportService;
use crate::features::users::models::CreateUser;
use crate::features::users::UserService;

struct Sample {
    name: &'static str,
    category: ItemCategory,
    date: (i32, u32, u32),
    location: &'static str,
    description: &'static str,
    contact: &'static str,
    lost: bool,
}

const SAMPLES: [Sample; 3] = [
    Sample {
        name: "iPhone 13 Pro",
        category: ItemCategory::Electronics,
        date: (2024, 1, 15),
        location: "Main Library, 2nd Floor",
        description: "Black iPhone 13 Pro with blue case. Has a small scratch on the back.",
        contact: "john.doe@example.edu",
        lost: true,
    },
    Sample {
        name: "Gold Necklace",
        category: ItemCategory::Jewelry,
        date: (2024, 1, 14),
        location: "Student Center, Cafeteria",
        description: "Delicate gold chain necklace with a small pendant.",
        contact: "security@example.edu",
        lost: false,
    },
    Sample {
        name: "Car Keys",
        category: ItemCategory::Keys,
        date: (2024, 1, 13),
        location: "Parking Lot A",
        description: "Toyota car keys with a black keychain.",
        contact: "jane.smith@example.edu",
        lost: true,
    },
];

/// Sample catalog items, each paired with one report against it
pub fn sample_data() -> Result<Vec<(CreateCatalogItem, CreateReport)>> {
    SAMPLES
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let (y, m, d) = s.date;
            let date = NaiveDate::from_ymd_opt(y, m, d)
                .ok_or_else(|| AppError::Internal(format!("Invalid sample date for {}", s.name)))?;

            let details = if s.lost {
                ReportDetails::Lost {
                    student_id: format!("SAMPLE-{:03}", i + 1),
                    phone: None,
                }
            } else {
                ReportDetails::Found {
                    phone: "000-000-0000".to_string(),
                    student_id: None,
                }
            };

            let item = CreateCatalogItem {
                name: s.name.to_string(),
                category: s.category,
                date,
                description: s.description.to_string(),
                color: None,
                brand: None,
                value: None,
                created_by: None,
            };
            let report = CreateReport {
                item_name: s.name.to_string(),
                details,
                date,
                location: s.location.to_string(),
                description: s.description.to_string(),
                contact: s.contact.to_string(),
                program: None,
                department: None,
            };
            Ok((item, report))
        })
        .collect()
}

/// Seed an empty database. Tables that already hold rows are left alone.
pub async fn seed_defaults(
    config: &SeedConfig,
    users: &UserService,
    catalog: &CatalogService,
    reports: &ReportService,
) -> Result<()> {
    if !config.enabled {
        tracing::info!("Seeding disabled");
        return Ok(());
    }

    if users.count().await? == 0 {
        let admin = users
            .create(&CreateUser {
                username: config.admin_username.clone(),
                email: config.admin_email.clone(),
                password_hash: hash_password_async(&config.admin_password).await?,
                is_admin: true,
            })
            .await?;
        tracing::info!("Seeded administrator account: {}", admin.username);
    }

    if config.sample_data && catalog.count().await? == 0 {
        let samples = sample_data()?;
        let count = samples.len();
        for (item, report) in samples {
            catalog.create(&item).await?;
            reports.submit(&report, None).await?;
        }
        tracing::info!("Seeded {} sample catalog items", count);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::models::ReportStatus;
    use sqlx::PgPool;
    use tokio_test::assert_ok;

    #[test]
    fn test_sample_reports_match_their_items() {
        let samples = assert_ok!(sample_data());
        assert_eq!(samples.len(), 3);
        for (item, report) in &samples {
            assert_eq!(item.name, report.item_name);
            assert_eq!(item.date, report.date);
        }
        let statuses: Vec<_> = samples.iter().map(|(_, r)| r.details.status()).collect();
        assert_eq!(
            statuses,
            vec![ReportStatus::Lost, ReportStatus::Found, ReportStatus::Lost]
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_seeding_is_idempotent(pool: PgPool) {
        let users = UserService::new(pool.clone());
        let catalog = CatalogService::new(pool.clone());
        let reports = ReportService::new(pool.clone());
        let config = SeedConfig::default();

        seed_defaults(&config, &users, &catalog, &reports).await.unwrap();
        seed_defaults(&config, &users, &catalog, &reports).await.unwrap();

        assert_eq!(users.count().await.unwrap(), 1);
        assert_eq!(catalog.count().await.unwrap(), 3);
        let admin = users
            .find_by_login(&config.admin_username)
            .await
            .unwrap()
            .unwrap();
        assert!(admin.is_admin);
    }
}
