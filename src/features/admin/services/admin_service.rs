use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::admin::dtos::{RecordsOverviewDto, ResetPasswordDto};
use crate::features::auth::model::Principal;
use crate::features::auth::password::hash_password_async;
use crate::features::catalog::CatalogService;
use crate::features::invoices::InvoiceService;
use crate::features::reports::ReportService;
use crate::features::users::models::User;
use crate::features::users::UserService;
use crate::shared::validation::field_errors;

pub const SELF_DEMOTION: &str = "You cannot revoke your own admin privileges";

/// Rows shown per section of the records overview
const OVERVIEW_LIMIT: i64 = 20;

/// An admin may change anyone's flag except revoke their own
pub fn check_admin_change(actor: &Principal, target: Uuid, is_admin: bool) -> Result<()> {
    if actor.id == target && !is_admin {
        return Err(AppError::Validation(SELF_DEMOTION.to_string()));
    }
    Ok(())
}

/// Account administration and the records overview
pub struct AdminService {
    users: Arc<UserService>,
    catalog: Arc<CatalogService>,
    reports: Arc<ReportService>,
    invoices: Arc<InvoiceService>,
}

impl AdminService {
    pub fn new(
        users: Arc<UserService>,
        catalog: Arc<CatalogService>,
        reports: Arc<ReportService>,
        invoices: Arc<InvoiceService>,
    ) -> Self {
        Self {
            users,
            catalog,
            reports,
            invoices,
        }
    }

    pub async fn users(&self) -> Result<Vec<User>> {
        self.users.list().await
    }

    pub async fn set_admin(&self, actor: &Principal, target: Uuid, is_admin: bool) -> Result<User> {
        check_admin_change(actor, target, is_admin)?;

        let user = self.users.set_admin(target, is_admin).await?;
        tracing::info!(
            "{} {} admin privileges for {}",
            actor.username,
            if is_admin { "granted" } else { "revoked" },
            user.username
        );

        Ok(user)
    }

    /// Set a new password for another account; its sessions are revoked with it
    pub async fn reset_password(
        &self,
        actor: &Principal,
        target: Uuid,
        dto: &ResetPasswordDto,
    ) -> Result<User> {
        dto.validate()
            .map_err(|e| AppError::InvalidFields(field_errors(&e)))?;

        let hash = hash_password_async(&dto.password).await?;
        let user = self.users.reset_password(target, &hash).await?;
        tracing::info!("{} reset the password of {}", actor.username, user.username);

        Ok(user)
    }

    pub async fn records_overview(&self) -> Result<RecordsOverviewDto> {
        let items = self.catalog.summaries().await?;
        let reports = self.reports.recent(OVERVIEW_LIMIT).await?;
        let invoices = self.invoices.recent(OVERVIEW_LIMIT).await?;

        Ok(RecordsOverviewDto {
            items,
            reports: reports.into_iter().map(Into::into).collect(),
            invoices: invoices.into_iter().map(Into::into).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::models::CreateUser;
    use sqlx::PgPool;

    fn admin() -> Principal {
        Principal {
            id: Uuid::new_v4(),
            username: "carol".into(),
            email: "carol@example.com".into(),
            is_admin: true,
        }
    }

    #[test]
    fn test_admin_cannot_demote_self() {
        let me = admin();
        let err = check_admin_change(&me, me.id, false).unwrap_err();
        assert_eq!(err.public_message(), SELF_DEMOTION);

        assert!(check_admin_change(&me, me.id, true).is_ok());
        assert!(check_admin_change(&me, Uuid::new_v4(), false).is_ok());
    }

    fn service(pool: &PgPool) -> AdminService {
        AdminService::new(
            Arc::new(UserService::new(pool.clone())),
            Arc::new(CatalogService::new(pool.clone())),
            Arc::new(ReportService::new(pool.clone())),
            Arc::new(InvoiceService::new(pool.clone())),
        )
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_promote_and_reset(pool: PgPool) {
        let users = UserService::new(pool.clone());
        let bob = users
            .create(&CreateUser {
                username: "bob".into(),
                email: "bob@example.com".into(),
                password_hash: crate::features::auth::password::hash_password("secret1").unwrap(),
                is_admin: false,
            })
            .await
            .unwrap();

        let admin_service = service(&pool);
        let promoted = admin_service.set_admin(&admin(), bob.id, true).await.unwrap();
        assert!(promoted.is_admin);

        let err = admin_service
            .reset_password(
                &admin(),
                bob.id,
                &ResetPasswordDto {
                    password: "abc".into(),
                    confirm_password: "abc".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidFields(_)));

        let reset = admin_service
            .reset_password(
                &admin(),
                bob.id,
                &ResetPasswordDto {
                    password: "newsecret".into(),
                    confirm_password: "newsecret".into(),
                },
            )
            .await
            .unwrap();
        assert!(crate::features::auth::password::verify_password(
            "newsecret",
            &reset.password_hash
        ));
    }
}
