use crate::core::config::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .test_before_acquire(true)
        .connect(&config.url)
        .await
}

/// Constraint-level failures worth telling apart from generic database errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    Unique(Option<String>),
    ForeignKey(Option<String>),
}

/// Classify a sqlx error raised by a unique or foreign-key constraint, carrying the
/// constraint name so callers can point at the offending field.
pub fn constraint_violation(error: &sqlx::Error) -> Option<ConstraintViolation> {
    let db_error = error.as_database_error()?;
    let constraint = db_error.constraint().map(str::to_string);

    if db_error.is_unique_violation() {
        Some(ConstraintViolation::Unique(constraint))
    } else if db_error.is_foreign_key_violation() {
        Some(ConstraintViolation::ForeignKey(constraint))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_are_not_constraints() {
        assert_eq!(constraint_violation(&sqlx::Error::RowNotFound), None);
        assert_eq!(constraint_violation(&sqlx::Error::PoolTimedOut), None);
    }
}
