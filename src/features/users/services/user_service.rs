use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::core::database::{constraint_violation, ConstraintViolation};
use crate::core::error::{AppError, Result};
use crate::features::users::models::{CreateUser, User};
use crate::shared::types::FieldError;

const USER_COLUMNS: &str = "id, username, email, password_hash, is_admin, created_at, updated_at";

pub const USERNAME_TAKEN: &str = "Username already exists";
pub const EMAIL_TAKEN: &str = "Email already registered";
pub const LAST_ADMIN: &str = "At least one admin account must remain";

/// Service for account persistence
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve a login identifier against both unique columns. Usernames cannot contain `@`,
    /// so at most one row matches; an exact username match wins if the configuration ever
    /// allows otherwise.
    pub async fn find_by_login(&self, identifier: &str) -> Result<Option<User>> {
        let query = format!(
            "SELECT {} FROM users WHERE username = $1 OR email = lower($1) \
             ORDER BY (username = $1) DESC LIMIT 1",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(identifier.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to look up user by login: {:?}", e);
                AppError::Database(e)
            })
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch user {}: {:?}", id, e);
                AppError::Database(e)
            })
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let query = format!(
            "SELECT {} FROM users ORDER BY is_admin DESC, username ASC",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list users: {:?}", e);
                AppError::Database(e)
            })
    }

    pub async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count users: {:?}", e);
                AppError::Database(e)
            })
    }

    /// Which of the two unique fields are already taken
    async fn taken_fields(
        tx: &mut Transaction<'_, Postgres>,
        username: &str,
        email: &str,
    ) -> Result<Vec<FieldError>> {
        let (username_taken, email_taken): (bool, bool) = sqlx::query_as(
            r#"
            SELECT
                EXISTS (SELECT 1 FROM users WHERE username = $1),
                EXISTS (SELECT 1 FROM users WHERE email = $2)
            "#,
        )
        .bind(username)
        .bind(email)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check account uniqueness: {:?}", e);
            AppError::Database(e)
        })?;

        let mut conflicts = Vec::new();
        if username_taken {
            conflicts.push(FieldError::new("username", USERNAME_TAKEN));
        }
        if email_taken {
            conflicts.push(FieldError::new("email", EMAIL_TAKEN));
        }
        Ok(conflicts)
    }

    /// Insert a new account. Collisions on either unique field are reported together and
    /// leave the table untouched.
    pub async fn create(&self, data: &CreateUser) -> Result<User> {
        let email = data.email.trim().to_lowercase();

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let conflicts = Self::taken_fields(&mut tx, &data.username, &email).await?;
        if !conflicts.is_empty() {
            return Err(AppError::Conflict(conflicts));
        }

        let query = format!(
            "INSERT INTO users (id, username, email, password_hash, is_admin) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(Uuid::now_v7())
            .bind(&data.username)
            .bind(&email)
            .bind(&data.password_hash)
            .bind(data.is_admin)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_unique_violation)?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit user creation: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Created user: {} ({}) admin={}",
            user.username,
            user.id,
            user.is_admin
        );

        Ok(user)
    }

    /// Change the admin flag. Revoking it from the only remaining admin is refused.
    pub async fn set_admin(&self, id: Uuid, is_admin: bool) -> Result<User> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        if !is_admin {
            // concurrent demotions queue on these row locks and re-read the admin set
            let admins: Vec<Uuid> =
                sqlx::query_scalar("SELECT id FROM users WHERE is_admin ORDER BY id FOR UPDATE")
                    .fetch_all(&mut *tx)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to lock admin accounts: {:?}", e);
                        AppError::Database(e)
                    })?;
            if admins.len() <= 1 && admins.contains(&id) {
                return Err(AppError::Validation(LAST_ADMIN.to_string()));
            }
        }

        let query = format!(
            "UPDATE users SET is_admin = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(is_admin)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update admin flag for {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit admin flag change: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Set admin flag for {} to {}", user.username, is_admin);

        Ok(user)
    }

    /// Replace the stored password hash and revoke every session of the account
    pub async fn reset_password(&self, id: Uuid, password_hash: &str) -> Result<User> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let query = format!(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(password_hash)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to reset password for {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

        let revoked = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to revoke sessions for {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .rows_affected();

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit password reset: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Reset password for {} and revoked {} session(s)",
            user.username,
            revoked
        );

        Ok(user)
    }
}

/// Turn a unique violation that slipped past the pre-check into a per-field conflict
fn map_unique_violation(e: sqlx::Error) -> AppError {
    match constraint_violation(&e) {
        Some(ConstraintViolation::Unique(Some(name))) if name == "users_username_key" => {
            AppError::conflict("username", USERNAME_TAKEN)
        }
        Some(ConstraintViolation::Unique(Some(name))) if name == "users_email_key" => {
            AppError::conflict("email", EMAIL_TAKEN)
        }
        _ => {
            tracing::error!("Failed to create user: {:?}", e);
            AppError::Database(e)
        }
    }
}
