use std::sync::Arc;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{LoginRequestDto, RegisterRequestDto};
use crate::features::auth::model::Principal;
use crate::features::auth::password::{
    burn_verification_async, hash_password_async, verify_password_async,
};
use crate::features::auth::services::session_service::{IssuedSession, SessionService};
use crate::features::users::models::CreateUser;
use crate::features::users::services::{UserService, USERNAME_TAKEN};
use crate::shared::constants::RESERVED_ADMIN_USERNAME;
use crate::shared::validation::field_errors;

/// The one message for every failed login
pub const INVALID_CREDENTIALS: &str = "Invalid username/email or password";

/// Service for registration, login and logout
pub struct AuthService {
    users: Arc<UserService>,
    sessions: Arc<SessionService>,
}

impl AuthService {
    pub fn new(users: Arc<UserService>, sessions: Arc<SessionService>) -> Self {
        Self { users, sessions }
    }

    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }

    /// Create an ordinary account. All field problems are reported in one error.
    pub async fn register(&self, dto: &RegisterRequestDto) -> Result<Principal> {
        dto.validate()
            .map_err(|e| AppError::InvalidFields(field_errors(&e)))?;

        let username = dto.username.trim();
        if username.eq_ignore_ascii_case(RESERVED_ADMIN_USERNAME) {
            return Err(AppError::conflict("username", USERNAME_TAKEN));
        }

        let password_hash = hash_password_async(&dto.password).await?;
        let user = self
            .users
            .create(&CreateUser {
                username: username.to_string(),
                email: dto.email.clone(),
                password_hash,
                is_admin: false,
            })
            .await?;

        tracing::info!("Registered user: {}", user.username);

        Ok(user.principal())
    }

    /// Check credentials and open a session. A missing account and a wrong password
    /// produce the same error.
    pub async fn login(&self, dto: &LoginRequestDto) -> Result<(Principal, IssuedSession)> {
        dto.validate()
            .map_err(|e| AppError::InvalidFields(field_errors(&e)))?;

        let user = match self.users.find_by_login(&dto.username).await? {
            Some(user) => user,
            None => {
                burn_verification_async(&dto.password).await?;
                tracing::warn!("Failed login for {}: no such account", dto.username.trim());
                return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
            }
        };
        if !verify_password_async(&dto.password, &user.password_hash).await? {
            tracing::warn!("Failed login for {}: wrong password", dto.username.trim());
            return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
        }

        let session = self.sessions.create(user.id, dto.remember_me).await?;

        tracing::info!(
            "User {} logged in (remember_me={})",
            user.username,
            dto.remember_me
        );

        Ok((user.principal(), session))
    }

    pub async fn logout(&self, token: &str) -> Result<()> {
        self.sessions.revoke(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SessionConfig;
    use sqlx::postgres::PgPoolOptions;
    use sqlx::PgPool;

    fn service(pool: PgPool) -> AuthService {
        AuthService::new(
            Arc::new(UserService::new(pool.clone())),
            Arc::new(SessionService::new(pool, SessionConfig::default())),
        )
    }

    fn registration(username: &str, email: &str) -> RegisterRequestDto {
        RegisterRequestDto {
            username: username.into(),
            email: email.into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
        }
    }

    fn login(username: &str, password: &str) -> LoginRequestDto {
        LoginRequestDto {
            username: username.into(),
            password: password.into(),
            remember_me: false,
        }
    }

    #[tokio::test]
    async fn test_invalid_registration_never_reaches_database() {
        // the lazy pool points nowhere; validation must fail before any query
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap();
        let err = service(pool)
            .register(&registration("x", "bad"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidFields(_)));
    }

    #[tokio::test]
    async fn test_reserved_username_is_refused() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap();
        let err = service(pool)
            .register(&registration("Admin", "root@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_register_then_duplicate(pool: PgPool) {
        let auth = service(pool.clone());
        auth.register(&registration("alice", "alice@x.com"))
            .await
            .unwrap();

        let err = auth
            .register(&registration("alice", "alice2@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_login_failures_are_indistinguishable(pool: PgPool) {
        let auth = service(pool);
        auth.register(&registration("alice", "alice@x.com"))
            .await
            .unwrap();

        let wrong_password = auth.login(&login("alice", "nope12")).await.unwrap_err();
        let no_user = auth.login(&login("mallory", "secret1")).await.unwrap_err();
        assert_eq!(wrong_password.public_message(), no_user.public_message());
        assert_eq!(wrong_password.status_code(), no_user.status_code());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_login_opens_resolvable_session(pool: PgPool) {
        let auth = service(pool);
        auth.register(&registration("alice", "alice@x.com"))
            .await
            .unwrap();

        let (principal, session) = auth.login(&login("alice@x.com", "secret1")).await.unwrap();
        let resolved = auth.sessions().resolve(&session.token).await.unwrap();
        assert_eq!(resolved, Some(principal));

        auth.logout(&session.token).await.unwrap();
        assert_eq!(auth.sessions().resolve(&session.token).await.unwrap(), None);
    }
}
