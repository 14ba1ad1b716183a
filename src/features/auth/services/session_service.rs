use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::core::config::SessionConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::Principal;

type HmacSha256 = Hmac<Sha256>;

/// A freshly issued session. `token` goes into the cookie and is never stored.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub remember_me: bool,
}

#[derive(Debug, FromRow)]
struct SessionPrincipal {
    id: Uuid,
    username: String,
    email: String,
    is_admin: bool,
}

/// Server-side sessions keyed by the HMAC of a random cookie token
pub struct SessionService {
    pool: PgPool,
    config: SessionConfig,
}

impl SessionService {
    pub fn new(pool: PgPool, config: SessionConfig) -> Self {
        Self { pool, config }
    }

    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    fn generate_token() -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// HMAC-SHA256 of the token under the configured secret, hex encoded
    fn token_hash(&self, token: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(self.config.secret_key.as_bytes())
            .map_err(|e| AppError::Internal(format!("Invalid session secret: {}", e)))?;
        mac.update(token.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn lifetime(&self, remember_me: bool) -> std::time::Duration {
        if remember_me {
            self.config.remember_me_ttl
        } else {
            self.config.ttl
        }
    }

    /// Open a session for `user_id`, pruning expired rows on the way
    pub async fn create(&self, user_id: Uuid, remember_me: bool) -> Result<IssuedSession> {
        let token = Self::generate_token();
        let token_hash = self.token_hash(&token)?;
        let lifetime = chrono::Duration::from_std(self.lifetime(remember_me))
            .map_err(|e| AppError::Internal(format!("Session lifetime out of range: {}", e)))?;
        let expires_at = Utc::now() + lifetime;

        let pruned = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to prune expired sessions: {:?}", e);
                AppError::Database(e)
            })?
            .rows_affected();
        if pruned > 0 {
            tracing::debug!("Pruned {} expired session(s)", pruned);
        }

        sqlx::query(
            r#"
            INSERT INTO sessions (token_hash, user_id, remember_me, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&token_hash)
        .bind(user_id)
        .bind(remember_me)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create session: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(IssuedSession {
            token,
            expires_at,
            remember_me,
        })
    }

    /// Look up the live session behind a cookie token
    pub async fn resolve(&self, token: &str) -> Result<Option<Principal>> {
        let token_hash = self.token_hash(token)?;

        let row = sqlx::query_as::<_, SessionPrincipal>(
            r#"
            SELECT u.id, u.username, u.email, u.is_admin
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token_hash = $1 AND s.expires_at > NOW()
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to resolve session: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(row.map(|r| Principal {
            id: r.id,
            username: r.username,
            email: r.email,
            is_admin: r.is_admin,
        }))
    }

    pub async fn revoke(&self, token: &str) -> Result<()> {
        let token_hash = self.token_hash(token)?;

        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(&token_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to revoke session: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(())
    }

    /// Raw session token carried by the request, if any
    pub fn token_from(&self, jar: &CookieJar) -> Option<String> {
        jar.get(&self.config.cookie_name)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Cookie carrying the session token. Remembered sessions outlive the browser.
    pub fn cookie(&self, session: &IssuedSession) -> Cookie<'static> {
        let mut builder = Cookie::build((self.config.cookie_name.clone(), session.token.clone()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.config.cookie_secure);

        if session.remember_me {
            let secs = self.config.remember_me_ttl.as_secs() as i64;
            builder = builder.max_age(time::Duration::seconds(secs));
        }

        builder.build()
    }

    pub fn clear_cookie(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build((self.config.cookie_name.clone(), "")).path("/"))
    }
}
