use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::RngCore;
use std::sync::OnceLock;

use crate::core::error::{AppError, Result};

/// Hash a password with Argon2id and a fresh random salt (PHC string format)
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::Internal(format!("Failed to encode salt: {}", e)))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Check a password against a stored PHC hash. A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::error!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

/// Spend the same work as a real verification when no account matched, so a
/// failed login takes the same time whichever half was wrong.
pub fn burn_verification(password: &str) {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

    let dummy = DUMMY_HASH.get_or_init(|| hash_password("lostfound-dummy-password").ok());
    if let Some(hash) = dummy {
        let _ = verify_password(password, hash);
    }
}

/// Run Argon2 work on the blocking pool so it does not stall the async workers
async fn off_runtime<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))
}

/// [`hash_password`] off the async runtime
pub async fn hash_password_async(password: &str) -> Result<String> {
    let password = password.to_owned();
    off_runtime(move || hash_password(&password)).await?
}

/// [`verify_password`] off the async runtime
pub async fn verify_password_async(password: &str, stored_hash: &str) -> Result<bool> {
    let (password, stored_hash) = (password.to_owned(), stored_hash.to_owned());
    off_runtime(move || verify_password(&password, &stored_hash)).await
}

/// [`burn_verification`] off the async runtime
pub async fn burn_verification_async(password: &str) -> Result<()> {
    let password = password.to_owned();
    off_runtime(move || burn_verification(&password)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("secret1").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secret1", &hash));
        assert!(!verify_password("secret2", &hash));
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let a = hash_password("secret1").unwrap();
        let b = hash_password("secret1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_plaintext_stored_value_never_matches() {
        assert!(!verify_password("secret1", "secret1"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_async_variants_match() {
        let hash = hash_password_async("secret1").await.unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secret1", &hash));
        assert!(verify_password_async("secret1", &hash).await.unwrap());
        assert!(!verify_password_async("secret2", &hash).await.unwrap());
        assert!(burn_verification_async("secret1").await.is_ok());
    }
}
