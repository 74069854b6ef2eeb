//! Argon2 password hashing.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use tracing::error;

/// Hashes a plaintext password into a PHC string with a fresh salt.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Checks a plaintext password against a stored PHC string.
///
/// A mismatch is `Ok(false)`; only an unparseable hash is an error.
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// `hash_password` on the blocking pool, off the async workers.
pub async fn hash_password_blocking(plain: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plain)).await?
}

/// `verify_password` on the blocking pool, off the async workers.
pub async fn verify_password_blocking(plain: String, hash: String) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&plain, &hash)).await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("123456").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("123456", &hash).unwrap());
        assert!(!verify_password("654321", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_password("anything", "plaintext-not-a-hash").is_err());
    }

    #[tokio::test]
    async fn test_blocking_variants_match() {
        let hash = hash_password_blocking("123456".to_string()).await.unwrap();
        assert!(verify_password("123456", &hash).unwrap());
        assert!(verify_password_blocking("123456".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password_blocking("nope".to_string(), hash).await.unwrap());
        assert!(verify_password_blocking("x".to_string(), "not-a-hash".to_string()).await.is_err());
    }
}
