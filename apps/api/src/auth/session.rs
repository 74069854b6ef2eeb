//! # Session Authority
//!
//! Issues and validates stateless, 12-hour access tokens.
//!
//! ## Token Lifecycle
//! ```text
//! ┌──────────┐  authenticate   ┌──────────────┐  validate  ┌──────────┐
//! │ username │ ──────────────► │ HS256 JWT    │ ─────────► │  Claims  │
//! │ password │   (argon2)      │ {id, role,   │  (sig +    │ (in req  │
//! └──────────┘                 │  iat, exp}   │   expiry)  │  exts)   │
//!                              └──────────────┘            └──────────┘
//! ```
//!
//! There is no revocation list and no refresh: a token is good until `exp`.

use axum::http::StatusCode;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;
use webpos_core::validation::{validate_credentials, validate_new_password};
use webpos_core::{Role, User, UserProfile, SESSION_TTL_HOURS};
use webpos_db::Database;

use super::password::{hash_password, hash_password_blocking, verify_password_blocking};
use crate::error::ApiError;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub id: i64,

    pub username: String,

    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// Unique token id
    pub jti: String,
}

/// Successful login: the token plus the public profile.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub user: UserProfile,
}

/// Authenticates staff and signs or verifies their tokens.
pub struct SessionAuthority {
    db: Database,
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    /// Verified against when the username is unknown, so both failure paths
    /// cost one argon2 verification.
    dummy_hash: String,
}

impl SessionAuthority {
    pub fn new(db: Database, secret: &str) -> anyhow::Result<Self> {
        Ok(SessionAuthority {
            db,
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(SESSION_TTL_HOURS),
            dummy_hash: hash_password(&Uuid::new_v4().to_string())?,
        })
    }

    /// Verifies credentials and issues a token.
    ///
    /// Unknown user, wrong password and empty input all fail the same way.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<LoginOutcome, ApiError> {
        if validate_credentials(username, password).is_err() {
            return Err(ApiError::invalid_credentials());
        }

        let user = self.db.users().find_by_username(username).await?;

        let Some(user) = user else {
            // Result ignored; the call only burns the same time as a real check.
            let _ = verify_password_blocking(password.to_string(), self.dummy_hash.clone()).await;
            debug!(username = %username, "Login for unknown user");
            return Err(ApiError::invalid_credentials());
        };

        if !self.check_password(&user, password).await? {
            debug!(user_id = user.id, "Login with wrong password");
            return Err(ApiError::invalid_credentials());
        }

        let token = self.issue_at(&user, Utc::now())?;
        info!(user_id = user.id, role = user.role.as_str(), "User logged in");

        Ok(LoginOutcome {
            token,
            user: user.profile(),
        })
    }

    /// Signs a token for `user` as if issued at `now`.
    pub fn issue_at(&self, user: &User, now: DateTime<Utc>) -> Result<String, ApiError> {
        let claims = Claims {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::internal(format!("Failed to sign token: {e}")))
    }

    /// Validates a token against the current time.
    pub fn validate(&self, token: &str) -> Result<Claims, ApiError> {
        self.validate_at(token, Utc::now())
    }

    /// Validates signature and shape, then expiry against `now`.
    ///
    /// Valid while `now <= exp`, with no leeway.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| {
                debug!(error = %e, "Token rejected");
                ApiError::invalid_token("Invalid token")
            })?
            .claims;

        if now.timestamp() > claims.exp {
            debug!(user_id = claims.id, exp = claims.exp, "Token expired");
            return Err(ApiError::invalid_token("Token expired"));
        }

        Ok(claims)
    }

    /// Re-verifies the old password, then stores a hash of the new one.
    ///
    /// A wrong old password is `INVALID_CREDENTIALS` with status 400: the
    /// caller is authenticated, only the re-check failed.
    pub async fn change_password(
        &self,
        user_id: i64,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let rejected = || ApiError::invalid_credentials().with_status(StatusCode::BAD_REQUEST);

        let user = self.db.users().get_by_id(user_id).await?.ok_or_else(rejected)?;

        if !self.check_password(&user, old_password).await? {
            debug!(user_id, "Password change with wrong old password");
            return Err(rejected());
        }

        validate_new_password(new_password)?;

        let hash = hash_password_blocking(new_password.to_string())
            .await
            .map_err(ApiError::internal)?;
        self.db.users().update_password_hash(user_id, &hash).await?;

        info!(user_id, "Password changed");
        Ok(())
    }

    /// Creates the administrator account if `username` does not exist yet.
    ///
    /// Returns whether an account was created.
    pub async fn bootstrap_admin(&self, username: &str, password: &str) -> Result<bool, ApiError> {
        if self.db.users().find_by_username(username).await?.is_some() {
            debug!(username = %username, "Admin account already present");
            return Ok(false);
        }

        let hash = hash_password_blocking(password.to_string())
            .await
            .map_err(ApiError::internal)?;
        let user = self.db.users().insert(username, &hash, Role::Admin).await?;

        warn!(user_id = user.id, username = %username, "Created default admin account; change its password");
        Ok(true)
    }

    /// Argon2 runs on the blocking pool.
    async fn check_password(&self, user: &User, password: &str) -> Result<bool, ApiError> {
        verify_password_blocking(password.to_string(), user.password_hash.clone())
            .await
            .map_err(ApiError::internal)
    }
}

/// Converts a claims timestamp back to a `DateTime`, for logging.
pub fn expires_at(claims: &Claims) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(claims.exp, 0).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use webpos_db::DbConfig;

    const SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

    async fn authority() -> SessionAuthority {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sessions = SessionAuthority::new(db, SECRET).unwrap();
        sessions.bootstrap_admin("admin", "123456").await.unwrap();
        sessions
    }

    #[tokio::test]
    async fn test_login_round_trip() {
        let sessions = authority().await;

        let outcome = sessions.authenticate("admin", "123456").await.unwrap();
        assert_eq!(outcome.user.username, "admin");
        assert_eq!(outcome.user.role, Role::Admin);

        let claims = sessions.validate(&outcome.token).unwrap();
        assert_eq!(claims.id, outcome.user.id);
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, SESSION_TTL_HOURS * 3600);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user() {
        let sessions = authority().await;

        let err = sessions.authenticate("admin", "wrong").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCredentials);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let err = sessions.authenticate("ghost", "123456").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCredentials);

        let err = sessions.authenticate("", "").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_expiry_boundary() {
        let sessions = authority().await;
        let user = sessions.db.users().find_by_username("admin").await.unwrap().unwrap();

        let issued = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let token = sessions.issue_at(&user, issued).unwrap();

        assert!(sessions.validate_at(&token, issued).is_ok());
        assert!(sessions.validate_at(&token, issued + Duration::hours(12)).is_ok());

        let err = sessions
            .validate_at(&token, issued + Duration::hours(12) + Duration::seconds(1))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidToken);

        let claims = sessions.validate_at(&token, issued).unwrap();
        assert_eq!(expires_at(&claims), Some(issued + Duration::hours(12)));
    }

    #[tokio::test]
    async fn test_forged_and_malformed_tokens() {
        let sessions = authority().await;
        let user = sessions.db.users().find_by_username("admin").await.unwrap().unwrap();

        let other = SessionAuthority::new(sessions.db.clone(), "some-other-secret").unwrap();
        let forged = other.issue_at(&user, Utc::now()).unwrap();
        assert_eq!(sessions.validate(&forged).unwrap_err().code, ErrorCode::InvalidToken);

        assert_eq!(sessions.validate("not.a.jwt").unwrap_err().code, ErrorCode::InvalidToken);
        assert_eq!(sessions.validate("").unwrap_err().code, ErrorCode::InvalidToken);
    }

    #[tokio::test]
    async fn test_change_password() {
        let sessions = authority().await;
        let id = sessions.authenticate("admin", "123456").await.unwrap().user.id;

        let err = sessions.change_password(id, "wrong", "new-pass").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCredentials);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = sessions.change_password(id, "123456", "").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        sessions.change_password(id, "123456", "new-pass").await.unwrap();

        assert!(sessions.authenticate("admin", "123456").await.is_err());
        assert!(sessions.authenticate("admin", "new-pass").await.is_ok());
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let sessions = authority().await;

        assert!(!sessions.bootstrap_admin("admin", "other").await.unwrap());
        assert_eq!(sessions.db.users().count().await.unwrap(), 1);
        // The existing password is left alone.
        assert!(sessions.authenticate("admin", "123456").await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_logins() {
        let sessions = std::sync::Arc::new(authority().await);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let sessions = sessions.clone();
                tokio::spawn(async move {
                    let password = if i % 2 == 0 { "123456" } else { "wrong" };
                    sessions.authenticate("admin", password).await.is_ok()
                })
            })
            .collect();

        let mut ok = 0;
        for handle in handles {
            if handle.await.unwrap() {
                ok += 1;
            }
        }
        assert_eq!(ok, 4);
    }
}
