//! # User Repository
//!
//! The credential store: usernames, roles and password hashes.
//!
//! Hashing happens in the API layer; this repository only stores and
//! returns PHC strings.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use webpos_core::{Role, User};

const USER_COLUMNS: &str = "id, username, password_hash, role, created_at, updated_at";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Looks a user up by username (exact, case-sensitive).
    pub async fn find_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Inserts a new user.
    ///
    /// ## Returns
    /// * `Ok(User)` - The stored user with its generated id
    /// * `Err(DbError::UniqueViolation)` - Username already taken
    pub async fn insert(&self, username: &str, password_hash: &str, role: Role) -> DbResult<User> {
        debug!(username = %username, role = role.as_str(), "Inserting user");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, role, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("username", username),
            other => other,
        })?;

        Ok(User {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role,
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrites a user's password hash.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No user with this id
    pub async fn update_password_hash(&self, id: i64, password_hash: &str) -> DbResult<()> {
        debug!(id, "Updating password hash");

        let result = sqlx::query("UPDATE users SET password_hash = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(password_hash)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    /// Counts users (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use webpos_core::Role;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let db = db().await;
        let users = db.users();

        let created = users.insert("admin", "$argon2id$fake", Role::Admin).await.unwrap();
        assert!(created.id > 0);

        let found = users.find_by_username("admin").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.role, Role::Admin);
        assert_eq!(found.password_hash, "$argon2id$fake");

        let by_id = users.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "admin");

        assert!(users.find_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let db = db().await;
        let users = db.users();

        users.insert("kasir", "h1", Role::Cashier).await.unwrap();
        let err = users.insert("kasir", "h2", Role::Cashier).await.unwrap_err();

        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "username");
                assert_eq!(value, "kasir");
            }
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
        assert_eq!(users.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_password_hash() {
        let db = db().await;
        let users = db.users();

        let user = users.insert("kasir", "old", Role::Cashier).await.unwrap();
        users.update_password_hash(user.id, "new").await.unwrap();

        let reloaded = users.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.password_hash, "new");

        let err = users.update_password_hash(9_999, "x").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
