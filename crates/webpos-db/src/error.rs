//! # Database Errors
//!
//! ```text
//! sqlx::Error / MigrateError ──► DbError ──► ApiError (status + JSON body)
//! ```
//!
//! Storage-level details stay inside `DbError`; the API layer decides what
//! reaches the client.

use thiserror::Error;

/// Message raised by the sale triggers on UPDATE or DELETE.
pub const IMMUTABLE_SALE_MESSAGE: &str = "sales are immutable";

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// The conditional decrement refused a line: a sale asked for more than
    /// is on hand, possibly because a concurrent sale got there first.
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A statement tried to rewrite or remove a recorded sale.
    #[error("Recorded sales cannot be modified")]
    Immutable,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                // SQLite reports "UNIQUE constraint failed: table.column".
                let field = db_err
                    .message()
                    .rsplit(": ")
                    .next()
                    .unwrap_or("unknown")
                    .to_string();
                DbError::UniqueViolation {
                    field,
                    value: "unknown".to_string(),
                }
            }
            sqlx::Error::Database(db_err) if db_err.message().contains(IMMUTABLE_SALE_MESSAGE) => {
                DbError::Immutable
            }
            sqlx::Error::Database(db_err) => DbError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlx_mapping() {
        assert!(matches!(DbError::from(sqlx::Error::RowNotFound), DbError::NotFound { .. }));
        assert!(matches!(DbError::from(sqlx::Error::PoolTimedOut), DbError::PoolExhausted));
        assert!(matches!(
            DbError::from(sqlx::Error::PoolClosed),
            DbError::ConnectionFailed(_)
        ));
    }

    #[test]
    fn test_messages() {
        assert_eq!(DbError::not_found("Product", 42).to_string(), "Product not found: 42");
        assert_eq!(
            DbError::InsufficientStock {
                product_id: 1,
                available: 2,
                requested: 3
            }
            .to_string(),
            "Insufficient stock for product 1: available 2, requested 3"
        );
        assert_eq!(
            DbError::duplicate("username", "admin").to_string(),
            "Duplicate username: 'admin' already exists"
        );
    }
}
