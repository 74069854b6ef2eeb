//! # API Error Types
//!
//! The single error type every handler returns.
//!
//! ## Serialization
//! This is what the HTTP client receives when a request fails:
//! ```json
//! {
//!   "code": "INSUFFICIENT_STOCK",
//!   "message": "Insufficient stock for product 1: available 2, requested 3"
//! }
//! ```
//!
//! ## Status Mapping
//! ```text
//! INVALID_CREDENTIALS  401 (400 when re-verifying on password change)
//! UNAUTHORIZED         401
//! INVALID_TOKEN        401
//! VALIDATION_ERROR     400
//! NOT_FOUND            404
//! INSUFFICIENT_STOCK   409
//! INTERNAL             500
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use webpos_core::{CoreError, ValidationError};
use webpos_db::DbError;

/// API error returned from handlers.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    #[serde(skip)]
    status: StatusCode,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Username/password did not match
    InvalidCredentials,

    /// No usable bearer token on the request
    Unauthorized,

    /// Token present but forged, malformed or expired
    InvalidToken,

    /// Input validation failed
    ValidationError,

    /// Referenced product, sale or user is absent
    NotFound,

    /// Not enough stock to commit a sale
    InsufficientStock,

    /// Storage or other internal failure
    Internal,
}

impl ErrorCode {
    /// Default HTTP status for this code.
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidCredentials | ErrorCode::Unauthorized | ErrorCode::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InsufficientStock => StatusCode::CONFLICT,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error with the code's default status.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            status: code.status(),
        }
    }

    /// Overrides the HTTP status while keeping the code.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn invalid_credentials() -> Self {
        ApiError::new(ErrorCode::InvalidCredentials, "Invalid credentials")
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InvalidToken, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Logs the detail and returns a redacted error.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Internal error");
        ApiError::new(ErrorCode::Internal, "Internal server error")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::UniqueViolation { field, value } => {
                ApiError::validation(format!("{} '{}' already exists", field, value))
            }
            DbError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            DbError::InvalidInput(message) => ApiError::validation(message),
            DbError::Immutable
            | DbError::ConnectionFailed(_)
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::TransactionFailed(_)
            | DbError::PoolExhausted
            | DbError::Internal(_) => ApiError::internal(err),
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", id),
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Malformed or mistyped JSON bodies are validation errors.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

/// Non-numeric ids in the path are validation errors.
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}
