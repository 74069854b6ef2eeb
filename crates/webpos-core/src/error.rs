//! # Error Types
//!
//! Domain-specific error types for webpos-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  webpos-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule failures                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  webpos-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  API errors (in app)                                                   │
//! │  └── ApiError         - What the HTTP client sees                      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A sale line references a product that does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any storage is touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or more.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Collection has too many entries.
    #[error("{field} cannot have more than {max} entries")]
    TooMany { field: String, max: usize },

    /// A submitted figure disagrees with the server's computation.
    #[error("{field} mismatch: submitted {submitted}, computed {computed}")]
    Mismatch {
        field: String,
        submitted: i64,
        computed: i64,
    },

    /// Arithmetic left the representable range.
    #[error("{field} is too large")]
    Overflow { field: String },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    pub fn must_be_positive(field: impl Into<String>) -> Self {
        ValidationError::MustBePositive {
            field: field.into(),
        }
    }

    pub fn must_be_non_negative(field: impl Into<String>) -> Self {
        ValidationError::MustBeNonNegative {
            field: field.into(),
        }
    }

    pub fn overflow(field: impl Into<String>) -> Self {
        ValidationError::Overflow {
            field: field.into(),
        }
    }

    /// Returns the name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::MustBePositive { field }
            | ValidationError::MustBeNonNegative { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::TooMany { field, .. }
            | ValidationError::Mismatch { field, .. }
            | ValidationError::Overflow { field } => field,
        }
    }
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_converts_into_core_error() {
        let err: CoreError = ValidationError::required("items").into();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(err.to_string(), "Validation error: items is required");
    }

    #[test]
    fn test_field_accessor() {
        let err = ValidationError::Mismatch {
            field: "subtotal".into(),
            submitted: 1,
            computed: 2,
        };
        assert_eq!(err.field(), "subtotal");
    }
}
