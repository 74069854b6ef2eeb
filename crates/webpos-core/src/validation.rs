//! # Validation Module
//!
//! Input validation for requests entering WebPOS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  └── Types: integers only, items are {productId, qty}                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Non-negative amounts, non-empty items, qty > 0                    │
//! │  └── Size caps (lines, quantity)                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE usernames                                                  │
//! │  └── Conditional stock decrement                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use webpos_core::validation::validate_quantity;
//!
//! assert!(validate_quantity(5).is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::SaleRequest;
use crate::{MAX_LINE_QUANTITY, MAX_SALE_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity: `1..=MAX_LINE_QUANTITY`.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::must_be_positive("qty"));
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "qty".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a monetary amount in minor units: zero or more.
pub fn validate_amount(field: &str, amount: i64) -> ValidationResult<()> {
    if amount < 0 {
        return Err(ValidationError::must_be_non_negative(field));
    }
    Ok(())
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates the shape and numbers of a checkout request.
///
/// ## Rules
/// - every monetary field is ≥ 0
/// - `items` is non-empty and has at most `MAX_SALE_LINES` lines
/// - every line has a quantity in range
///
/// Product ids are not range-checked here; an id that resolves to nothing
/// is a lookup miss, reported as not found.
///
/// The first violation wins.
pub fn validate_sale_request(request: &SaleRequest) -> ValidationResult<()> {
    if let Some(subtotal) = request.subtotal {
        validate_amount("subtotal", subtotal)?;
    }
    validate_amount("totalCost", request.total_cost)?;
    validate_amount("discount", request.discount)?;
    validate_amount("extraFee", request.extra_fee)?;
    validate_amount("paymentAmount", request.payment_amount)?;

    if request.items.is_empty() {
        return Err(ValidationError::required("items"));
    }

    if request.items.len() > MAX_SALE_LINES {
        return Err(ValidationError::TooMany {
            field: "items".to_string(),
            max: MAX_SALE_LINES,
        });
    }

    for item in &request.items {
        validate_quantity(item.qty)?;
    }

    Ok(())
}

/// Validates login input: both fields present.
pub fn validate_credentials(username: &str, password: &str) -> ValidationResult<()> {
    if username.trim().is_empty() {
        return Err(ValidationError::required("username"));
    }
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }
    Ok(())
}

/// Validates a replacement password.
///
/// Only emptiness is rejected; there is no strength policy.
pub fn validate_new_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("newPassword"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleItemRequest;

    fn request(items: Vec<SaleItemRequest>) -> SaleRequest {
        SaleRequest {
            subtotal: Some(4000),
            payment_amount: 4000,
            items,
            ..Default::default()
        }
    }

    fn line(product_id: i64, qty: i64) -> SaleItemRequest {
        SaleItemRequest { product_id, qty }
    }

    #[test]
    fn test_valid_request() {
        assert!(validate_sale_request(&request(vec![line(1, 4)])).is_ok());
    }

    #[test]
    fn test_empty_items() {
        let err = validate_sale_request(&request(vec![])).unwrap_err();
        assert_eq!(err, ValidationError::required("items"));
    }

    #[test]
    fn test_non_positive_qty() {
        let err = validate_sale_request(&request(vec![line(1, 0)])).unwrap_err();
        assert_eq!(err.field(), "qty");

        let err = validate_sale_request(&request(vec![line(1, -2)])).unwrap_err();
        assert_eq!(err.field(), "qty");
    }

    #[test]
    fn test_qty_cap() {
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());
        assert!(matches!(
            validate_quantity(MAX_LINE_QUANTITY + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_negative_amounts() {
        let mut req = request(vec![line(1, 1)]);
        req.discount = -1;
        assert_eq!(
            validate_sale_request(&req).unwrap_err(),
            ValidationError::must_be_non_negative("discount")
        );

        let mut req = request(vec![line(1, 1)]);
        req.subtotal = Some(-5);
        assert_eq!(validate_sale_request(&req).unwrap_err().field(), "subtotal");
    }

    #[test]
    fn test_too_many_lines() {
        let items = (1..=(MAX_SALE_LINES as i64 + 1)).map(|id| line(id, 1)).collect();
        assert!(matches!(
            validate_sale_request(&request(items)),
            Err(ValidationError::TooMany { .. })
        ));
    }

    #[test]
    fn test_product_id_is_left_to_lookup() {
        assert!(validate_sale_request(&request(vec![line(0, 1)])).is_ok());
        assert!(validate_sale_request(&request(vec![line(-4, 1)])).is_ok());
    }

    #[test]
    fn test_credentials() {
        assert!(validate_credentials("admin", "123456").is_ok());
        assert!(validate_credentials("  ", "x").is_err());
        assert!(validate_credentials("admin", "").is_err());
        assert!(validate_new_password("").is_err());
        assert!(validate_new_password("a").is_ok());
    }
}
