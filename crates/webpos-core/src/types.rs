//! # Domain Types
//!
//! Core domain types used throughout WebPOS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │    Product      │   │      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  username (uniq)│   │  sku            │   │  created_at     │       │
//! │  │  password_hash  │   │  name           │   │  totals (minor) │       │
//! │  │  role           │   │  price / cost   │   │  items (blob)   │       │
//! │  └─────────────────┘   │  stock          │   └────────┬────────┘       │
//! │                        └────────▲────────┘            │                │
//! │                                 │   weak reference    │                │
//! │                                 └──── SaleLine.product_id ◄┘           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales never own products: a sale stays readable after its product is gone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Users
// =============================================================================

/// Staff role carried in session claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Cashier,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Cashier => "cashier",
        }
    }
}

/// A stored staff account, including its password hash.
///
/// Never serialized to clients; use [`UserProfile`] for that.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
        }
    }
}

/// Public view of a user: `{id, username, role}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

// =============================================================================
// Products
// =============================================================================

/// A product in the inventory ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    pub name: String,

    /// Selling price in minor units.
    pub price: i64,

    /// Cost in minor units (for margin reporting).
    pub cost: i64,

    /// Units on hand. Only sale commits decrement it.
    pub stock: i64,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_minor(self.price)
    }
}

/// Fields for creating a product (seeding, tests).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub price: i64,
    pub cost: i64,
    pub stock: i64,
}

// =============================================================================
// Sales
// =============================================================================

/// One line of a recorded sale.
///
/// `unit_price` is frozen at sale time; later price edits do not touch history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub product_id: i64,
    pub qty: i64,
    pub unit_price: i64,
}

/// An immutable, committed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    pub subtotal: i64,
    pub total_cost: i64,
    pub discount: i64,
    pub extra_fee: i64,
    pub payment_amount: i64,

    /// Ordered line items.
    pub items: Vec<SaleLine>,

    /// User who recorded the sale, if known.
    pub cashier_id: Option<i64>,
}

/// A sale ready to be committed: validated, priced, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSale {
    pub created_at: DateTime<Utc>,
    pub subtotal: i64,
    pub total_cost: i64,
    pub discount: i64,
    pub extra_fee: i64,
    pub payment_amount: i64,
    pub items: Vec<SaleLine>,
    pub cashier_id: Option<i64>,
}

// =============================================================================
// Requests
// =============================================================================

/// A checkout request as submitted by the till.
///
/// Monetary fields default to zero when omitted; `subtotal` stays `None`
/// so the server can compute it. The snake_case aliases accept payloads
/// from older front-ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    #[serde(default)]
    pub subtotal: Option<i64>,

    #[serde(default, alias = "total_cost")]
    pub total_cost: i64,

    #[serde(default)]
    pub discount: i64,

    #[serde(default, alias = "extra_fee")]
    pub extra_fee: i64,

    #[serde(default, alias = "payment_amount")]
    pub payment_amount: i64,

    #[serde(default)]
    pub items: Vec<SaleItemRequest>,
}

/// One requested line: which product, how many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemRequest {
    #[serde(alias = "product_id")]
    pub product_id: i64,
    pub qty: i64,
}

// =============================================================================
// Policies
// =============================================================================

/// How submitted totals are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalsPolicy {
    /// Subtotal is computed server-side; a disagreeing submission is rejected.
    #[default]
    Enforce,
    /// Submitted totals are stored as-is; disagreement is only logged.
    Trust,
}

/// Whether a decrement may take stock below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockPolicy {
    /// Decrements larger than the stock on hand fail.
    #[default]
    FailClosed,
    /// Decrements always apply (backorder).
    AllowBackorder,
}

impl StockPolicy {
    pub fn from_allow_backorder(allow: bool) -> Self {
        if allow {
            StockPolicy::AllowBackorder
        } else {
            StockPolicy::FailClosed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_request_camel_case() {
        let json = r#"{
            "items": [{"productId": 1, "qty": 4}],
            "subtotal": 4000,
            "totalCost": 2400,
            "extraFee": 0,
            "paymentAmount": 4000
        }"#;
        let req: SaleRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.subtotal, Some(4000));
        assert_eq!(req.total_cost, 2400);
        assert_eq!(req.payment_amount, 4000);
        assert_eq!(req.discount, 0);
        assert_eq!(req.items, vec![SaleItemRequest { product_id: 1, qty: 4 }]);
    }

    #[test]
    fn test_sale_request_snake_case_aliases() {
        let json = r#"{
            "items": [{"productId": 2, "qty": 1}],
            "total_cost": 300,
            "extra_fee": 50,
            "payment_amount": 1000
        }"#;
        let req: SaleRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.subtotal, None);
        assert_eq!(req.total_cost, 300);
        assert_eq!(req.extra_fee, 50);
        assert_eq!(req.payment_amount, 1000);
    }

    #[test]
    fn test_sale_request_rejects_fractional_amounts() {
        let json = r#"{"items": [], "subtotal": 10.5}"#;
        assert!(serde_json::from_str::<SaleRequest>(json).is_err());
    }

    #[test]
    fn test_sale_serializes_camel_case() {
        let sale = Sale {
            id: 3,
            created_at: Utc::now(),
            subtotal: 4000,
            total_cost: 0,
            discount: 0,
            extra_fee: 0,
            payment_amount: 4000,
            items: vec![SaleLine {
                product_id: 1,
                qty: 4,
                unit_price: 1000,
            }],
            cashier_id: Some(1),
        };
        let value = serde_json::to_value(&sale).unwrap();
        assert_eq!(value["paymentAmount"], 4000);
        assert_eq!(value["items"][0]["productId"], 1);
        assert_eq!(value["items"][0]["unitPrice"], 1000);
        assert_eq!(value["cashierId"], 1);
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(Role::Cashier.as_str(), "cashier");
    }

    #[test]
    fn test_policies_from_config_strings() {
        let policy: TotalsPolicy = serde_json::from_str("\"trust\"").unwrap();
        assert_eq!(policy, TotalsPolicy::Trust);
        assert_eq!(TotalsPolicy::default(), TotalsPolicy::Enforce);
        assert_eq!(StockPolicy::from_allow_backorder(true), StockPolicy::AllowBackorder);
        assert_eq!(StockPolicy::default(), StockPolicy::FailClosed);
    }
}
