//! # webpos-core: Pure Business Logic for WebPOS
//!
//! Everything here is a pure function over plain data. Storage lives in
//! `webpos-db`, transport in the API app.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        WebPOS Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Browser front-end                            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP (bearer token)          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │    login, change-password, products, sales                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ webpos-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ checkout  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ plan_sale │  │   rules   │  │   │
//! │  │   │   Sale    │  │           │  │  totals   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    webpos-db (Database Layer)                   │   │
//! │  │          SQLite, migrations, inventory ledger, sales            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Product, Sale, requests)
//! - [`money`] - Integer minor-unit money
//! - [`error`] - Domain error types
//! - [`validation`] - Request validation
//! - [`checkout`] - Turns a validated request plus resolved products into a sale
//!
//! ## Example Usage
//!
//! ```rust
//! use webpos_core::money::Money;
//!
//! let price = Money::from_minor(1000);
//! let line = price.checked_mul_qty(4).unwrap();
//! assert_eq!(line.minor(), 4000);
//! ```

pub mod checkout;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

pub use checkout::{plan_sale, SalePlan};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single sale.
///
/// Prevents runaway requests; one storage statement runs per line inside
/// the sale transaction.
pub const MAX_SALE_LINES: usize = 100;

/// Maximum quantity on a single sale line.
pub const MAX_LINE_QUANTITY: i64 = 9_999;

/// Lifetime of a session token, in hours. Fixed; there is no refresh.
pub const SESSION_TTL_HOURS: i64 = 12;
