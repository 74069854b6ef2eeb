//! # webpos-db: Database Layer for WebPOS
//!
//! SQLite persistence for users, the inventory ledger and sales.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          webpos-db                                      │
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │    Database     │  ← explicit handle, cloned into each component    │
//! │  │   (SqlitePool)  │                                                   │
//! │  └────────┬────────┘                                                   │
//! │           │                                                             │
//! │     ┌─────┴───────────────┬─────────────────────┐                      │
//! │     ▼                     ▼                     ▼                      │
//! │  UserRepository     ProductRepository     SaleRepository               │
//! │  (credentials)      (inventory ledger)    (commit = insert sale        │
//! │                                            + conditional decrements,   │
//! │                                            one transaction)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`pool`] - Connection pool management
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use webpos_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("webpos.db")).await?;
//! let product = db.products().get_by_id(1).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::user::UserRepository;
