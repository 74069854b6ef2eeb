//! # Repositories
//!
//! One repository per table, each holding a clone of the pool.
//!
//! | Repository          | Table      | Role                                   |
//! |---------------------|------------|----------------------------------------|
//! | `UserRepository`    | `users`    | credential store                       |
//! | `ProductRepository` | `products` | inventory ledger, conditional decrement|
//! | `SaleRepository`    | `sales`    | append-only sales, atomic commit       |
//!
//! Queries are runtime-checked (`sqlx::query_as` + `bind`), so building the
//! crate needs no live database.

pub mod product;
pub mod sale;
pub mod user;
