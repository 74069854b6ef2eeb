//! # Product Repository
//!
//! The inventory ledger: product records and their stock counts.
//!
//! ## Decrement-and-Check
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: read, compute, write back (lost update)                     │
//! │     SELECT stock ...            → 5                                    │
//! │     UPDATE products SET stock = 2                                      │
//! │     (a concurrent sale read 5 too and also writes 2)                  │
//! │                                                                         │
//! │  ✅ CORRECT: one conditional statement                                  │
//! │     UPDATE products SET stock = stock - 3                              │
//! │     WHERE id = ? AND stock >= 3                                        │
//! │     RETURNING stock                                                    │
//! │                                                                         │
//! │  No row back? A follow-up read on the same connection tells            │
//! │  "no such product" apart from "not enough stock".                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use webpos_core::{NewProduct, Product, StockPolicy};

const PRODUCT_COLUMNS: &str = "id, sku, name, price, cost, stock";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let ledger = db.products();
/// let product = ledger.get_by_id(1).await?;
/// let remaining = ledger.decrement_stock(1, 3, StockPolicy::FailClosed).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists all products, newest first.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Stored product with its generated id
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        debug!(sku = %product.sku, "Inserting product");

        let result = sqlx::query(
            r#"
            INSERT INTO products (sku, name, price, cost, stock)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.price)
        .bind(product.cost)
        .bind(product.stock)
        .execute(&self.pool)
        .await?;

        Ok(Product {
            id: result.last_insert_rowid(),
            sku: product.sku.clone(),
            name: product.name.clone(),
            price: product.price,
            cost: product.cost,
            stock: product.stock,
        })
    }

    /// Atomically reduces stock by `qty` and returns the new stock level.
    ///
    /// Runs as a single statement on its own connection. Inside a sale, use
    /// [`decrement_stock_on`] with the transaction instead.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - No product with this id
    /// * `DbError::InsufficientStock` - `qty > stock` under `FailClosed`
    /// * `DbError::InvalidInput` - `qty` is not positive
    pub async fn decrement_stock(&self, id: i64, qty: i64, policy: StockPolicy) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        decrement_stock_on(&mut conn, id, qty, policy).await
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Decrement-and-check on a caller-supplied connection or transaction.
///
/// ## Arguments
/// * `conn` - connection to run on; pass `&mut *tx` to join a transaction
/// * `id` - product to decrement
/// * `qty` - units to take, must be positive
/// * `policy` - whether stock may go below zero
pub async fn decrement_stock_on(
    conn: &mut SqliteConnection,
    id: i64,
    qty: i64,
    policy: StockPolicy,
) -> DbResult<i64> {
    if qty <= 0 {
        return Err(DbError::InvalidInput(format!(
            "decrement quantity must be positive, got {qty}"
        )));
    }

    let sql = match policy {
        StockPolicy::FailClosed => {
            "UPDATE products SET stock = stock - ?2 WHERE id = ?1 AND stock >= ?2 RETURNING stock"
        }
        StockPolicy::AllowBackorder => {
            "UPDATE products SET stock = stock - ?2 WHERE id = ?1 RETURNING stock"
        }
    };

    let remaining: Option<i64> = sqlx::query_scalar(sql)
        .bind(id)
        .bind(qty)
        .fetch_optional(&mut *conn)
        .await?;

    if let Some(remaining) = remaining {
        debug!(id, qty, remaining, "Stock decremented");
        return Ok(remaining);
    }

    let available: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match available {
        None => Err(DbError::not_found("Product", id)),
        Some(available) => {
            debug!(id, qty, available, "Decrement refused: insufficient stock");
            Err(DbError::InsufficientStock {
                product_id: id,
                available,
                requested: qty,
            })
        }
    }
}
