//! # Sale Repository
//!
//! Immutable sale records and the transaction that commits them.
//!
//! ## Commit Unit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       commit(sale, policy)                              │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │   ├── INSERT INTO sales ...        ← takes the write lock first        │
//! │   ├── decrement line 1 (conditional)                                   │
//! │   ├── decrement line 2 (conditional)                                   │
//! │   │     └── refused? return Err → tx dropped → ROLLBACK                │
//! │   └── ...                                                               │
//! │  COMMIT                             ← sale + all decrements, or nothing │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no update or delete path. The schema enforces it too: triggers
//! abort any UPDATE or DELETE on `sales`.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::product::decrement_stock_on;
use webpos_core::{NewSale, Sale, SaleLine, StockPolicy};

const SALE_COLUMNS: &str = "id, created_at, subtotal, total_cost, discount, extra_fee, \
                            payment_amount, items_json, cashier_id";

/// Row shape of the `sales` table; `items_json` is decoded into lines.
#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: i64,
    created_at: DateTime<Utc>,
    subtotal: i64,
    total_cost: i64,
    discount: i64,
    extra_fee: i64,
    payment_amount: i64,
    items_json: String,
    cashier_id: Option<i64>,
}

impl TryFrom<SaleRow> for Sale {
    type Error = DbError;

    fn try_from(row: SaleRow) -> DbResult<Self> {
        let items: Vec<SaleLine> = serde_json::from_str(&row.items_json)
            .map_err(|e| DbError::Internal(format!("sale {} has unreadable items: {e}", row.id)))?;

        Ok(Sale {
            id: row.id,
            created_at: row.created_at,
            subtotal: row.subtotal,
            total_cost: row.total_cost,
            discount: row.discount,
            extra_fee: row.extra_fee,
            payment_amount: row.payment_amount,
            items,
            cashier_id: row.cashier_id,
        })
    }
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Stores a sale and decrements stock for every line, all-or-nothing.
    ///
    /// ## Returns
    /// * `Ok(id)` - The new sale id
    /// * `Err(DbError::InsufficientStock)` - A line could not be covered
    /// * `Err(DbError::NotFound)` - A line's product vanished before commit
    ///
    /// On any error nothing is persisted: the transaction is rolled back
    /// when it is dropped.
    pub async fn commit(&self, sale: &NewSale, policy: StockPolicy) -> DbResult<i64> {
        let items_json = serde_json::to_string(&sale.items)
            .map_err(|e| DbError::Internal(format!("failed to encode sale items: {e}")))?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let result = sqlx::query(
            r#"
            INSERT INTO sales (
                created_at, subtotal, total_cost, discount,
                extra_fee, payment_amount, items_json, cashier_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(sale.created_at)
        .bind(sale.subtotal)
        .bind(sale.total_cost)
        .bind(sale.discount)
        .bind(sale.extra_fee)
        .bind(sale.payment_amount)
        .bind(&items_json)
        .bind(sale.cashier_id)
        .execute(&mut *tx)
        .await?;

        let sale_id = result.last_insert_rowid();
        debug!(sale_id, lines = sale.items.len(), "Sale row written, applying decrements");

        for line in &sale.items {
            decrement_stock_on(&mut tx, line.product_id, line.qty, policy).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(sale_id, subtotal = sale.subtotal, "Sale committed");
        Ok(sale_id)
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        let row = sqlx::query_as::<_, SaleRow>(&format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Sale::try_from).transpose()
    }

    /// Lists all sales, newest first.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales ORDER BY id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Sale::try_from).collect()
    }

    /// Counts sales (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use webpos_core::NewProduct;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn stocked(db: &Database, sku: &str, price: i64, stock: i64) -> i64 {
        db.products()
            .insert(&NewProduct {
                sku: sku.to_string(),
                name: sku.to_string(),
                price,
                cost: 0,
                stock,
            })
            .await
            .unwrap()
            .id
    }

    fn new_sale(lines: &[(i64, i64, i64)]) -> NewSale {
        let items: Vec<SaleLine> = lines
            .iter()
            .map(|&(product_id, qty, unit_price)| SaleLine {
                product_id,
                qty,
                unit_price,
            })
            .collect();
        let subtotal = items.iter().map(|l| l.qty * l.unit_price).sum();
        NewSale {
            created_at: Utc::now(),
            subtotal,
            total_cost: 0,
            discount: 0,
            extra_fee: 0,
            payment_amount: subtotal,
            items,
            cashier_id: Some(1),
        }
    }

    #[tokio::test]
    async fn test_commit_persists_sale_and_decrements() {
        let db = db().await;
        let p = stocked(&db, "A", 1000, 10).await;

        let id = db
            .sales()
            .commit(&new_sale(&[(p, 4, 1000)]), StockPolicy::FailClosed)
            .await
            .unwrap();

        let sale = db.sales().get_by_id(id).await.unwrap().unwrap();
        assert_eq!(sale.subtotal, 4000);
        assert_eq!(
            sale.items,
            vec![SaleLine {
                product_id: p,
                qty: 4,
                unit_price: 1000
            }]
        );
        assert_eq!(sale.cashier_id, Some(1));
        assert_eq!(db.products().get_by_id(p).await.unwrap().unwrap().stock, 6);
    }

    #[tokio::test]
    async fn test_sale_rolls_back_when_a_later_decrement_fails() {
        let db = db().await;
        let plenty = stocked(&db, "PLENTY", 500, 10).await;
        let scarce = stocked(&db, "SCARCE", 500, 1).await;

        // Sale row and the first decrement are written before the second
        // line is refused.
        let err = db
            .sales()
            .commit(&new_sale(&[(plenty, 3, 500), (scarce, 2, 500)]), StockPolicy::FailClosed)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::InsufficientStock { available: 1, requested: 2, .. }));
        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert_eq!(db.products().get_by_id(plenty).await.unwrap().unwrap().stock, 10);
        assert_eq!(db.products().get_by_id(scarce).await.unwrap().unwrap().stock, 1);
    }

    #[tokio::test]
    async fn test_missing_product_aborts_whole_sale() {
        let db = db().await;
        let p = stocked(&db, "A", 100, 5).await;

        let err = db
            .sales()
            .commit(&new_sale(&[(p, 1, 100), (999, 1, 100)]), StockPolicy::FailClosed)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert_eq!(db.products().get_by_id(p).await.unwrap().unwrap().stock, 5);
    }

    #[tokio::test]
    async fn test_duplicate_lines_are_cumulative() {
        let db = db().await;
        let p = stocked(&db, "A", 100, 5).await;

        let err = db
            .sales()
            .commit(&new_sale(&[(p, 3, 100), (p, 3, 100)]), StockPolicy::FailClosed)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InsufficientStock { available: 2, .. }));
        assert_eq!(db.products().get_by_id(p).await.unwrap().unwrap().stock, 5);
    }

    #[tokio::test]
    async fn test_backorder_commit() {
        let db = db().await;
        let p = stocked(&db, "A", 100, 1).await;

        db.sales()
            .commit(&new_sale(&[(p, 4, 100)]), StockPolicy::AllowBackorder)
            .await
            .unwrap();
        assert_eq!(db.products().get_by_id(p).await.unwrap().unwrap().stock, -3);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = db().await;
        let p = stocked(&db, "A", 100, 10).await;

        let first = db.sales().commit(&new_sale(&[(p, 1, 100)]), StockPolicy::FailClosed).await.unwrap();
        let second = db.sales().commit(&new_sale(&[(p, 2, 100)]), StockPolicy::FailClosed).await.unwrap();

        let ids: Vec<i64> = db.sales().list().await.unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[tokio::test]
    async fn test_sales_are_immutable() {
        let db = db().await;
        let p = stocked(&db, "A", 100, 10).await;
        let id = db.sales().commit(&new_sale(&[(p, 1, 100)]), StockPolicy::FailClosed).await.unwrap();

        let update = sqlx::query("UPDATE sales SET subtotal = 0 WHERE id = ?1")
            .bind(id)
            .execute(db.pool())
            .await
            .map_err(DbError::from);
        assert!(matches!(update, Err(DbError::Immutable)));

        let delete = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(db.pool())
            .await
            .map_err(DbError::from);
        assert!(matches!(delete, Err(DbError::Immutable)));

        assert_eq!(db.sales().get_by_id(id).await.unwrap().unwrap().subtotal, 100);
    }

    #[tokio::test]
    async fn test_sale_survives_product_removal() {
        let db = db().await;
        let p = stocked(&db, "A", 100, 10).await;
        let id = db.sales().commit(&new_sale(&[(p, 1, 100)]), StockPolicy::FailClosed).await.unwrap();

        sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(p)
            .execute(db.pool())
            .await
            .unwrap();

        let sale = db.sales().get_by_id(id).await.unwrap().unwrap();
        assert_eq!(sale.items[0].product_id, p);
    }
}
