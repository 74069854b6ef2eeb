//! # Sale Processor
//!
//! Orchestrates a checkout from request to committed sale.
//!
//! ## Flow
//! ```text
//! SaleRequest
//!     │ 1. validate_sale_request        → 400 VALIDATION_ERROR
//!     │ 2. resolve every productId      → 404 NOT_FOUND
//!     │ 3. plan_sale (prices, totals)   → 400 VALIDATION_ERROR (enforce)
//!     ▼ 4. SaleRepository::commit       → 409 INSUFFICIENT_STOCK
//! sale id      (INSERT sale + conditional decrements, one transaction)
//! ```
//!
//! Nothing is written before step 4, and step 4 is all-or-nothing.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{info, instrument, warn};
use webpos_core::validation::validate_sale_request;
use webpos_core::{plan_sale, Product, Sale, SaleRequest, StockPolicy, TotalsPolicy};
use webpos_db::Database;

use crate::auth::Claims;
use crate::error::ApiError;

/// Records sales against the inventory.
#[derive(Debug, Clone)]
pub struct SaleProcessor {
    db: Database,
    stock_policy: StockPolicy,
    totals_policy: TotalsPolicy,
}

impl SaleProcessor {
    pub fn new(db: Database, stock_policy: StockPolicy, totals_policy: TotalsPolicy) -> Self {
        SaleProcessor {
            db,
            stock_policy,
            totals_policy,
        }
    }

    /// Validates, prices and commits a sale. Returns the new sale id.
    #[instrument(skip(self, request, cashier), fields(user_id = cashier.id, lines = request.items.len()))]
    pub async fn process_sale(&self, request: &SaleRequest, cashier: &Claims) -> Result<i64, ApiError> {
        validate_sale_request(request)?;

        let products = self.resolve_products(request).await?;

        let plan = plan_sale(
            request,
            &products,
            self.totals_policy,
            Some(cashier.id),
            Utc::now(),
        )?;

        if let Some((submitted, computed)) = plan.subtotal_mismatch {
            warn!(submitted, computed, "Submitted subtotal disagrees with prices; storing as submitted");
        }

        let id = self.db.sales().commit(&plan.sale, self.stock_policy).await?;

        info!(sale_id = id, subtotal = plan.sale.subtotal, "Sale processed");
        Ok(id)
    }

    /// All sales, newest first.
    pub async fn list_sales(&self) -> Result<Vec<Sale>, ApiError> {
        Ok(self.db.sales().list().await?)
    }

    pub async fn get_sale(&self, id: i64) -> Result<Sale, ApiError> {
        self.db
            .sales()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Sale", id))
    }

    /// Loads each distinct product the request references.
    async fn resolve_products(&self, request: &SaleRequest) -> Result<HashMap<i64, Product>, ApiError> {
        let mut products = HashMap::with_capacity(request.items.len());

        for item in &request.items {
            if products.contains_key(&item.product_id) {
                continue;
            }

            let product = self
                .db
                .products()
                .get_by_id(item.product_id)
                .await?
                .ok_or_else(|| ApiError::not_found("Product", item.product_id))?;

            products.insert(product.id, product);
        }

        Ok(products)
    }
}
