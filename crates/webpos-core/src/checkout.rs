//! # Checkout Planning
//!
//! Turns a validated [`SaleRequest`] and the products it references into a
//! [`NewSale`] ready to commit.
//!
//! ## Flow
//! ```text
//! SaleRequest ──► validate_sale_request ──► resolve products (db)
//!                                                  │
//!                                                  ▼
//!                                   plan_sale (THIS MODULE)
//!                                   ├── snapshot unit prices
//!                                   ├── Σ qty × unit_price
//!                                   └── apply TotalsPolicy
//!                                                  │
//!                                                  ▼
//!                                   SaleRepository::commit (one transaction)
//! ```
//!
//! Stock is not checked here. The conditional decrement inside the commit
//! transaction is the only authority on stock.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{NewSale, Product, SaleLine, SaleRequest, TotalsPolicy};

/// A priced sale plus what the totals reconciliation found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalePlan {
    pub sale: NewSale,

    /// `(submitted, computed)` when a submitted subtotal disagreed and the
    /// policy let it through.
    pub subtotal_mismatch: Option<(i64, i64)>,
}

/// Prices each line from the resolved products and settles the subtotal.
///
/// ## Arguments
/// * `request` - already validated request
/// * `products` - every product referenced by the request, keyed by id
/// * `policy` - how to treat the submitted subtotal
/// * `cashier_id` - authenticated user recording the sale
/// * `now` - sale timestamp
///
/// ## Errors
/// * `CoreError::ProductNotFound` - a line's product is missing from `products`
/// * `ValidationError::Overflow` - line or subtotal arithmetic overflowed
/// * `ValidationError::Mismatch` - `Enforce` and the submitted subtotal is wrong
pub fn plan_sale(
    request: &SaleRequest,
    products: &HashMap<i64, Product>,
    policy: TotalsPolicy,
    cashier_id: Option<i64>,
    now: DateTime<Utc>,
) -> CoreResult<SalePlan> {
    let mut lines = Vec::with_capacity(request.items.len());
    let mut line_totals = Vec::with_capacity(request.items.len());

    for item in &request.items {
        let product = products
            .get(&item.product_id)
            .ok_or(CoreError::ProductNotFound(item.product_id))?;

        let line_total = product
            .price()
            .checked_mul_qty(item.qty)
            .ok_or_else(|| ValidationError::overflow("items"))?;

        line_totals.push(line_total);
        lines.push(SaleLine {
            product_id: product.id,
            qty: item.qty,
            unit_price: product.price,
        });
    }

    let computed = Money::checked_sum(line_totals)
        .ok_or_else(|| ValidationError::overflow("subtotal"))?
        .minor();

    let (subtotal, subtotal_mismatch) = match (request.subtotal, policy) {
        (None, _) => (computed, None),
        (Some(submitted), _) if submitted == computed => (computed, None),
        (Some(submitted), TotalsPolicy::Enforce) => {
            return Err(ValidationError::Mismatch {
                field: "subtotal".to_string(),
                submitted,
                computed,
            }
            .into());
        }
        (Some(submitted), TotalsPolicy::Trust) => (submitted, Some((submitted, computed))),
    };

    Ok(SalePlan {
        sale: NewSale {
            created_at: now,
            subtotal,
            total_cost: request.total_cost,
            discount: request.discount,
            extra_fee: request.extra_fee,
            payment_amount: request.payment_amount,
            items: lines,
            cashier_id,
        },
        subtotal_mismatch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleItemRequest;

    fn catalogue() -> HashMap<i64, Product> {
        [
            Product {
                id: 1,
                sku: "TEH-BOTOL".into(),
                name: "Teh Botol 350ml".into(),
                price: 1000,
                cost: 600,
                stock: 10,
            },
            Product {
                id: 2,
                sku: "KOPI-SUSU".into(),
                name: "Kopi Susu".into(),
                price: 2500,
                cost: 1200,
                stock: 3,
            },
        ]
        .into_iter()
        .map(|p| (p.id, p))
        .collect()
    }

    fn request(subtotal: Option<i64>, items: &[(i64, i64)]) -> SaleRequest {
        SaleRequest {
            subtotal,
            payment_amount: 10_000,
            items: items
                .iter()
                .map(|&(product_id, qty)| SaleItemRequest { product_id, qty })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_prices_lines_from_products() {
        let plan = plan_sale(
            &request(Some(6500), &[(1, 4), (2, 1)]),
            &catalogue(),
            TotalsPolicy::Enforce,
            Some(1),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(plan.sale.subtotal, 6500);
        assert_eq!(plan.subtotal_mismatch, None);
        assert_eq!(
            plan.sale.items,
            vec![
                SaleLine { product_id: 1, qty: 4, unit_price: 1000 },
                SaleLine { product_id: 2, qty: 1, unit_price: 2500 },
            ]
        );
        assert_eq!(plan.sale.cashier_id, Some(1));
    }

    #[test]
    fn test_missing_subtotal_is_computed() {
        let plan = plan_sale(
            &request(None, &[(1, 2)]),
            &catalogue(),
            TotalsPolicy::Enforce,
            None,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(plan.sale.subtotal, 2000);
    }

    #[test]
    fn test_enforce_rejects_wrong_subtotal() {
        let err = plan_sale(
            &request(Some(1), &[(1, 4)]),
            &catalogue(),
            TotalsPolicy::Enforce,
            None,
            Utc::now(),
        )
        .unwrap_err();

        assert_eq!(
            err,
            CoreError::Validation(ValidationError::Mismatch {
                field: "subtotal".into(),
                submitted: 1,
                computed: 4000,
            })
        );
    }

    #[test]
    fn test_trust_keeps_submitted_subtotal() {
        let plan = plan_sale(
            &request(Some(1), &[(1, 4)]),
            &catalogue(),
            TotalsPolicy::Trust,
            None,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(plan.sale.subtotal, 1);
        assert_eq!(plan.subtotal_mismatch, Some((1, 4000)));
    }

    #[test]
    fn test_unknown_product() {
        let err = plan_sale(
            &request(None, &[(1, 1), (999, 1)]),
            &catalogue(),
            TotalsPolicy::Enforce,
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, CoreError::ProductNotFound(999));
    }

    #[test]
    fn test_overflow_is_validation_error() {
        let mut products = catalogue();
        if let Some(p) = products.get_mut(&1) {
            p.price = i64::MAX;
        }
        let err = plan_sale(
            &request(None, &[(1, 2)]),
            &products,
            TotalsPolicy::Enforce,
            None,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::Overflow { .. })));
    }

    #[test]
    fn test_other_totals_pass_through() {
        let mut req = request(None, &[(2, 1)]);
        req.total_cost = 1200;
        req.discount = 500;
        req.extra_fee = 100;
        let plan = plan_sale(&req, &catalogue(), TotalsPolicy::Enforce, None, Utc::now()).unwrap();
        assert_eq!(plan.sale.total_cost, 1200);
        assert_eq!(plan.sale.discount, 500);
        assert_eq!(plan.sale.extra_fee, 100);
        assert_eq!(plan.sale.payment_amount, 10_000);
    }
}
