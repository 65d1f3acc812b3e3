//! # Sale Pricing
//!
//! The pure half of the sale transaction engine: request validation, the
//! set-cardinality reference check, stock sufficiency, and totals.
//!
//! ## Where This Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleRepository::record_sale (shopfloor-db)                            │
//! │                                                                         │
//! │  1. validate_sale_request()   ◄── this module, before any query        │
//! │  2. BEGIN IMMEDIATE                                                    │
//! │     SELECT products WHERE id IN (..) AND store_id = ? AND NOT deleted  │
//! │  3. price_sale()              ◄── this module                          │
//! │     ├── loaded count == distinct requested count?                      │
//! │     ├── stock >= requested per product?                                │
//! │     └── total = Σ qty × current price (becomes price_at_sale)          │
//! │  4. conditional decrements (rows_affected == 1 each)                   │
//! │  5. INSERT sale + sale_items                                           │
//! │  6. COMMIT                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, ValidationError};
use crate::money::Money;
use crate::types::{PaymentType, Product};
use crate::validation::{validate_email, ValidationResult};
use crate::MAX_SALE_LINES;

/// One requested line: a product and how many units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub product_id: String,
    pub quantity: i64,
}

/// A request to record a sale, as submitted by a cashier.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    pub payment_type: Option<PaymentType>,
    #[serde(default)]
    pub items: Vec<SaleLine>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
}

/// Validates request shape. Runs before any storage access.
///
/// ## Rules
/// - `paymentType` present
/// - `items` non-empty and at most `MAX_SALE_LINES`
/// - every `productId` non-blank, every `quantity > 0`
/// - `customerEmail`, when given, looks like an email
pub fn validate_sale_request(request: &SaleRequest) -> ValidationResult<PaymentType> {
    let payment_type = request
        .payment_type
        .ok_or_else(|| ValidationError::required("paymentType"))?;

    if request.items.is_empty() {
        return Err(ValidationError::required("items"));
    }

    if request.items.len() > MAX_SALE_LINES {
        return Err(ValidationError::TooMany {
            field: "items".to_string(),
            max: MAX_SALE_LINES,
        });
    }

    for line in &request.items {
        if line.product_id.trim().is_empty() {
            return Err(ValidationError::required("items.productId"));
        }
        if line.quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "items.quantity".to_string(),
            });
        }
    }

    if let Some(email) = request.customer_email.as_deref() {
        if !email.trim().is_empty() {
            validate_email("customerEmail", email)?;
        }
    }

    Ok(payment_type)
}

/// Distinct product ids in order of first appearance.
pub fn distinct_product_ids(lines: &[SaleLine]) -> Vec<String> {
    let mut seen = Vec::with_capacity(lines.len());
    for line in lines {
        if !seen.contains(&line.product_id) {
            seen.push(line.product_id.clone());
        }
    }
    seen
}

/// A stock decrement the engine must apply conditionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockDecrement {
    pub product_id: String,
    pub product_name: String,
    /// Total units across every line for this product.
    pub quantity: i64,
    /// Stock observed at read time (for error messages only).
    pub observed_stock: i64,
}

/// A priced line, ready to become a `SaleItem`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub price_at_sale: Money,
    pub position: i64,
}

/// Output of [`price_sale`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedSale {
    pub total: Money,
    pub lines: Vec<PricedLine>,
    /// One entry per distinct product, in first-appearance order.
    pub decrements: Vec<StockDecrement>,
}

/// Checks references and stock, and prices the sale.
///
/// `products` must be the rows loaded for the requested ids, already scoped
/// to the store and excluding deleted products. Quantities of repeated lines
/// for the same product are summed before the stock check.
///
/// ## Errors
/// * `ReferenceNotFound` - loaded count differs from the distinct requested
///   count (some product missing, deleted, or in another store)
/// * `InsufficientStock` - first product whose stock is below the request
/// * `InvalidInput` - the total overflows
pub fn price_sale(lines: &[SaleLine], products: &[Product]) -> Result<PricedSale, CoreError> {
    let requested_ids = distinct_product_ids(lines);
    let by_id: HashMap<&str, &Product> = products.iter().map(|p| (p.id.as_str(), p)).collect();

    if by_id.len() != requested_ids.len() {
        let missing = requested_ids
            .iter()
            .filter(|id| !by_id.contains_key(id.as_str()))
            .cloned()
            .collect();
        return Err(CoreError::products_not_found(missing));
    }

    let mut requested: HashMap<&str, i64> = HashMap::with_capacity(requested_ids.len());
    for line in lines {
        let qty = requested.entry(line.product_id.as_str()).or_insert(0);
        *qty = qty.checked_add(line.quantity).ok_or_else(|| ValidationError::Overflow {
            field: "items.quantity".to_string(),
        })?;
    }

    let mut decrements = Vec::with_capacity(requested_ids.len());
    for id in &requested_ids {
        // Both lookups are guaranteed by the cardinality check above.
        let (Some(product), Some(&quantity)) = (by_id.get(id.as_str()), requested.get(id.as_str()))
        else {
            return Err(CoreError::products_not_found(vec![id.clone()]));
        };

        if product.stock_quantity < quantity {
            return Err(CoreError::InsufficientStock {
                product_id: product.id.clone(),
                name: product.name.clone(),
                available: product.stock_quantity,
                requested: quantity,
            });
        }

        decrements.push(StockDecrement {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity,
            observed_stock: product.stock_quantity,
        });
    }

    let overflow = || ValidationError::Overflow {
        field: "totalAmount".to_string(),
    };

    let mut total = Money::zero();
    let mut priced = Vec::with_capacity(lines.len());
    for (position, line) in lines.iter().enumerate() {
        let Some(product) = by_id.get(line.product_id.as_str()) else {
            return Err(CoreError::products_not_found(vec![line.product_id.clone()]));
        };
        let line_total = product
            .price()
            .checked_mul_quantity(line.quantity)
            .ok_or_else(overflow)?;
        total = total.checked_add(line_total).ok_or_else(overflow)?;

        priced.push(PricedLine {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity: line.quantity,
            price_at_sale: product.price(),
            position: position as i64,
        });
    }

    Ok(PricedSale {
        total,
        lines: priced,
        decrements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::Utc;

    fn product(id: &str, price_cents: i64, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            store_id: "s1".to_string(),
            category_id: None,
            name: format!("Product {}", id),
            price_cents,
            cost_price_cents: 0,
            stock_quantity: stock,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn line(id: &str, quantity: i64) -> SaleLine {
        SaleLine {
            product_id: id.to_string(),
            quantity,
        }
    }

    fn request(items: Vec<SaleLine>) -> SaleRequest {
        SaleRequest {
            payment_type: Some(PaymentType::Cash),
            items,
            customer_name: None,
            customer_email: None,
            customer_phone: None,
        }
    }

    #[test]
    fn test_validate_rejects_empty_items() {
        let err = validate_sale_request(&request(vec![])).unwrap_err();
        assert_eq!(err, ValidationError::required("items"));
    }

    #[test]
    fn test_validate_rejects_non_positive_quantity() {
        assert!(validate_sale_request(&request(vec![line("p1", 0)])).is_err());
        assert!(validate_sale_request(&request(vec![line("p1", -2)])).is_err());
    }

    #[test]
    fn test_validate_requires_payment_type() {
        let mut req = request(vec![line("p1", 1)]);
        req.payment_type = None;
        assert_eq!(
            validate_sale_request(&req),
            Err(ValidationError::required("paymentType"))
        );
    }

    #[test]
    fn test_validate_checks_customer_email_only_when_present() {
        let mut req = request(vec![line("p1", 1)]);
        req.customer_email = Some("not-an-email".into());
        assert!(validate_sale_request(&req).is_err());
        req.customer_email = Some(String::new());
        assert_eq!(validate_sale_request(&req), Ok(PaymentType::Cash));
    }

    #[test]
    fn test_price_freezes_current_price() {
        let priced = price_sale(&[line("p", 2)], &[product("p", 100, 5)]).unwrap();
        assert_eq!(priced.total.cents(), 200);
        assert_eq!(priced.lines[0].price_at_sale.cents(), 100);
        assert_eq!(priced.decrements[0].quantity, 2);
    }

    #[test]
    fn test_missing_product_detected_by_cardinality() {
        let err = price_sale(&[line("a", 1), line("b", 1)], &[product("a", 100, 5)]).unwrap_err();
        match err {
            CoreError::ReferenceNotFound { ids, .. } => assert_eq!(ids, vec!["b".to_string()]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_insufficient_stock_names_product() {
        let err = price_sale(&[line("a", 6)], &[product("a", 100, 5)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientStock);
        assert!(err.to_string().contains("Product a"));
    }

    #[test]
    fn test_duplicate_lines_are_summed_for_stock() {
        let products = [product("a", 100, 5)];
        let err = price_sale(&[line("a", 3), line("a", 3)], &products).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientStock);

        let priced = price_sale(&[line("a", 2), line("a", 3)], &products).unwrap();
        assert_eq!(priced.decrements.len(), 1);
        assert_eq!(priced.decrements[0].quantity, 5);
        assert_eq!(priced.lines.len(), 2);
        assert_eq!(priced.lines[1].position, 1);
        assert_eq!(priced.total.cents(), 500);
    }

    #[test]
    fn test_total_overflow_is_invalid_input() {
        let err = price_sale(&[line("a", 2)], &[product("a", i64::MAX, 10)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
