//! # Sale Repository
//!
//! The sale transaction engine plus sale reads and soft delete.
//!
//! ## record_sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      One Unit of Work                                   │
//! │                                                                         │
//! │  validate_sale_request()            InvalidInput, nothing touched      │
//! │       │                                                                 │
//! │  BEGIN IMMEDIATE ◄── waits up to busy_timeout for the write lock       │
//! │       │                                                                 │
//! │  load products (store-scoped, live)                                    │
//! │  price_sale()                       ReferenceNotFound / Insufficient   │
//! │       │                                                                 │
//! │  for each distinct product:                                            │
//! │    UPDATE products                                                     │
//! │       SET stock_quantity = stock_quantity - q                          │
//! │     WHERE id = ? AND store_id = ? AND stock_quantity >= q              │
//! │    rows_affected == 0 ──► InsufficientStock, drop tx (rollback)        │
//! │       │                                                                 │
//! │  INSERT sales, INSERT sale_items (request order)                       │
//! │       │                                                                 │
//! │  COMMIT                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any `?` between BEGIN and COMMIT drops the transaction, which rolls back
//! every decrement already applied.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::product::PRODUCT_COLUMNS;
use shopfloor_core::sale::{
    distinct_product_ids, price_sale, validate_sale_request, SaleRequest, StockDecrement,
};
use shopfloor_core::{CoreError, Product, Sale, SaleItem, StoreScope};

const SALE_COLUMNS: &str = "id, store_id, user_id, payment_type, total_cents, customer_name, \
                            customer_email, customer_phone, is_deleted, created_at";

/// Blank optional text is stored as NULL.
fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Conditionally decrements one product's stock.
///
/// Never a read-then-write: the availability check and the write are the
/// same statement.
async fn decrement_stock(
    conn: &mut SqliteConnection,
    store_id: &str,
    decrement: &StockDecrement,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock_quantity = stock_quantity - ?1, updated_at = ?2
        WHERE id = ?3 AND store_id = ?4 AND is_deleted = 0 AND stock_quantity >= ?1
        "#,
    )
    .bind(decrement.quantity)
    .bind(Utc::now())
    .bind(&decrement.product_id)
    .bind(store_id)
    .execute(conn)
    .await?;

    if result.rows_affected() != 1 {
        warn!(
            product_id = %decrement.product_id,
            requested = decrement.quantity,
            "Conditional stock decrement matched no row"
        );
        return Err(CoreError::InsufficientStock {
            product_id: decrement.product_id.clone(),
            name: decrement.product_name.clone(),
            available: decrement.observed_stock,
            requested: decrement.quantity,
        }
        .into());
    }

    Ok(())
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a sale atomically: stock decrements, the sale row and its
    /// items commit together or not at all.
    ///
    /// ## Arguments
    /// * `scope` - resolved store scope; products are loaded from `scope.store_id` only
    /// * `cashier_id` - the user recorded on the sale
    /// * `request` - payment type, lines, optional customer details
    ///
    /// ## Errors
    /// * `InvalidInput` - bad request shape, or the total overflows
    /// * `ReferenceNotFound` - a product is missing, deleted, or in another store
    /// * `InsufficientStock` - requested more than available (at read or write time)
    /// * storage variants (`StorageFailure`) - never retried here
    pub async fn record_sale(
        &self,
        scope: &StoreScope,
        cashier_id: &str,
        request: &SaleRequest,
    ) -> DbResult<Sale> {
        let payment_type = validate_sale_request(request)?;
        let store_id = scope.store_id.as_str();

        debug!(
            store_id = %store_id,
            lines = request.items.len(),
            "Recording sale"
        );

        let mut tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let ids = distinct_product_ids(&request.items);
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_deleted = 0 AND store_id = "
        ));
        query.push_bind(store_id).push(" AND id IN (");
        let mut separated = query.separated(", ");
        for id in &ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let products: Vec<Product> = query.build_query_as().fetch_all(&mut *tx).await?;

        let priced = match price_sale(&request.items, &products) {
            Ok(priced) => priced,
            Err(e) => {
                warn!(store_id = %store_id, error = %e, "Sale rejected");
                return Err(e.into());
            }
        };

        for decrement in &priced.decrements {
            decrement_stock(&mut tx, store_id, decrement).await?;
        }

        let now = Utc::now();
        let sale_id = Uuid::new_v4().to_string();
        let mut sale = Sale {
            id: sale_id.clone(),
            store_id: store_id.to_string(),
            user_id: cashier_id.to_string(),
            payment_type,
            total_cents: priced.total.cents(),
            customer_name: non_blank(&request.customer_name),
            customer_email: non_blank(&request.customer_email),
            customer_phone: non_blank(&request.customer_phone),
            is_deleted: false,
            created_at: now,
            items: Vec::with_capacity(priced.lines.len()),
        };

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, store_id, user_id, payment_type, total_cents,
                customer_name, customer_email, customer_phone,
                is_deleted, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.store_id)
        .bind(&sale.user_id)
        .bind(sale.payment_type)
        .bind(sale.total_cents)
        .bind(&sale.customer_name)
        .bind(&sale.customer_email)
        .bind(&sale.customer_phone)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for line in priced.lines {
            let item = SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale_id.clone(),
                product_id: line.product_id,
                product_name: line.product_name,
                quantity: line.quantity,
                price_at_sale_cents: line.price_at_sale.cents(),
                position: line.position,
            };

            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, product_name,
                    quantity, price_at_sale_cents, position
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&item.id)
            .bind(&item.sale_id)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.price_at_sale_cents)
            .bind(item.position)
            .execute(&mut *tx)
            .await?;

            sale.items.push(item);
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            sale_id = %sale.id,
            store_id = %store_id,
            total = %sale.total(),
            items = sale.items.len(),
            "Sale recorded"
        );
        Ok(sale)
    }

    /// Lists live sales of a store, newest first, without items.
    pub async fn list(&self, store_id: &str) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales \
             WHERE store_id = ?1 AND is_deleted = 0 \
             ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Gets a live sale of the store with its items in request order.
    pub async fn get_by_id(&self, store_id: &str, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales \
             WHERE id = ?1 AND store_id = ?2 AND is_deleted = 0"
        ))
        .bind(id)
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(mut sale) = sale else {
            return Ok(None);
        };

        sale.items = self.get_items(&sale.id).await?;
        Ok(Some(sale))
    }

    /// Gets all items for a sale.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, product_name,
                   quantity, price_at_sale_cents, position
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY position
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Hides a sale from listings. Amounts and stock are left as they are.
    pub async fn soft_delete(&self, store_id: &str, id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE sales SET is_deleted = 1 WHERE id = ?1 AND store_id = ?2 AND is_deleted = 0",
        )
        .bind(id)
        .bind(store_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        info!(store_id = %store_id, sale_id = %id, "Sale soft-deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
