//! # Product Repository
//!
//! Store-scoped product catalog.
//!
//! ## Stock Writers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Who may change products.stock_quantity                                │
//! │                                                                         │
//! │  ✅ SaleRepository::record_sale   conditional decrement, inside the     │
//! │                                  sale's write transaction              │
//! │  ✅ ProductRepository::update     admin sets an absolute count         │
//! │                                  (single statement, CHECK >= 0)        │
//! │  ❌ read stock, compute, write back in a second statement              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Price updates never touch `sale_items`; recorded sales keep the price
//! they were sold at.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use shopfloor_core::validation::{validate_new_product, validate_product_update};
use shopfloor_core::{CoreError, NewProduct, Product, ProductUpdate};

pub(crate) const PRODUCT_COLUMNS: &str = "id, store_id, category_id, name, price_cents, \
                                          cost_price_cents, stock_quantity, is_deleted, \
                                          created_at, updated_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists live products of a store by name.
    pub async fn list(&self, store_id: &str) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE store_id = ?1 AND is_deleted = 0 ORDER BY name"
        ))
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(store_id = %store_id, count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a live product in the store.
    pub async fn get(&self, store_id: &str, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE id = ?1 AND store_id = ?2 AND is_deleted = 0"
        ))
        .bind(id)
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Fails with `ReferenceNotFound` unless `category_id` is a live category
    /// of the same store.
    async fn ensure_category(&self, store_id: &str, category_id: &str) -> DbResult<()> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM categories
                WHERE id = ?1 AND store_id = ?2 AND is_deleted = 0
            )
            "#,
        )
        .bind(category_id)
        .bind(store_id)
        .fetch_one(&self.pool)
        .await?;

        if !exists {
            return Err(CoreError::ReferenceNotFound {
                entity: "Category".to_string(),
                ids: vec![category_id.to_string()],
            }
            .into());
        }

        Ok(())
    }

    /// Creates a product in the store.
    pub async fn create(&self, store_id: &str, input: &NewProduct) -> DbResult<Product> {
        validate_new_product(input)?;

        if let Some(category_id) = &input.category_id {
            self.ensure_category(store_id, category_id).await?;
        }

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            store_id: store_id.to_string(),
            category_id: input.category_id.clone(),
            name: input.name.trim().to_string(),
            price_cents: input.price_cents,
            cost_price_cents: input.cost_price_cents,
            stock_quantity: input.stock_quantity,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO products (
                id, store_id, category_id, name,
                price_cents, cost_price_cents, stock_quantity,
                is_deleted, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.store_id)
        .bind(&product.category_id)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.cost_price_cents)
        .bind(product.stock_quantity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        info!(store_id = %store_id, product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Applies the fields present in `update` in one statement.
    pub async fn update(&self, store_id: &str, id: &str, update: &ProductUpdate) -> DbResult<Product> {
        validate_product_update(update)?;

        if let Some(category_id) = &update.category_id {
            self.ensure_category(store_id, category_id).await?;
        }

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = COALESCE(?1, name),
                price_cents = COALESCE(?2, price_cents),
                cost_price_cents = COALESCE(?3, cost_price_cents),
                stock_quantity = COALESCE(?4, stock_quantity),
                category_id = COALESCE(?5, category_id),
                updated_at = ?6
            WHERE id = ?7 AND store_id = ?8 AND is_deleted = 0
            "#,
        )
        .bind(update.name.as_deref().map(str::trim))
        .bind(update.price_cents)
        .bind(update.cost_price_cents)
        .bind(update.stock_quantity)
        .bind(&update.category_id)
        .bind(Utc::now())
        .bind(id)
        .bind(store_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        debug!(product_id = %id, "Product updated");
        self.get(store_id, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Soft-deletes a product. Historical sale items keep referencing it.
    pub async fn soft_delete(&self, store_id: &str, id: &str) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products SET is_deleted = 1, updated_at = ?1
            WHERE id = ?2 AND store_id = ?3 AND is_deleted = 0
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .bind(store_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(store_id = %store_id, product_id = %id, "Product soft-deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_product, seed_shop, seed_store, seed_user, test_db};
    use shopfloor_core::ErrorKind;

    #[tokio::test]
    async fn test_create_and_list() {
        let db = test_db().await;
        let (_, store, _) = seed_shop(&db).await;
        seed_product(&db, &store.id, "Water", 50, 10).await;
        seed_product(&db, &store.id, "Cola", 100, 5).await;

        let names: Vec<_> = db
            .products()
            .list(&store.id)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Cola", "Water"]);
    }

    #[tokio::test]
    async fn test_category_must_belong_to_store() {
        let db = test_db().await;
        let (_, store, _) = seed_shop(&db).await;
        let other_owner = seed_user(&db, "other@shop.io").await;
        let other = seed_store(&db, &other_owner.id, "Other").await;
        let foreign = db.categories().create(&other.id, "Drinks").await.unwrap();

        let input = NewProduct {
            name: "Cola".into(),
            price_cents: 100,
            cost_price_cents: 0,
            stock_quantity: 1,
            category_id: Some(foreign.id),
        };
        let err = db.products().create(&store.id, &input).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReferenceNotFound);
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let db = test_db().await;
        let (_, store, _) = seed_shop(&db).await;
        let product = seed_product(&db, &store.id, "Cola", 100, 5).await;

        let updated = db
            .products()
            .update(
                &store.id,
                &product.id,
                &ProductUpdate {
                    price_cents: Some(150),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.price_cents, 150);
        assert_eq!(updated.stock_quantity, 5);
        assert_eq!(updated.name, "Cola");
    }

    #[tokio::test]
    async fn test_negative_stock_rejected() {
        let db = test_db().await;
        let (_, store, _) = seed_shop(&db).await;
        let product = seed_product(&db, &store.id, "Cola", 100, 5).await;

        let err = db
            .products()
            .update(
                &store.id,
                &product.id,
                &ProductUpdate {
                    stock_quantity: Some(-1),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_store_isolation() {
        let db = test_db().await;
        let (_, store_a, _) = seed_shop(&db).await;
        let other_owner = seed_user(&db, "other@shop.io").await;
        let store_b = seed_store(&db, &other_owner.id, "Other").await;
        let theirs = seed_product(&db, &store_b.id, "Secret", 100, 5).await;

        let products = db.products();
        assert!(products.get(&store_a.id, &theirs.id).await.unwrap().is_none());
        assert!(products.soft_delete(&store_a.id, &theirs.id).await.is_err());
        assert!(products
            .update(&store_a.id, &theirs.id, &ProductUpdate::default())
            .await
            .is_err());
        // Untouched in its own store.
        assert!(products.get(&store_b.id, &theirs.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_soft_deleted_product_hidden() {
        let db = test_db().await;
        let (_, store, _) = seed_shop(&db).await;
        let product = seed_product(&db, &store.id, "Cola", 100, 5).await;

        db.products().soft_delete(&store.id, &product.id).await.unwrap();
        assert!(db.products().get(&store.id, &product.id).await.unwrap().is_none());
        assert!(db.products().list(&store.id).await.unwrap().is_empty());
    }
}
