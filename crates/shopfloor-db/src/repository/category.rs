//! # Category Repository
//!
//! Store-scoped categories. Every query filters on `store_id`, so a category
//! id from another store behaves exactly like a missing one.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use shopfloor_core::validation::validate_category_name;
use shopfloor_core::Category;

const CATEGORY_COLUMNS: &str = "id, store_id, name, is_deleted, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists live categories of a store by name.
    pub async fn list(&self, store_id: &str) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories \
             WHERE store_id = ?1 AND is_deleted = 0 ORDER BY name"
        ))
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    pub async fn get(&self, store_id: &str, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories \
             WHERE id = ?1 AND store_id = ?2 AND is_deleted = 0"
        ))
        .bind(id)
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Creates a category. Names are unique among a store's live categories.
    pub async fn create(&self, store_id: &str, name: &str) -> DbResult<Category> {
        validate_category_name(name)?;

        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4().to_string(),
            store_id: store_id.to_string(),
            name: name.trim().to_string(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO categories (id, store_id, name, is_deleted, created_at, updated_at)
            VALUES (?1, ?2, ?3, 0, ?4, ?4)
            "#,
        )
        .bind(&category.id)
        .bind(&category.store_id)
        .bind(&category.name)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("category", &category.name),
            other => other,
        })?;

        info!(store_id = %store_id, category_id = %category.id, "Category created");
        Ok(category)
    }

    /// Renames a category.
    pub async fn update(&self, store_id: &str, id: &str, name: &str) -> DbResult<Category> {
        validate_category_name(name)?;
        let name = name.trim();

        let result = sqlx::query(
            r#"
            UPDATE categories SET name = ?1, updated_at = ?2
            WHERE id = ?3 AND store_id = ?4 AND is_deleted = 0
            "#,
        )
        .bind(name)
        .bind(Utc::now())
        .bind(id)
        .bind(store_id)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("category", name),
            other => other,
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        debug!(category_id = %id, "Category renamed");
        self.get(store_id, id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Soft-deletes a category and detaches it from the store's products.
    pub async fn soft_delete(&self, store_id: &str, id: &str) -> DbResult<()> {
        let mut tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE categories SET is_deleted = 1, updated_at = ?1
            WHERE id = ?2 AND store_id = ?3 AND is_deleted = 0
            "#,
        )
        .bind(now)
        .bind(id)
        .bind(store_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        sqlx::query(
            r#"
            UPDATE products SET category_id = NULL, updated_at = ?1
            WHERE category_id = ?2 AND store_id = ?3
            "#,
        )
        .bind(now)
        .bind(id)
        .bind(store_id)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(store_id = %store_id, category_id = %id, "Category soft-deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_shop, seed_store, seed_user, test_db};
    use shopfloor_core::ErrorKind;

    #[tokio::test]
    async fn test_names_unique_within_store_only() {
        let db = test_db().await;
        let (_, store, _) = seed_shop(&db).await;
        let other_owner = seed_user(&db, "other@shop.io").await;
        let other = seed_store(&db, &other_owner.id, "Other").await;
        let categories = db.categories();

        categories.create(&store.id, "Drinks").await.unwrap();
        let err = categories.create(&store.id, "Drinks").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(categories.create(&other.id, "Drinks").await.is_ok());
    }

    #[tokio::test]
    async fn test_deleted_name_can_be_reused() {
        let db = test_db().await;
        let (_, store, _) = seed_shop(&db).await;
        let categories = db.categories();

        let first = categories.create(&store.id, "Snacks").await.unwrap();
        categories.soft_delete(&store.id, &first.id).await.unwrap();
        assert!(categories.list(&store.id).await.unwrap().is_empty());
        assert!(categories.create(&store.id, "Snacks").await.is_ok());
    }

    #[tokio::test]
    async fn test_cross_store_id_is_not_found() {
        let db = test_db().await;
        let (_, store, _) = seed_shop(&db).await;
        let other_owner = seed_user(&db, "other@shop.io").await;
        let other = seed_store(&db, &other_owner.id, "Other").await;
        let foreign = db.categories().create(&other.id, "Theirs").await.unwrap();

        assert!(db.categories().get(&store.id, &foreign.id).await.unwrap().is_none());
        let err = db
            .categories()
            .update(&store.id, &foreign.id, "Mine now")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
