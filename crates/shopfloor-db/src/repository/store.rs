//! # Store Repository
//!
//! Stores (tenants) and their memberships.
//!
//! ## Store Creation Under the Plan Limit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN IMMEDIATE            (write lock taken before counting)         │
//! │    SELECT plan FROM users WHERE id = owner                             │
//! │    SELECT COUNT(*) FROM stores WHERE owner_id = owner (deleted too)    │
//! │    check_store_limit(plan, count) ──► PlanLimitExceeded, rollback      │
//! │    INSERT stores                                                       │
//! │    INSERT store_members (owner, admin)                                 │
//! │  COMMIT                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two concurrent creations for the same owner serialize on the write lock,
//! so the second one counts the first one's row.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use shopfloor_core::authz::check_store_limit;
use shopfloor_core::validation::validate_store_name;
use shopfloor_core::{CoreError, Member, Plan, Role, Store, StoreMembership};

const STORE_COLUMNS: &str = "id, name, owner_id, is_deleted, created_at, updated_at";

/// Soft-deleted stores still count against the plan limit.
const COUNT_OWNED: &str = "SELECT COUNT(*) FROM stores WHERE owner_id = ?1";

/// Repository for store and membership operations.
#[derive(Debug, Clone)]
pub struct StoreRepository {
    pool: SqlitePool,
}

impl StoreRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StoreRepository { pool }
    }

    /// Creates a store owned by `owner_id`, subject to the owner's plan.
    ///
    /// ## Errors
    /// * `InvalidInput` - blank or overlong name
    /// * `NotFound` - owner does not exist
    /// * `PlanLimitExceeded` - owner already owns `plan.store_limit()` stores
    pub async fn create(&self, owner_id: &str, name: &str) -> DbResult<Store> {
        validate_store_name(name)?;

        let mut tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let plan: Option<Plan> =
            sqlx::query_scalar("SELECT plan FROM users WHERE id = ?1 AND is_deleted = 0")
                .bind(owner_id)
                .fetch_optional(&mut *tx)
                .await?;
        let plan = plan.ok_or_else(|| DbError::not_found("User", owner_id))?;

        let owned: i64 =
            sqlx::query_scalar(COUNT_OWNED)
                .bind(owner_id)
                .fetch_one(&mut *tx)
                .await?;

        if let Err(e) = check_store_limit(plan, owned) {
            warn!(owner_id = %owner_id, plan = %plan, owned, "Store limit reached");
            return Err(e.into());
        }

        let now = Utc::now();
        let store = Store {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            owner_id: owner_id.to_string(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO stores (id, name, owner_id, is_deleted, created_at, updated_at)
            VALUES (?1, ?2, ?3, 0, ?4, ?4)
            "#,
        )
        .bind(&store.id)
        .bind(&store.name)
        .bind(&store.owner_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO store_members (store_id, user_id, role, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&store.id)
        .bind(owner_id)
        .bind(Role::Admin)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(store_id = %store.id, owner_id = %owner_id, "Store created");
        Ok(store)
    }

    /// Gets a live store by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Store>> {
        let store = sqlx::query_as::<_, Store>(&format!(
            "SELECT {STORE_COLUMNS} FROM stores WHERE id = ?1 AND is_deleted = 0"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(store)
    }

    /// Lists live stores the user owns or belongs to, with the user's
    /// effective role in each.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<StoreMembership>> {
        let stores = sqlx::query_as::<_, StoreMembership>(
            r#"
            SELECT
                s.id AS store_id,
                s.name AS store_name,
                s.owner_id,
                CASE WHEN s.owner_id = ?1 THEN 'admin' ELSE m.role END AS role,
                s.created_at
            FROM stores s
            LEFT JOIN store_members m ON m.store_id = s.id AND m.user_id = ?1
            WHERE s.is_deleted = 0
              AND (s.owner_id = ?1 OR m.user_id IS NOT NULL)
            ORDER BY s.created_at, s.rowid
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(stores)
    }

    /// Counts every store a user has created, deleted ones included.
    pub async fn count_owned(&self, owner_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar(COUNT_OWNED)
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Renames a store.
    pub async fn update_name(&self, id: &str, name: &str) -> DbResult<Store> {
        validate_store_name(name)?;

        let result = sqlx::query(
            "UPDATE stores SET name = ?1, updated_at = ?2 WHERE id = ?3 AND is_deleted = 0",
        )
        .bind(name.trim())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Store", id));
        }

        debug!(store_id = %id, "Store renamed");
        self.get(id).await?.ok_or_else(|| DbError::not_found("Store", id))
    }

    /// Soft-deletes a store. Only its owner may do this.
    pub async fn soft_delete(&self, id: &str, acting_user_id: &str) -> DbResult<()> {
        let store = self
            .get(id)
            .await?
            .ok_or_else(|| CoreError::StoreNotFound(id.to_string()))?;

        if store.owner_id != acting_user_id {
            warn!(store_id = %id, user_id = %acting_user_id, "Non-owner tried to delete store");
            return Err(CoreError::access_denied("only the store owner may delete the store").into());
        }

        let result = sqlx::query(
            r#"
            UPDATE stores SET is_deleted = 1, updated_at = ?1
            WHERE id = ?2 AND owner_id = ?3 AND is_deleted = 0
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .bind(acting_user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::StoreNotFound(id.to_string()).into());
        }

        info!(store_id = %id, "Store soft-deleted");
        Ok(())
    }

    // =========================================================================
    // Members
    // =========================================================================

    /// Adds the user registered under `email` to the store with `role`.
    pub async fn add_member(&self, store_id: &str, email: &str, role: Role) -> DbResult<Member> {
        let email = email.trim().to_lowercase();

        let user: Option<(String, String)> = sqlx::query_as(
            "SELECT id, fullname FROM users WHERE email = ?1 AND is_deleted = 0",
        )
        .bind(&email)
        .fetch_optional(&self.pool)
        .await?;
        let (user_id, fullname) = user.ok_or_else(|| DbError::not_found("User", &email))?;

        sqlx::query(
            "INSERT INTO store_members (store_id, user_id, role, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(store_id)
        .bind(&user_id)
        .bind(role)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("member", &email),
            other => other,
        })?;

        info!(store_id = %store_id, user_id = %user_id, role = %role, "Member added");
        Ok(Member {
            user_id,
            email,
            fullname,
            role,
        })
    }

    /// Removes a member. The owner cannot be removed.
    pub async fn remove_member(&self, store_id: &str, user_id: &str) -> DbResult<()> {
        let owner_id: Option<String> =
            sqlx::query_scalar("SELECT owner_id FROM stores WHERE id = ?1 AND is_deleted = 0")
                .bind(store_id)
                .fetch_optional(&self.pool)
                .await?;
        let owner_id = owner_id.ok_or_else(|| CoreError::StoreNotFound(store_id.to_string()))?;

        if owner_id == user_id {
            return Err(CoreError::access_denied("the store owner cannot be removed").into());
        }

        let result = sqlx::query("DELETE FROM store_members WHERE store_id = ?1 AND user_id = ?2")
            .bind(store_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Member", user_id));
        }

        info!(store_id = %store_id, user_id = %user_id, "Member removed");
        Ok(())
    }

    /// Lists a store's members, owner first.
    pub async fn members(&self, store_id: &str) -> DbResult<Vec<Member>> {
        let members = sqlx::query_as::<_, Member>(
            r#"
            SELECT u.id AS user_id, u.email, u.fullname, m.role
            FROM store_members m
            JOIN users u ON u.id = m.user_id
            JOIN stores s ON s.id = m.store_id
            WHERE m.store_id = ?1 AND u.is_deleted = 0
            ORDER BY (u.id = s.owner_id) DESC, m.created_at, u.email
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_store, seed_user, test_db};
    use shopfloor_core::ErrorKind;

    #[tokio::test]
    async fn test_basic_plan_second_store_rejected() {
        let db = test_db().await;
        let owner = seed_user(&db, "owner@shop.io").await;
        seed_store(&db, &owner.id, "First").await;

        let err = db.stores().create(&owner.id, "Second").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PlanLimitExceeded);
        // No row was created.
        assert_eq!(db.stores().count_owned(&owner.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upgraded_plan_allows_more_stores() {
        let db = test_db().await;
        let owner = seed_user(&db, "owner@shop.io").await;
        db.users().update_plan(&owner.id, Plan::Standard).await.unwrap();

        for name in ["One", "Two", "Three"] {
            seed_store(&db, &owner.id, name).await;
        }
        let err = db.stores().create(&owner.id, "Four").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PlanLimitExceeded);
    }

    #[tokio::test]
    async fn test_deleted_store_keeps_plan_slot() {
        let db = test_db().await;
        let owner = seed_user(&db, "owner@shop.io").await;
        let first = seed_store(&db, &owner.id, "First").await;
        db.stores().soft_delete(&first.id, &owner.id).await.unwrap();

        let err = db.stores().create(&owner.id, "Second").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PlanLimitExceeded);
        assert_eq!(db.stores().count_owned(&owner.id).await.unwrap(), 1);
        assert!(db.stores().list_for_user(&owner.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_owner_is_admin_member_and_listed() {
        let db = test_db().await;
        let owner = seed_user(&db, "owner@shop.io").await;
        let store = seed_store(&db, &owner.id, "Corner").await;

        let members = db.stores().members(&store.id).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].role, Role::Admin);

        let listed = db.stores().list_for_user(&owner.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].store_name, "Corner");
        assert_eq!(listed[0].role, Role::Admin);
    }

    #[tokio::test]
    async fn test_member_management() {
        let db = test_db().await;
        let owner = seed_user(&db, "owner@shop.io").await;
        let cashier = seed_user(&db, "till@shop.io").await;
        let store = seed_store(&db, &owner.id, "Corner").await;
        let stores = db.stores();

        let member = stores.add_member(&store.id, "Till@Shop.io", Role::Cashier).await.unwrap();
        assert_eq!(member.user_id, cashier.id);

        let dup = stores.add_member(&store.id, "till@shop.io", Role::Admin).await.unwrap_err();
        assert!(matches!(dup, DbError::UniqueViolation { .. }));

        let listed = stores.list_for_user(&cashier.id).await.unwrap();
        assert_eq!(listed[0].role, Role::Cashier);

        let err = stores.remove_member(&store.id, &owner.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);

        stores.remove_member(&store.id, &cashier.id).await.unwrap();
        assert!(stores.list_for_user(&cashier.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_member_email() {
        let db = test_db().await;
        let owner = seed_user(&db, "owner@shop.io").await;
        let store = seed_store(&db, &owner.id, "Corner").await;

        let err = db
            .stores()
            .add_member(&store.id, "ghost@shop.io", Role::Cashier)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_only_owner_deletes_store() {
        let db = test_db().await;
        let owner = seed_user(&db, "owner@shop.io").await;
        let admin = seed_user(&db, "admin@shop.io").await;
        let store = seed_store(&db, &owner.id, "Corner").await;
        db.stores().add_member(&store.id, "admin@shop.io", Role::Admin).await.unwrap();

        let err = db.stores().soft_delete(&store.id, &admin.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);
        db.stores().soft_delete(&store.id, &owner.id).await.unwrap();
        assert!(db.stores().get(&store.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rename_validates() {
        let db = test_db().await;
        let owner = seed_user(&db, "owner@shop.io").await;
        let store = seed_store(&db, &owner.id, "Corner").await;

        let renamed = db.stores().update_name(&store.id, " Main St ").await.unwrap();
        assert_eq!(renamed.name, "Main St");
        let err = db.stores().update_name(&store.id, "  ").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
