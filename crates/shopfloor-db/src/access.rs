//! # Store Access Resolver
//!
//! Binds an authenticated user and a claimed store id to exactly one
//! [`StoreScope`], or refuses.
//!
//! ## Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  resolve_scope(user_id, claimed_store_id)                              │
//! │                                                                         │
//! │  claimed id blank? ───────────────────────────► InvalidInput           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT owner_id, member.role                                          │
//! │    FROM stores LEFT JOIN store_members (this user)                     │
//! │   WHERE id = ? AND NOT deleted                                         │
//! │       │                                                                 │
//! │       ├── no row ─────────────────────────────► StoreNotFound          │
//! │       ├── owner_id == user ───────────────────► scope(role = Admin)    │
//! │       ├── member row ─────────────────────────► scope(role = row.role) │
//! │       └── neither ────────────────────────────► AccessDenied           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One query, no cache. A member removed a moment ago is refused on the
//! next request.

use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::DbResult;
use shopfloor_core::{CoreError, Role, StoreScope, ValidationError};

#[derive(Debug, Clone)]
pub struct StoreAccessResolver {
    pool: SqlitePool,
}

impl StoreAccessResolver {
    pub fn new(pool: SqlitePool) -> Self {
        StoreAccessResolver { pool }
    }

    /// Resolves the scope for `user_id` acting on `claimed_store_id`.
    ///
    /// ## Errors
    /// * `InvalidInput` - the store id is absent or blank
    /// * `StoreNotFound` - no live store with that id
    /// * `AccessDenied` - the user neither owns nor belongs to the store
    pub async fn resolve_scope(
        &self,
        user_id: &str,
        claimed_store_id: Option<&str>,
    ) -> DbResult<StoreScope> {
        let store_id = claimed_store_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| CoreError::InvalidInput(ValidationError::required("store id")))?;

        let row: Option<(String, Option<Role>)> = sqlx::query_as(
            r#"
            SELECT s.owner_id, m.role
            FROM stores s
            LEFT JOIN store_members m ON m.store_id = s.id AND m.user_id = ?1
            WHERE s.id = ?2 AND s.is_deleted = 0
            "#,
        )
        .bind(user_id)
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some((owner_id, member_role)) = row else {
            debug!(store_id = %store_id, "Claimed store does not exist");
            return Err(CoreError::StoreNotFound(store_id.to_string()).into());
        };

        let role = if owner_id == user_id {
            Role::Admin
        } else if let Some(role) = member_role {
            role
        } else {
            warn!(user_id = %user_id, store_id = %store_id, "Store access denied");
            return Err(CoreError::access_denied("you are not a member of this store").into());
        };

        Ok(StoreScope {
            user_id: user_id.to_string(),
            store_id: store_id.to_string(),
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_store, seed_user, test_db};
    use shopfloor_core::ErrorKind;

    #[tokio::test]
    async fn test_owner_resolves_to_admin() {
        let db = test_db().await;
        let owner = seed_user(&db, "owner@shop.io").await;
        let store = seed_store(&db, &owner.id, "Corner").await;

        let scope = db.access().resolve_scope(&owner.id, Some(&store.id)).await.unwrap();
        assert_eq!(scope.role, Role::Admin);
        assert_eq!(scope.store_id, store.id);
    }

    #[tokio::test]
    async fn test_member_gets_membership_role() {
        let db = test_db().await;
        let owner = seed_user(&db, "owner@shop.io").await;
        let cashier = seed_user(&db, "till@shop.io").await;
        let store = seed_store(&db, &owner.id, "Corner").await;
        db.stores()
            .add_member(&store.id, "till@shop.io", Role::Cashier)
            .await
            .unwrap();

        let scope = db.access().resolve_scope(&cashier.id, Some(&store.id)).await.unwrap();
        assert_eq!(scope.role, Role::Cashier);
    }

    #[tokio::test]
    async fn test_outsider_is_denied() {
        let db = test_db().await;
        let owner = seed_user(&db, "owner@shop.io").await;
        let outsider = seed_user(&db, "other@shop.io").await;
        let store = seed_store(&db, &owner.id, "Corner").await;

        let err = db
            .access()
            .resolve_scope(&outsider.id, Some(&store.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);
    }

    #[tokio::test]
    async fn test_missing_and_blank_store_ids() {
        let db = test_db().await;
        let user = seed_user(&db, "owner@shop.io").await;

        let err = db.access().resolve_scope(&user.id, Some("nope")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StoreNotFound);

        for claimed in [None, Some(""), Some("   ")] {
            let err = db.access().resolve_scope(&user.id, claimed).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
            assert!(err.to_string().contains("store id is required"));
        }
    }

    #[tokio::test]
    async fn test_removed_member_loses_access_immediately() {
        let db = test_db().await;
        let owner = seed_user(&db, "owner@shop.io").await;
        let cashier = seed_user(&db, "till@shop.io").await;
        let store = seed_store(&db, &owner.id, "Corner").await;
        let stores = db.stores();
        stores.add_member(&store.id, "till@shop.io", Role::Cashier).await.unwrap();
        assert!(db.access().resolve_scope(&cashier.id, Some(&store.id)).await.is_ok());

        stores.remove_member(&store.id, &cashier.id).await.unwrap();
        let err = db
            .access()
            .resolve_scope(&cashier.id, Some(&store.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);
    }

    #[tokio::test]
    async fn test_deleted_store_is_not_found() {
        let db = test_db().await;
        let owner = seed_user(&db, "owner@shop.io").await;
        let store = seed_store(&db, &owner.id, "Corner").await;
        db.stores().soft_delete(&store.id, &owner.id).await.unwrap();

        let err = db.access().resolve_scope(&owner.id, Some(&store.id)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StoreNotFound);
    }
}
