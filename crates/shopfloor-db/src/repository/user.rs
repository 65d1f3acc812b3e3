//! # User Repository
//!
//! Users, their stored refresh token, and super admins.
//!
//! ## Refresh Token Rotation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  login            ── set_refresh_token(id, Some(t1))                   │
//! │  POST refresh(t1) ── rotate_refresh_token(id, t1, t2)                  │
//! │                      UPDATE .. SET refresh_token = t2                  │
//! │                       WHERE id = ? AND refresh_token = t1              │
//! │                      rows == 1 → rotated                               │
//! │                      rows == 0 → t1 was already used or revoked        │
//! │  logout           ── set_refresh_token(id, None)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two concurrent refreshes presenting the same token cannot both win.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use shopfloor_core::{Plan, User};

const USER_COLUMNS: &str = "id, email, fullname, password_hash, refresh_token, plan, \
                            is_deleted, created_at, updated_at";

/// Emails are compared case-insensitively; stored lowercase.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a new user on the basic plan.
    ///
    /// `password_hash` must already be hashed (see [`crate::password`]).
    pub async fn create(&self, email: &str, fullname: &str, password_hash: &str) -> DbResult<User> {
        let email = normalize_email(email);
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            fullname: fullname.trim().to_string(),
            password_hash: password_hash.to_string(),
            refresh_token: None,
            plan: Plan::default(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %user.id, "Creating user");

        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, fullname, password_hash, refresh_token,
                plan, is_deleted, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, NULL, ?5, 0, ?6, ?6)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.fullname)
        .bind(&user.password_hash)
        .bind(user.plan)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("email", &user.email),
            other => other,
        })?;

        info!(id = %user.id, "User registered");
        Ok(user)
    }

    /// Gets a live user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1 AND is_deleted = 0"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a live user by email.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?1 AND is_deleted = 0"
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Lists live users, oldest first.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE is_deleted = 0 ORDER BY created_at, rowid"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Stores (or clears) the user's current refresh token.
    pub async fn set_refresh_token(&self, id: &str, token: Option<&str>) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE users SET refresh_token = ?1, updated_at = ?2 WHERE id = ?3 AND is_deleted = 0",
        )
        .bind(token)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    /// Replaces `presented` with `next` only if `presented` is the stored
    /// token. Returns whether the swap happened.
    pub async fn rotate_refresh_token(&self, id: &str, presented: &str, next: &str) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users SET refresh_token = ?1, updated_at = ?2
            WHERE id = ?3 AND refresh_token = ?4 AND is_deleted = 0
            "#,
        )
        .bind(next)
        .bind(Utc::now())
        .bind(id)
        .bind(presented)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Replaces the password hash. Also revokes the stored refresh token.
    pub async fn update_password_hash(&self, id: &str, password_hash: &str) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET password_hash = ?1, refresh_token = NULL, updated_at = ?2
            WHERE id = ?3 AND is_deleted = 0
            "#,
        )
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        info!(id = %id, "Password changed");
        Ok(())
    }

    /// Changes a user's plan.
    pub async fn update_plan(&self, id: &str, plan: Plan) -> DbResult<User> {
        let result = sqlx::query(
            "UPDATE users SET plan = ?1, updated_at = ?2 WHERE id = ?3 AND is_deleted = 0",
        )
        .bind(plan)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        info!(id = %id, plan = %plan, "Plan updated");
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    /// Soft-deletes a user. Sales they recorded keep referencing the row.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET is_deleted = 1, refresh_token = NULL, updated_at = ?1
            WHERE id = ?2 AND is_deleted = 0
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        info!(id = %id, "User soft-deleted");
        Ok(())
    }
}

// =============================================================================
// Super Admins
// =============================================================================

/// A platform operator account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SuperAdmin {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SuperAdminRepository {
    pool: SqlitePool,
}

impl SuperAdminRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SuperAdminRepository { pool }
    }

    /// Inserts a super admin. `password_hash` must already be hashed.
    pub async fn create(&self, email: &str, password_hash: &str) -> DbResult<SuperAdmin> {
        let admin = SuperAdmin {
            id: Uuid::new_v4().to_string(),
            email: normalize_email(email),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO super_admins (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&admin.id)
        .bind(&admin.email)
        .bind(&admin.password_hash)
        .bind(admin.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("email", &admin.email),
            other => other,
        })?;

        info!(id = %admin.id, "Super admin created");
        Ok(admin)
    }

    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<SuperAdmin>> {
        let admin = sqlx::query_as::<_, SuperAdmin>(
            "SELECT id, email, password_hash, created_at FROM super_admins WHERE email = ?1",
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;

        Ok(admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_user, test_db};
    use shopfloor_core::ErrorKind;

    #[tokio::test]
    async fn test_create_defaults_to_basic_and_normalizes_email() {
        let db = test_db().await;
        let user = seed_user(&db, "  Cashier@Shop.IO ").await;
        assert_eq!(user.email, "cashier@shop.io");
        assert_eq!(user.plan, Plan::Basic);

        let found = db.users().get_by_email("CASHIER@shop.io").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = test_db().await;
        seed_user(&db, "a@shop.io").await;
        let err = db.users().create("a@shop.io", "Again", "hash").await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_refresh_token_rotation_is_single_use() {
        let db = test_db().await;
        let user = seed_user(&db, "a@shop.io").await;
        let users = db.users();

        users.set_refresh_token(&user.id, Some("t1")).await.unwrap();
        assert!(users.rotate_refresh_token(&user.id, "t1", "t2").await.unwrap());
        // Replaying the old token fails.
        assert!(!users.rotate_refresh_token(&user.id, "t1", "t3").await.unwrap());

        users.set_refresh_token(&user.id, None).await.unwrap();
        assert!(!users.rotate_refresh_token(&user.id, "t2", "t4").await.unwrap());
    }

    #[tokio::test]
    async fn test_soft_deleted_user_is_hidden() {
        let db = test_db().await;
        let user = seed_user(&db, "a@shop.io").await;
        db.users().soft_delete(&user.id).await.unwrap();

        assert!(db.users().get_by_id(&user.id).await.unwrap().is_none());
        assert!(db.users().soft_delete(&user.id).await.is_err());
    }

    #[tokio::test]
    async fn test_update_plan() {
        let db = test_db().await;
        let user = seed_user(&db, "a@shop.io").await;
        let updated = db.users().update_plan(&user.id, Plan::Premium).await.unwrap();
        assert_eq!(updated.plan, Plan::Premium);
    }

    #[tokio::test]
    async fn test_super_admin_lookup() {
        let db = test_db().await;
        let created = db.super_admins().create("Root@Shop.io", "hash").await.unwrap();
        let found = db.super_admins().get_by_email("root@shop.io").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
    }
}
