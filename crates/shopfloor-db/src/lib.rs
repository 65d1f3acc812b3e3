//! # shopfloor-db: Database Layer for Shopfloor
//!
//! SQLite storage for every tenant: users, stores, memberships, catalog and
//! sales. Owns the two storage-side pieces of the access path (store access
//! resolution and the atomic sale transaction).
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopfloor Data Flow                              │
//! │                                                                         │
//! │  POST /sales  (bearer token, store-id header)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  shopfloor-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ StoreRepo     │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo   │    │ 001_initial_ │  │   │
//! │  │   │ WAL, FKs      │    │ SaleRepo ★    │    │  schema.sql  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │            ▲                                                    │   │
//! │  │   ┌────────┴──────────┐                                        │   │
//! │  │   │ StoreAccess-      │  (user, claimed store) → StoreScope    │   │
//! │  │   │ Resolver          │                                        │   │
//! │  │   └───────────────────┘                                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (DATABASE_PATH)                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`access`] - Store access resolver
//! - [`password`] - Argon2 password hashing
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shopfloor_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./shopfloor.db")).await?;
//!
//! let scope = db.access().resolve_scope(&user_id, Some(&store_id)).await?;
//! let sale = db.sales().record_sale(&scope, &user_id, &request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod error;
pub mod migrations;
pub mod password;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub(crate) mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use access::StoreAccessResolver;
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::store::StoreRepository;
pub use repository::user::{SuperAdmin, SuperAdminRepository, UserRepository};
