//! # Repository Module
//!
//! Database repository implementations for Shopfloor.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Route handler (after access resolution + authorize)                   │
//! │       │                                                                 │
//! │       │  db.products().list(&scope.store_id)                           │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── list(&self, store_id)                                             │
//! │  ├── get(&self, store_id, id)                                          │
//! │  ├── create(&self, store_id, input)                                    │
//! │  └── update(&self, store_id, id, update)                               │
//! │       │                                                                 │
//! │       │  SQL, always filtered by store_id                              │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`UserRepository`](user::UserRepository) - Users and refresh tokens
//! - [`SuperAdminRepository`](user::SuperAdminRepository) - Platform operators
//! - [`StoreRepository`](store::StoreRepository) - Stores and memberships
//! - [`CategoryRepository`](category::CategoryRepository) - Categories
//! - [`ProductRepository`](product::ProductRepository) - Products
//! - [`SaleRepository`](sale::SaleRepository) - The sale transaction engine

pub mod category;
pub mod product;
pub mod sale;
pub mod store;
pub mod user;
