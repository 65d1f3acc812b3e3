//! # shopfloor-core: Pure Business Logic for Shopfloor
//!
//! Every decision that does not need I/O lives here: the domain types, the
//! error taxonomy, input validation, role authorization, the plan limit, and
//! sale pricing.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopfloor Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apps/api (axum HTTP server)                     │   │
//! │  │   bearer auth ──► store-id header ──► route handler             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ shopfloor-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │  authz  │ │  sale   │ │validate │  │   │
//! │  │   │ Product │ │  Money  │ │Operation│ │ pricing │ │  rules  │  │   │
//! │  │   │  Sale   │ │         │ │  Plan   │ │  stock  │ │         │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              shopfloor-db (Database Layer)                      │   │
//! │  │   access resolver, sale transaction engine, repositories        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Store, Product, Sale, Role, Plan, ...)
//! - [`money`] - Integer money
//! - [`error`] - Error taxonomy shared by every layer
//! - [`validation`] - Business rule validation
//! - [`authz`] - Role allow-sets and the plan store limit
//! - [`sale`] - Sale request validation and pricing
//!
//! ## Example Usage
//!
//! ```rust
//! use shopfloor_core::authz::{authorize, Operation};
//! use shopfloor_core::{Role, StoreScope};
//!
//! let scope = StoreScope {
//!     user_id: "u1".into(),
//!     store_id: "s1".into(),
//!     role: Role::Cashier,
//! };
//! assert!(authorize(Operation::RecordSale, &scope).is_ok());
//! assert!(authorize(Operation::DeleteProduct, &scope).is_err());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod authz;
pub mod error;
pub mod money;
pub mod sale;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ErrorKind, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single sale request.
pub const MAX_SALE_LINES: usize = 100;
