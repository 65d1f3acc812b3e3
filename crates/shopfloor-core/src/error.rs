//! # Error Types
//!
//! Domain-specific error types for shopfloor-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopfloor-core errors (this file)                                     │
//! │  ├── CoreError        - Domain failures (stock, access, plan, ...)     │
//! │  ├── ValidationError  - Input shape failures                           │
//! │  └── ErrorKind        - The flat taxonomy every error maps onto        │
//! │                                                                         │
//! │  shopfloor-db errors (separate crate)                                  │
//! │  └── DbError          - Wraps CoreError + storage failures             │
//! │                                                                         │
//! │  API errors (in app)                                                   │
//! │  └── ApiError         - What HTTP clients see                          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Error Kind
// =============================================================================

/// The closed error taxonomy shared by every layer.
///
/// ## Status Classes
/// ```text
/// InvalidInput        400   shape / validation problem, nothing touched
/// ReferenceNotFound   400   product missing, deleted or in another store
/// AccessDenied        403   not a member, or role not allowed
/// PlanLimitExceeded   403   owned-store ceiling reached
/// StoreNotFound       404   claimed store does not exist
/// InsufficientStock   409   caller may retry with adjusted quantities
/// AuthExpired         401   client refreshes the session and retries once
/// StorageFailure      500   fatal for the operation, never auto-retried
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    ReferenceNotFound,
    InsufficientStock,
    AccessDenied,
    StoreNotFound,
    PlanLimitExceeded,
    StorageFailure,
    AuthExpired,
}

impl ErrorKind {
    /// HTTP status code class for this kind.
    pub const fn status_code(self) -> u16 {
        match self {
            ErrorKind::InvalidInput | ErrorKind::ReferenceNotFound => 400,
            ErrorKind::AuthExpired => 401,
            ErrorKind::AccessDenied | ErrorKind::PlanLimitExceeded => 403,
            ErrorKind::StoreNotFound => 404,
            ErrorKind::InsufficientStock => 409,
            ErrorKind::StorageFailure => 500,
        }
    }

    /// Whether the caller can reasonably retry with revised input.
    pub const fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::InsufficientStock)
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant except `AuthExpired` is terminal for the originating call.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Request failed shape validation before any storage access.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// One or more referenced products are missing, deleted, or belong to a
    /// different store.
    ///
    /// ## When This Occurs
    /// ```text
    /// requested ids: {A, B, C}      (3 distinct)
    /// loaded in store: {A, C}       (2 rows)
    ///      │
    ///      ▼
    /// 3 != 2  ──► ReferenceNotFound { missing: [B] }
    /// ```
    #[error("{entity} not found or not in this store: {}", ids.join(", "))]
    ReferenceNotFound { entity: String, ids: Vec<String> },

    /// Insufficient stock to complete a sale.
    ///
    /// Raised both by the read-time check and by a conditional decrement that
    /// matched zero rows at write time.
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        name: String,
        available: i64,
        requested: i64,
    },

    /// Authenticated, but outside the permitted store or role.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// The claimed store does not exist (or was deleted).
    #[error("Store not found: {0}")]
    StoreNotFound(String),

    /// The user's plan does not allow owning another store.
    #[error("Store limit reached for your plan ({plan}): {limit} store(s). Upgrade to add more.")]
    PlanLimitExceeded { plan: String, limit: i64 },

    /// The presented credential has expired.
    #[error("Session expired")]
    AuthExpired,
}

impl CoreError {
    /// Creates a ReferenceNotFound error for product ids.
    pub fn products_not_found(ids: Vec<String>) -> Self {
        CoreError::ReferenceNotFound {
            entity: "Product".to_string(),
            ids,
        }
    }

    /// Creates an AccessDenied error.
    pub fn access_denied(reason: impl Into<String>) -> Self {
        CoreError::AccessDenied(reason.into())
    }

    /// Maps this error onto the shared taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InvalidInput(_) => ErrorKind::InvalidInput,
            CoreError::ReferenceNotFound { .. } => ErrorKind::ReferenceNotFound,
            CoreError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            CoreError::AccessDenied(_) => ErrorKind::AccessDenied,
            CoreError::StoreNotFound(_) => ErrorKind::StoreNotFound,
            CoreError::PlanLimitExceeded { .. } => ErrorKind::PlanLimitExceeded,
            CoreError::AuthExpired => ErrorKind::AuthExpired,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Collection has too many entries.
    #[error("{field} cannot have more than {max} entries")]
    TooMany { field: String, max: usize },

    /// Invalid format (e.g., malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Arithmetic on the request would overflow.
    #[error("{field} is too large")]
    Overflow { field: String },
}

impl ValidationError {
    /// Shorthand for a Required error.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}
