//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)         Domain failure (CoreError)         │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  DbError (this module) ← storage variants + DbError::Domain            │
//! │       │                                                                 │
//! │       │ kind() → ErrorKind (StorageFailure for every storage variant)  │
//! │       ▼                                                                 │
//! │  ApiError (in apps/api) ← status code + JSON body                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use shopfloor_core::{CoreError, ErrorKind, ValidationError};
use thiserror::Error;

/// Database operation errors.
///
/// Wraps sqlx errors and domain errors raised while a repository holds a
/// connection or transaction (stock conflicts, missing references, access
/// checks).
#[derive(Debug, Error)]
pub enum DbError {
    /// A domain rule failed. Carries its own `ErrorKind`.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - ID doesn't exist
    /// - Soft-deleted record
    /// - Record belongs to another store
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Registering an email that already exists
    /// - Duplicate category name within a store
    /// - Adding a member twice
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed to begin or commit.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Maps onto the shared taxonomy.
    ///
    /// ```text
    /// Domain(e)            → e.kind()
    /// NotFound             → ReferenceNotFound
    /// UniqueViolation      → InvalidInput
    /// ForeignKeyViolation  → ReferenceNotFound
    /// everything else      → StorageFailure
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::Domain(e) => e.kind(),
            DbError::NotFound { .. } | DbError::ForeignKeyViolation { .. } => {
                ErrorKind::ReferenceNotFound
            }
            DbError::UniqueViolation { .. } => ErrorKind::InvalidInput,
            DbError::ConnectionFailed(_)
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::TransactionFailed(_)
            | DbError::PoolExhausted
            | DbError::Internal(_) => ErrorKind::StorageFailure,
        }
    }
}

impl From<ValidationError> for DbError {
    fn from(err: ValidationError) -> Self {
        DbError::Domain(CoreError::InvalidInput(err))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // "UNIQUE constraint failed: <table>.<column>"
                // "FOREIGN KEY constraint failed"
                // "CHECK constraint failed: stock_quantity >= 0"
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_variants_are_storage_failure() {
        assert_eq!(DbError::PoolExhausted.kind(), ErrorKind::StorageFailure);
        assert_eq!(
            DbError::TransactionFailed("busy".into()).kind(),
            ErrorKind::StorageFailure
        );
    }

    #[test]
    fn test_domain_kind_passes_through() {
        let err: DbError = CoreError::StoreNotFound("s1".into()).into();
        assert_eq!(err.kind(), ErrorKind::StoreNotFound);
        assert_eq!(err.to_string(), "Store not found: s1");
    }

    #[test]
    fn test_validation_becomes_invalid_input() {
        let err: DbError = ValidationError::required("name").into();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
