//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)        Domain rule (CoreError)             │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ActionError (apotheca-actions) ← Picks the user-facing message        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ServiceResponse { success: false, message }                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use apotheca_core::CoreError;
use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - Sale id passed to get/update/delete doesn't exist
    /// - Item id passed to an item lookup doesn't exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - A sale line references an item id that doesn't exist
    /// - The stock ledger is asked to adjust a missing item
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A domain rule rejected the write (e.g. stock would go negative).
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    ///
    /// ## When This Occurs
    /// - Runtime SQL error
    /// - A trigger aborted the statement
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction could not begin or commit.
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
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a ForeignKeyViolation error.
    pub fn foreign_key(message: impl Into<String>) -> Self {
        DbError::ForeignKeyViolation {
            message: message.into(),
        }
    }

    /// Checks whether this is a NotFound for the given entity.
    pub fn is_not_found(&self, entity: &str) -> bool {
        matches!(self, DbError::NotFound { entity: e, .. } if e == entity)
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → ForeignKeyViolation or QueryFailed
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

                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("FOREIGN KEY constraint failed") {
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
    use crate::pool::{Database, DbConfig};

    #[test]
    fn test_not_found_helpers() {
        let err = DbError::not_found("Sale", 7);
        assert_eq!(err.to_string(), "Sale not found: 7");
        assert!(err.is_not_found("Sale"));
        assert!(!err.is_not_found("Item"));
    }

    #[tokio::test]
    async fn test_constraint_errors_map_by_kind() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let insert = "INSERT INTO items (id, name, created_at, updated_at) \
                      VALUES (1, 'Gauze', '2025-01-01T00:00:00.000Z', '2025-01-01T00:00:00.000Z')";
        sqlx::query(insert).execute(db.pool()).await.unwrap();

        let dup: DbError = sqlx::query(insert).execute(db.pool()).await.unwrap_err().into();
        assert!(matches!(dup, DbError::QueryFailed(ref msg) if msg.contains("UNIQUE")));

        let fk: DbError = sqlx::query(
            "INSERT INTO sale_items (sale_id, item_id, quantity, price) VALUES (999, 1, 1, '1')",
        )
        .execute(db.pool())
        .await
        .unwrap_err()
        .into();
        assert!(matches!(fk, DbError::ForeignKeyViolation { .. }));
    }

    #[test]
    fn test_domain_error_is_transparent() {
        let err: DbError = CoreError::InsufficientStock {
            item_id: 1,
            available: 0,
            requested: 2,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Insufficient stock for item 1: available 0, requested 2"
        );
    }
}
