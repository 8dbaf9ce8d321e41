//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ├──► import: per-record → SkippedRecord (batch continues)        │
//! │       │            at commit  → Err(DbError) (batch rolled back)       │
//! │       │                                                                 │
//! │       └──► everything else: returned to the caller                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bookstore_core::ValidationError;
use thiserror::Error;

/// Everything that can go wrong between the bookstore and SQLite.
#[derive(Debug, Error)]
pub enum DbError {
    /// No row with that id.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Importing a record whose identifier is already taken
    #[error("Duplicate key: {column} is already taken")]
    UniqueViolation { column: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Book referencing a publisher that doesn't exist (yet)
    /// - Sale referencing a non-existent stock entry
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK or NOT NULL constraint rejected the write.
    ///
    /// ## When This Occurs
    /// - `stock.count < 0`
    /// - `sale.price_cents < 0`, `sale.count <= 0`
    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    /// Entity rejected before reaching the database.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// An existing table doesn't have the expected shape.
    #[error("Table '{table}' has an incompatible shape: {reason}")]
    SchemaMismatch { table: String, reason: String },

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed to begin or commit.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Fixture source couldn't be read or decoded.
    #[error("Fixture error: {0}")]
    Fixture(String),

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

    /// Whether this error is a constraint rejection (unique, foreign key,
    /// check or not-null).
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DbError::UniqueViolation { .. }
                | DbError::ForeignKeyViolation { .. }
                | DbError::ConstraintViolation { .. }
        )
    }
}

/// Maps sqlx errors onto [`DbError`].
///
/// ```text
/// Database("UNIQUE constraint failed: publisher.id") → UniqueViolation
/// Database("FOREIGN KEY constraint failed")          → ForeignKeyViolation
/// Database("CHECK ..." / "NOT NULL ...")             → ConstraintViolation
/// Database(other)                                    → QueryFailed
/// PoolTimedOut                                       → PoolExhausted
/// PoolClosed / Io                                    → ConnectionFailed
/// anything else                                      → Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => classify(db_err.message()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            sqlx::Error::Io(e) => DbError::ConnectionFailed(e.to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

/// Sorts an SQLite error message into a constraint kind.
fn classify(message: &str) -> DbError {
    if let Some(column) = message.strip_prefix("UNIQUE constraint failed: ") {
        DbError::UniqueViolation {
            column: column.to_string(),
        }
    } else if message.starts_with("FOREIGN KEY constraint failed") {
        DbError::ForeignKeyViolation {
            message: message.to_string(),
        }
    } else if message.starts_with("CHECK constraint failed")
        || message.starts_with("NOT NULL constraint failed")
    {
        DbError::ConstraintViolation {
            message: message.to_string(),
        }
    } else {
        DbError::QueryFailed(message.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================
