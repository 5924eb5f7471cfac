//! # Database Error Types
//!
//! Error types for repository operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  sqlx::Error ─────────┐                                                 │
//! │  MigrateError ────────┼──► DbError ──► ApiError ──► JSON envelope       │
//! │  serde_json::Error ───┘                                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Repository failures.
#[derive(Debug, Error)]
pub enum DbError {
    /// Document not found.
    ///
    /// ## When This Occurs
    /// - `update_by_id` / `delete_by_id` matched no document
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The stored document changed between the caller's read and write.
    ///
    /// ## When This Occurs
    /// - Two requests load the same order, and the slower one saves second
    #[error("{entity} {id} was modified concurrently")]
    StaleWrite { entity: String, id: String },

    /// A document with the same id already exists in the collection.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// `find_by_field` was given a field name that is not a plain
    /// identifier.
    #[error("Invalid field name: '{0}'")]
    InvalidField(String),

    /// A stored body could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// The SQLite file could not be opened, or the pool is closed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// No connection became free within the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn stale(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::StaleWrite {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// ```text
/// RowNotFound            → NotFound
/// unique violation       → UniqueViolation (callers fill in the id)
/// other database error   → QueryFailed
/// PoolTimedOut           → PoolExhausted
/// PoolClosed, Io         → ConnectionFailed
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("document", "?"),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::duplicate("id", db_err.message())
            }
            sqlx::Error::Database(db_err) => DbError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool closed".to_string()),
            sqlx::Error::Io(e) => DbError::ConnectionFailed(e.to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = DbError::not_found("orders", "order_123");
        assert_eq!(err.to_string(), "orders not found: order_123");
    }

    #[test]
    fn test_serde_error_converts() {
        let err: DbError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, DbError::Serialization(_)));
    }
}
