//! # Store Error Types
//!
//! Error types for snapshot persistence.
//!
//! ## Error Flow
//! ```text
//! SQLite error (sqlx::Error) ──► StoreError (adds context)
//! JSON error (serde_json)    ──► StoreError::{Corrupt, Encode}
//!                                      │
//!                                      ▼
//!                            caller surfaces a user-facing message
//! ```

use thiserror::Error;

/// Snapshot persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
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
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A stored payload no longer deserializes into the expected shape.
    ///
    /// ## When This Occurs
    /// - The database was written by an incompatible version
    /// - The file was edited or truncated by hand
    #[error("Snapshot for '{collection}' is corrupt: {source}")]
    Corrupt {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    /// A collection failed to serialize (should not happen for the domain
    /// types; kept explicit rather than panicking).
    #[error("Snapshot for '{collection}' failed to encode: {source}")]
    Encode {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a Corrupt error for a collection.
    pub fn corrupt(collection: impl Into<String>, source: serde_json::Error) -> Self {
        StoreError::Corrupt {
            collection: collection.into(),
            source,
        }
    }

    /// Creates an Encode error for a collection.
    pub fn encode(collection: impl Into<String>, source: serde_json::Error) -> Self {
        StoreError::Encode {
            collection: collection.into(),
            source,
        }
    }
}

/// Convert sqlx errors to StoreError.
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => StoreError::PoolExhausted,
            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("Pool is closed".to_string()),
            sqlx::Error::Database(db_err) => StoreError::QueryFailed(db_err.message().to_string()),
            _ => StoreError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
