//! # Store Error Types
//!
//! Error types for durable queue operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds context and categorization             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SyncError / user-visible string at the orchestration boundary          │
//! │                                                                         │
//! │  Unavailable is special: it means the device has no working local       │
//! │  storage at all, and the caller degrades to online-only checkout        │
//! │  rather than crashing.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Durable queue operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Insert with an id that already exists in the queue.
    ///
    /// ## When This Occurs
    /// Only on a caller bug: pending-sale ids are generated time-based with
    /// a random suffix, so collisions indicate the same record was enqueued
    /// twice. Fatal to that single `put` call; nothing is overwritten.
    #[error("Pending sale '{id}' already queued")]
    DuplicateKey { id: String },

    /// The local persistent store cannot be opened.
    ///
    /// ## When This Occurs
    /// - Database file can't be created (permissions, disk full)
    /// - Unsupported runtime without local storage
    ///
    /// Fatal to offline capability for the session; callers degrade to
    /// online-only behavior and surface a warning.
    #[error("Local storage unavailable: {0}")]
    Unavailable(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed to begin or commit.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// A stored record could not be decoded (items payload, payment method).
    ///
    /// ## When This Occurs
    /// The queue replays records written by an earlier session; a record
    /// that no longer parses is reported rather than silently skipped.
    #[error("Corrupt record '{id}': {reason}")]
    CorruptRecord { id: String, reason: String },

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal store error.
    #[error("Internal store error: {0}")]
    Internal(String),
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database + UNIQUE  → handled at the repository (DuplicateKey)
/// sqlx::Error::PoolTimedOut       → StoreError::PoolExhausted
/// sqlx::Error::PoolClosed         → StoreError::Unavailable
/// Other                           → StoreError::QueryFailed / Internal
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => StoreError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => StoreError::PoolExhausted,
            sqlx::Error::PoolClosed => StoreError::Unavailable("pool is closed".to_string()),
            other => StoreError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

impl StoreError {
    /// True if the underlying sqlx error is a UNIQUE constraint violation.
    ///
    /// Repositories use this to turn a raw constraint failure into a
    /// [`StoreError::DuplicateKey`] carrying the offending id.
    pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
        matches!(
            err,
            sqlx::Error::Database(db_err)
                if db_err.message().contains("UNIQUE constraint failed")
        )
    }
}

/// Result type for durable queue operations.
pub type StoreResult<T> = Result<T, StoreError>;
