//! # Sync Error Types
//!
//! Error types for connectivity, drain, and checkout operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐  │
//! │  │     Remote      │  │     Local       │  │      Internal           │  │
//! │  │                 │  │                 │  │                         │  │
//! │  │  RemoteCommit   │  │  Store(..)      │  │  DrainInProgress        │  │
//! │  │  (rejected,     │  │  Storage-       │  │  (single-flight guard,  │  │
//! │  │   unreachable,  │  │  Unavailable    │  │   never user-visible)   │  │
//! │  │   timed out)    │  │  Core(..)       │  │                         │  │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘  │
//! │                                                                         │
//! │  RemoteCommit is always recoverable: the record stays queued and the    │
//! │  next drain retries it. DrainInProgress is swallowed by triggers.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use cloudpos_core::CoreError;
use cloudpos_store::StoreError;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering connectivity, drain, and checkout failures.
///
/// ## Design Principles
/// - Each variant includes enough context for debugging
/// - Errors are categorized for different handling strategies
/// - All errors are `Send + Sync` for async compatibility
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote commit endpoint rejected the sale or was unreachable.
    ///
    /// Recoverable: the pending record is kept and retried on the next
    /// drain. A client-side timeout lands here too - a commit that never
    /// answered is indistinguishable from one that was refused.
    #[error("Remote commit failed: {0}")]
    RemoteCommit(String),

    /// A drain was requested while one is already running.
    ///
    /// Internal to the single-flight guard; triggers swallow it silently
    /// rather than surfacing it to the user.
    #[error("A sync drain is already in progress")]
    DrainInProgress,

    /// Offline checkout attempted on a session without local storage.
    ///
    /// Happens when the local store failed to open at startup and the
    /// system degraded to online-only behavior.
    #[error("Offline storage unavailable; cannot queue sale while offline")]
    OfflineStorageUnavailable,

    /// Durable queue operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Business rule violation (empty cart, bad totals, ...).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Failed to load the sync configuration file.
    #[error("Failed to load sync config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save the sync configuration file.
    #[error("Failed to save sync config: {0}")]
    ConfigSaveFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<cloudpos_core::ValidationError> for SyncError {
    fn from(err: cloudpos_core::ValidationError) -> Self {
        SyncError::Core(err.into())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// True if the operation can simply be retried on the next drain.
    ///
    /// ## Retryable
    /// - Remote rejections, unreachable endpoint, timeouts
    ///
    /// ## Non-Retryable
    /// - Validation failures (the record would fail again identically)
    /// - Missing local storage
    /// - Configuration problems
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::RemoteCommit(_))
    }

    /// True if this is the internal single-flight refusal that triggers
    /// swallow rather than report.
    pub fn is_drain_in_progress(&self) -> bool {
        matches!(self, SyncError::DrainInProgress)
    }
}
