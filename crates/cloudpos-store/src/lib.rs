//! # cloudpos-store: Durable Local Queue for CloudPOS
//!
//! This crate persists point-of-sale state that must survive network loss,
//! page reloads, and process crashes: the queue of pending (unsynced) sales
//! and the offline product cache. SQLite via sqlx, local to the device.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CloudPOS Data Flow                               │
//! │                                                                         │
//! │  Checkout (offline) ──► put()                 Sync drain ──► list /     │
//! │                           │                       │          mark       │
//! │  ┌────────────────────────▼───────────────────────▼─────────────────┐   │
//! │  │                  cloudpos-store (THIS CRATE)                     │   │
//! │  │                                                                  │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐   ┌────────────┐   │   │
//! │  │   │  LocalStore   │    │   Repositories     │   │ Migrations │   │   │
//! │  │   │  (pool.rs)    │    │ pending_sale.rs    │   │ (embedded) │   │   │
//! │  │   │               │◄───│ product.rs         │   │ 001_init   │   │   │
//! │  │   └───────────────┘    └────────────────────┘   └────────────┘   │   │
//! │  └──────────────────────────────┬───────────────────────────────────┘   │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐   │
//! │  │                SQLite database (one file per device)             │   │
//! │  └──────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Store handle, pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Store error types
//! - [`repository`] - Repository implementations (pending sales, products)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cloudpos_store::{LocalStore, StoreConfig};
//!
//! let store = LocalStore::open(StoreConfig::new("pos.db")).await?;
//!
//! store.pending_sales().put(&sale).await?;
//! let pending = store.pending_sales().list_unsynced().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use pool::{LocalStore, StoreConfig};

// Repository re-exports for convenience
pub use repository::pending_sale::PendingSaleRepository;
pub use repository::product::ProductCacheRepository;
