//! # cloudpos-sync: Offline Sale Synchronization for CloudPOS
//!
//! This crate reconciles the device-local durable queue with the remote
//! backend: it watches connectivity, replays queued sales exactly once
//! each, and routes checkout between the direct and offline paths.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Offline Sale Pipeline                              │
//! │                                                                         │
//! │  ┌────────────────────┐        platform connectivity events             │
//! │  │ CheckoutOrchestr.  │                     │                           │
//! │  │                    │                     ▼                           │
//! │  │ online → direct    │        ┌─────────────────────┐                  │
//! │  │ offline → queue    │        │ ConnectivityMonitor │                  │
//! │  └─────┬──────────┬───┘        │ current flag +      │                  │
//! │        │          │            │ change notification │                  │
//! │        │          │            └──────────┬──────────┘                  │
//! │        │          │                       │ offline→online              │
//! │        │          ▼                       ▼                             │
//! │        │   ┌─────────────┐       ┌────────────────┐                     │
//! │        │   │ LocalStore  │◄──────│   SyncEngine   │                     │
//! │        │   │ (queue)     │ list/ │                │                     │
//! │        │   └─────────────┘ mark  │ single-flight  │                     │
//! │        │                         │ drain loop     │                     │
//! │        ▼                         └───────┬────────┘                     │
//! │  ┌─────────────────────────────────────── ▼ ─────────────────────────┐  │
//! │  │              RemoteBackend (trait, implemented by shell)          │  │
//! │  │       commit_sale  •  fetch_products  •  delete_product           │  │
//! │  └───────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  OBSERVABLE STATE (offline banner):                                     │
//! │  • SyncStatus { is_online, is_syncing, last_error, last_sync_at }       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`connectivity`] - Online/offline flag with change notifications
//! - [`engine`] - Single-flight drain of the pending-sale queue
//! - [`checkout`] - Online-vs-offline commit path decision
//! - [`catalog`] - Product cache refresh and two-phase delete
//! - [`remote`] - The remote backend boundary trait and wire DTOs
//! - [`config`] - Drain policy and timeouts, TOML-backed
//! - [`error`] - Sync error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cloudpos_sync::{
//!     CheckoutContext, CheckoutOrchestrator, ConnectivityMonitor, SyncConfig, SyncEngine,
//! };
//! use cloudpos_store::{LocalStore, StoreConfig};
//! use std::sync::Arc;
//!
//! let store = Arc::new(LocalStore::open(StoreConfig::new("pos.db")).await?);
//! let monitor = Arc::new(ConnectivityMonitor::assume_online());
//! let config = SyncConfig::load_or_default(None);
//!
//! // remote: Arc<dyn RemoteBackend>, implemented by the shell
//! let engine = Arc::new(SyncEngine::new(
//!     store.clone(), remote.clone(), monitor.clone(), config,
//! ));
//! let _watcher = engine.clone().start(); // drains on every offline→online transition
//!
//! let checkout = CheckoutOrchestrator::new(remote, Some(store), monitor, context);
//! let outcome = checkout.checkout(&cart, payment_method, None).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod checkout;
pub mod config;
pub mod connectivity;
pub mod engine;
pub mod error;
pub mod remote;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::{Catalog, RemoveProductOutcome};
pub use checkout::{CheckoutContext, CheckoutOrchestrator, CheckoutOutcome};
pub use config::{DrainPolicy, SyncConfig, SyncSettings};
pub use connectivity::ConnectivityMonitor;
pub use engine::{DrainSummary, SyncEngine, SyncStatus};
pub use error::{SyncError, SyncResult};
pub use remote::{CommitItem, RemoteBackend, SaleCommitRequest};
