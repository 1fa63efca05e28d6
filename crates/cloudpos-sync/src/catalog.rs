//! # Catalog Maintenance
//!
//! Keeps the offline product cache usable: periodic wholesale refresh from
//! the remote product table, and the two-phase remote-then-local delete.
//!
//! ## Two-Phase Delete
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   remove_product(product_id)                            │
//! │                                                                         │
//! │  Phase 1: remote.delete_product()  ──┐                                  │
//! │                                      │  each phase runs regardless      │
//! │  Phase 2: cache.delete()  ───────────┤  of the other's outcome          │
//! │                                      │                                  │
//! │                                      ▼                                  │
//! │            RemoveProductOutcome { remote, local }                       │
//! │                                                                         │
//! │  A remote failure must not leave a ghost row in the local cache (the    │
//! │  cashier would keep selling a delisted product offline), and a local    │
//! │  failure must not block the remote delete. Both outcomes are reported   │
//! │  to the caller instead of one being swallowed.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::{info, warn};

use cloudpos_store::LocalStore;

use crate::error::{SyncError, SyncResult};
use crate::remote::RemoteBackend;

/// Result of the two-phase product delete; each phase reported separately.
#[derive(Debug)]
pub struct RemoveProductOutcome {
    /// Outcome of the remote delete.
    pub remote: SyncResult<()>,

    /// Outcome of the local cache delete.
    pub local: SyncResult<()>,
}

impl RemoveProductOutcome {
    /// True when both phases succeeded.
    pub fn fully_removed(&self) -> bool {
        self.remote.is_ok() && self.local.is_ok()
    }
}

/// Product cache maintenance over the remote backend and local store.
pub struct Catalog {
    store: Arc<LocalStore>,
    remote: Arc<dyn RemoteBackend>,
}

impl Catalog {
    /// Creates a new catalog service.
    pub fn new(store: Arc<LocalStore>, remote: Arc<dyn RemoteBackend>) -> Self {
        Catalog { store, remote }
    }

    /// Refreshes the offline cache from the remote product table.
    ///
    /// Wholesale replacement in one transaction: a failed fetch or a failed
    /// write leaves the previous snapshot intact. Returns the number of
    /// cached products.
    pub async fn refresh(&self, store_id: &str) -> SyncResult<usize> {
        let products = self.remote.fetch_products(store_id).await?;
        self.store.products().replace_all(&products).await?;

        info!(store_id = %store_id, count = products.len(), "Product cache refreshed");
        Ok(products.len())
    }

    /// Deletes a product remotely and from the local cache.
    ///
    /// Neither phase blocks the other; both outcomes are returned. Failures
    /// are logged here so callers that only check `fully_removed()` don't
    /// lose the details.
    pub async fn remove_product(&self, product_id: &str) -> RemoveProductOutcome {
        let remote = self.remote.delete_product(product_id).await;
        if let Err(e) = &remote {
            warn!(product_id = %product_id, error = %e, "Remote product delete failed");
        }

        let local = self
            .store
            .products()
            .delete(product_id)
            .await
            .map(|_removed| ())
            .map_err(SyncError::from);
        if let Err(e) = &local {
            warn!(product_id = %product_id, error = %e, "Local cache delete failed");
        }

        RemoveProductOutcome { remote, local }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
