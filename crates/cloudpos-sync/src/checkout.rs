//! # Checkout Orchestrator
//!
//! Decides, at the moment of sale, whether a completed cart commits
//! directly to the remote backend or lands in the durable local queue.
//!
//! ## Decision Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      checkout(cart, payment)                            │
//! │                                                                         │
//! │                    ConnectivityMonitor.current_status()                 │
//! │                          │                    │                         │
//! │                       online               offline                      │
//! │                          │                    │                         │
//! │                          ▼                    ▼                         │
//! │              remote.commit_sale()      PendingSale { synced: false }    │
//! │                    │        │                 │                         │
//! │                 success   failure          put() into queue             │
//! │                    │        │                 │                         │
//! │                    ▼        ▼                 ▼                         │
//! │              Committed    Err surfaced,    Queued - sale provisionally  │
//! │                           cart intact,     accepted, replayed later     │
//! │                           NOTHING queued   by the sync engine           │
//! │                                                                         │
//! │  A failed online commit is never silently queued: connectivity          │
//! │  flapping must not masquerade as an offline sale.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info};

use cloudpos_core::validation::validate_pending_sale;
use cloudpos_core::{Cart, CartTotals, CoreError, PaymentMethod, PendingSale, TaxRate};
use cloudpos_store::LocalStore;

use crate::connectivity::ConnectivityMonitor;
use crate::error::{SyncError, SyncResult};
use crate::remote::{RemoteBackend, SaleCommitRequest};

// =============================================================================
// Checkout Context
// =============================================================================

/// Session-level identity and settings for checkout.
#[derive(Debug, Clone)]
pub struct CheckoutContext {
    /// Store this terminal sells for. Opaque remote reference.
    pub store_id: String,

    /// Cashier logged into this session. Opaque remote reference.
    pub cashier_id: String,

    /// Store-level tax rate applied to the cart subtotal.
    pub tax_rate: TaxRate,
}

/// How a checkout completed.
#[derive(Debug, Clone)]
pub enum CheckoutOutcome {
    /// Online path: the remote backend accepted the sale immediately.
    Committed {
        remote_sale_id: String,
        totals: CartTotals,
    },

    /// Offline path: the sale is durably queued, provisionally accepted
    /// from the cashier's perspective, and will be replayed by the sync
    /// engine once connectivity returns.
    Queued {
        pending_sale_id: String,
        totals: CartTotals,
    },
}

// =============================================================================
// Checkout Orchestrator
// =============================================================================

/// Routes completed carts to the right commit path.
///
/// The queue handle is optional: when the local store failed to open at
/// startup, the orchestrator runs online-only and an offline checkout
/// reports [`SyncError::OfflineStorageUnavailable`] instead of crashing.
pub struct CheckoutOrchestrator {
    remote: Arc<dyn RemoteBackend>,
    queue: Option<Arc<LocalStore>>,
    monitor: Arc<ConnectivityMonitor>,
    context: CheckoutContext,
    commit_timeout: Duration,
}

impl CheckoutOrchestrator {
    /// Creates a new orchestrator.
    pub fn new(
        remote: Arc<dyn RemoteBackend>,
        queue: Option<Arc<LocalStore>>,
        monitor: Arc<ConnectivityMonitor>,
        context: CheckoutContext,
    ) -> Self {
        if queue.is_none() {
            tracing::warn!(
                "Local store unavailable: running online-only, offline sales will be refused"
            );
        }

        CheckoutOrchestrator {
            remote,
            queue,
            monitor,
            context,
            commit_timeout: Duration::from_secs(30),
        }
    }

    /// Overrides the online-commit timeout.
    pub fn with_commit_timeout(mut self, timeout: Duration) -> Self {
        self.commit_timeout = timeout;
        self
    }

    /// Whether this session can queue sales while offline.
    pub fn offline_capable(&self) -> bool {
        self.queue.is_some()
    }

    /// Completes a sale for the given cart.
    ///
    /// The cart is read, never mutated - on success the caller clears it,
    /// on failure it stays intact for a retry.
    pub async fn checkout(
        &self,
        cart: &Cart,
        payment_method: PaymentMethod,
        notes: Option<String>,
    ) -> SyncResult<CheckoutOutcome> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let totals = cart.totals(self.context.tax_rate);
        let sale_id = generate_sale_id();

        if self.monitor.current_status() {
            self.commit_direct(cart, payment_method, notes, &sale_id, totals)
                .await
        } else {
            self.queue_offline(cart, payment_method, notes, sale_id, totals)
                .await
        }
    }

    /// Online path: straight to the remote endpoint, nothing queued.
    async fn commit_direct(
        &self,
        cart: &Cart,
        payment_method: PaymentMethod,
        notes: Option<String>,
        sale_id: &str,
        totals: CartTotals,
    ) -> SyncResult<CheckoutOutcome> {
        let items = cart.to_sale_items();
        let request = SaleCommitRequest::direct(
            &self.context.store_id,
            &self.context.cashier_id,
            sale_id,
            &items,
            payment_method,
            notes,
        );

        debug!(reference = %request.client_reference, total = %totals.total, "Committing sale online");

        let remote_sale_id =
            match tokio::time::timeout(self.commit_timeout, self.remote.commit_sale(&request))
                .await
            {
                Ok(result) => result?,
                Err(_) => {
                    return Err(SyncError::RemoteCommit(format!(
                        "commit timed out after {}s",
                        self.commit_timeout.as_secs()
                    )))
                }
            };

        info!(remote_sale_id = %remote_sale_id, total = %totals.total, "Sale committed online");

        Ok(CheckoutOutcome::Committed {
            remote_sale_id,
            totals,
        })
    }

    /// Offline path: validate, then durably queue with `synced = false`.
    async fn queue_offline(
        &self,
        cart: &Cart,
        payment_method: PaymentMethod,
        notes: Option<String>,
        sale_id: String,
        totals: CartTotals,
    ) -> SyncResult<CheckoutOutcome> {
        let Some(queue) = &self.queue else {
            return Err(SyncError::OfflineStorageUnavailable);
        };

        let sale = PendingSale {
            id: sale_id,
            store_id: self.context.store_id.clone(),
            cashier_id: self.context.cashier_id.clone(),
            items: cart.to_sale_items(),
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            payment_method,
            notes,
            created_at: Utc::now(),
            synced: false,
        };

        validate_pending_sale(&sale).map_err(CoreError::from)?;

        let pending_sale_id = queue.pending_sales().put(&sale).await?;

        info!(id = %pending_sale_id, total = %totals.total, "Sale queued offline");

        Ok(CheckoutOutcome::Queued {
            pending_sale_id,
            totals,
        })
    }
}

/// Generates a pending-sale id: millisecond timestamp plus a random
/// 4-digit suffix, unique enough for a single device's queue.
fn generate_sale_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    format!("tx-{}-{:04}", millis, nanos % 10000)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::engine::SyncEngine;
    use crate::remote::test_support::RecordingRemote;
    use cloudpos_core::{CachedProduct, Money};
    use cloudpos_store::StoreConfig;
    use std::sync::atomic::Ordering;

    fn context() -> CheckoutContext {
        CheckoutContext {
            store_id: "store-1".to_string(),
            cashier_id: "cashier-7".to_string(),
            tax_rate: TaxRate::zero(),
        }
    }

    fn product(id: &str, name: &str, price_cents: i64) -> CachedProduct {
        CachedProduct {
            id: id.to_string(),
            store_id: "store-1".to_string(),
            name: name.to_string(),
            price: Money::from_cents(price_cents),
            stock_quantity: 10,
            category: "general".to_string(),
        }
    }

    async fn orchestrator_with(
        remote: Arc<RecordingRemote>,
        monitor: Arc<ConnectivityMonitor>,
    ) -> (CheckoutOrchestrator, Arc<LocalStore>) {
        let store = Arc::new(LocalStore::open(StoreConfig::in_memory()).await.unwrap());
        let orchestrator =
            CheckoutOrchestrator::new(remote, Some(store.clone()), monitor, context());
        (orchestrator, store)
    }

    #[tokio::test]
    async fn test_online_checkout_commits_and_never_queues() {
        let remote = Arc::new(RecordingRemote::new());
        let monitor = Arc::new(ConnectivityMonitor::assume_online());
        let (orchestrator, store) = orchestrator_with(remote.clone(), monitor).await;

        let mut cart = Cart::new();
        cart.add_item(&product("prod-a", "Item A", 300), 1).unwrap();

        let outcome = orchestrator
            .checkout(&cart, PaymentMethod::Cash, None)
            .await
            .unwrap();

        assert!(matches!(outcome, CheckoutOutcome::Committed { .. }));
        assert_eq!(remote.commit_count(), 1);
        assert!(remote.committed_refs()[0].starts_with("TXN-tx-"));

        // Online success leaves the local queue untouched
        assert_eq!(store.pending_sales().count_unsynced().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_online_commit_is_not_queued() {
        let remote = Arc::new(RecordingRemote::new());
        remote.fail_all_commits.store(true, Ordering::SeqCst);
        let monitor = Arc::new(ConnectivityMonitor::assume_online());
        let (orchestrator, store) = orchestrator_with(remote.clone(), monitor).await;

        let mut cart = Cart::new();
        cart.add_item(&product("prod-a", "Item A", 300), 1).unwrap();

        let err = orchestrator
            .checkout(&cart, PaymentMethod::Cash, None)
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::RemoteCommit(_)));
        // The failure surfaces; nothing was silently queued, and the cart
        // (untouched by the orchestrator) is still intact for a retry
        assert_eq!(store.pending_sales().count_unsynced().await.unwrap(), 0);
        assert_eq!(cart.item_count(), 1);
    }

    #[tokio::test]
    async fn test_offline_checkout_queues_unsynced_record() {
        let remote = Arc::new(RecordingRemote::new());
        let monitor = Arc::new(ConnectivityMonitor::new(false));
        let (orchestrator, store) = orchestrator_with(remote.clone(), monitor).await;

        let mut cart = Cart::new();
        cart.add_item(&product("prod-a", "Item A", 300), 2).unwrap();

        let outcome = orchestrator
            .checkout(&cart, PaymentMethod::Card, Some("pickup".to_string()))
            .await
            .unwrap();

        let CheckoutOutcome::Queued { pending_sale_id, totals } = outcome else {
            panic!("expected Queued outcome");
        };
        assert_eq!(totals.total.cents(), 600);

        // Queued, not committed
        assert_eq!(remote.commit_count(), 0);
        let queued = store
            .pending_sales()
            .get(&pending_sale_id)
            .await
            .unwrap()
            .unwrap();
        assert!(!queued.synced);
        assert_eq!(queued.payment_method, PaymentMethod::Card);
        assert_eq!(queued.notes.as_deref(), Some("pickup"));
        assert_eq!(queued.total, queued.subtotal + queued.tax);
    }

    #[tokio::test]
    async fn test_offline_checkout_without_store_is_refused() {
        let remote = Arc::new(RecordingRemote::new());
        let monitor = Arc::new(ConnectivityMonitor::new(false));
        let orchestrator =
            CheckoutOrchestrator::new(remote, None, monitor, context());

        assert!(!orchestrator.offline_capable());

        let mut cart = Cart::new();
        cart.add_item(&product("prod-a", "Item A", 300), 1).unwrap();

        let err = orchestrator
            .checkout(&cart, PaymentMethod::Cash, None)
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::OfflineStorageUnavailable));
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let remote = Arc::new(RecordingRemote::new());
        let monitor = Arc::new(ConnectivityMonitor::assume_online());
        let (orchestrator, _store) = orchestrator_with(remote, monitor).await;

        let err = orchestrator
            .checkout(&Cart::new(), PaymentMethod::Cash, None)
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Core(CoreError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_offline_sale_replays_once_connectivity_returns() {
        // End to end: offline checkout of 2 × $3.00 + 1 × $5.00 at zero tax,
        // then the queue drains after the device comes back online.
        let remote = Arc::new(RecordingRemote::new());
        let monitor = Arc::new(ConnectivityMonitor::new(false));
        let (orchestrator, store) = orchestrator_with(remote.clone(), monitor.clone()).await;

        let mut cart = Cart::new();
        cart.add_item(&product("prod-a", "Item A", 300), 2).unwrap();
        cart.add_item(&product("prod-b", "Item B", 500), 1).unwrap();

        let outcome = orchestrator
            .checkout(&cart, PaymentMethod::Cash, None)
            .await
            .unwrap();
        cart.clear(); // the shell clears the cart on success

        let CheckoutOutcome::Queued { pending_sale_id, totals } = outcome else {
            panic!("expected Queued outcome");
        };
        assert_eq!(totals.subtotal.cents(), 1100);
        assert_eq!(totals.total.cents(), 1100);

        let queued = store
            .pending_sales()
            .get(&pending_sale_id)
            .await
            .unwrap()
            .unwrap();
        assert!(!queued.synced);
        assert_eq!(queued.subtotal, Money::from_cents(1100));

        // Connectivity returns; the engine drains the queue
        let engine = Arc::new(SyncEngine::new(
            store.clone(),
            remote.clone(),
            monitor.clone(),
            SyncConfig::default(),
        ));
        monitor.set_online(true);
        let summary = engine.drain().await.unwrap();
        assert_eq!(summary.committed, 1);

        // Exactly one remote commit, translated to the wire representation
        let commits = remote.commits.lock().unwrap();
        assert_eq!(commits.len(), 1);
        let request = &commits[0];
        assert_eq!(request.client_reference, format!("OFFLINE-{pending_sale_id}"));
        assert_eq!(request.payment_method, "CASH");
        let unit_prices: Vec<i64> =
            request.items.iter().map(|i| i.unit_price_minor_units).collect();
        assert_eq!(unit_prices, vec![300, 500]);
        drop(commits);

        // Synced and excluded from every later list_unsynced
        let replayed = store
            .pending_sales()
            .get(&pending_sale_id)
            .await
            .unwrap()
            .unwrap();
        assert!(replayed.synced);
        assert!(store.pending_sales().list_unsynced().await.unwrap().is_empty());

        // A second drain resubmits nothing
        engine.drain().await.unwrap();
        assert_eq!(remote.commit_count(), 1);
    }

    #[test]
    fn test_generated_ids_have_expected_shape() {
        let id = generate_sale_id();
        assert!(id.starts_with("tx-"));
        // tx-<millis>-<4 digit suffix>
        let parts: Vec<&str> = id.splitn(3, '-').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 4);
    }
}
