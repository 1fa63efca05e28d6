//! # Remote Backend Boundary
//!
//! The narrow interface this crate consumes from the hosted backend. The
//! real implementation (HTTP client, auth, row-level security) lives in the
//! embedding shell and is out of scope here; the sync engine and checkout
//! orchestrator only ever see this trait.
//!
//! ## Commit Request Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     SaleCommitRequest                                   │
//! │                                                                         │
//! │  {                                                                      │
//! │    "storeId": "store-1",                                                │
//! │    "cashierId": "cashier-7",                                            │
//! │    "clientReference": "OFFLINE-tx-1700000000000-0042",                  │
//! │    "items": [                                                           │
//! │      { "productId": "...", "quantity": 2, "unitPriceMinorUnits": 300 }  │
//! │    ],                                                                   │
//! │    "paymentMethod": "CASH",          ← endpoint enum casing             │
//! │    "discountMinorUnits": 0,          ← never non-zero from offline path │
//! │    "notes": null                                                        │
//! │  }                                                                      │
//! │                                                                         │
//! │  clientReference prefixes: "OFFLINE-" for replayed queue records,       │
//! │  "TXN-" for direct online commits. The endpoint does NOT deduplicate    │
//! │  on it - replaying the same record from two restored devices would      │
//! │  double-commit. Known gap, documented rather than papered over.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use cloudpos_core::{CachedProduct, PaymentMethod, PendingSale, PendingSaleItem};

use crate::error::SyncResult;

// =============================================================================
// Wire Types
// =============================================================================

/// One line of a commit request, in the endpoint's representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitItem {
    pub product_id: String,
    pub quantity: i64,
    /// Unit price in integral minor currency units (cents).
    pub unit_price_minor_units: i64,
}

/// A sale submission to the remote commit endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleCommitRequest {
    pub store_id: String,
    pub cashier_id: String,

    /// Client-side reference recorded in the remote transaction number.
    /// `OFFLINE-{id}` for replayed records, `TXN-{id}` for direct commits.
    pub client_reference: String,

    pub items: Vec<CommitItem>,

    /// Endpoint enum casing: CASH | CARD | CHECK | OTHER.
    pub payment_method: String,

    /// Always 0: discount is not representable in the offline path.
    pub discount_minor_units: i64,

    pub notes: Option<String>,
}

impl SaleCommitRequest {
    /// Builds a request from raw parts (the direct online checkout path).
    pub fn direct(
        store_id: &str,
        cashier_id: &str,
        sale_id: &str,
        items: &[PendingSaleItem],
        payment_method: PaymentMethod,
        notes: Option<String>,
    ) -> Self {
        Self::build(
            store_id,
            cashier_id,
            format!("TXN-{sale_id}"),
            items,
            payment_method,
            notes,
        )
    }

    /// Builds a replay request from a queued record.
    ///
    /// This is the translation step of the drain loop: monetary fields
    /// become integral minor units and the payment method is normalized to
    /// the endpoint's casing. The record itself is not modified.
    pub fn replay(sale: &PendingSale) -> Self {
        Self::build(
            &sale.store_id,
            &sale.cashier_id,
            format!("OFFLINE-{}", sale.id),
            &sale.items,
            sale.payment_method,
            sale.notes.clone(),
        )
    }

    fn build(
        store_id: &str,
        cashier_id: &str,
        client_reference: String,
        items: &[PendingSaleItem],
        payment_method: PaymentMethod,
        notes: Option<String>,
    ) -> Self {
        SaleCommitRequest {
            store_id: store_id.to_string(),
            cashier_id: cashier_id.to_string(),
            client_reference,
            items: items
                .iter()
                .map(|item| CommitItem {
                    product_id: item.product_id.clone(),
                    quantity: item.quantity,
                    unit_price_minor_units: item.unit_price.cents(),
                })
                .collect(),
            payment_method: payment_method.wire_code().to_string(),
            discount_minor_units: 0,
            notes,
        }
    }
}

// =============================================================================
// Remote Backend Trait
// =============================================================================

/// The remote operations this crate consumes.
///
/// ## Contract
/// - `commit_sale` must be safely retriable by the caller: the drain loop
///   retries failed records on later drains. There is no server-side
///   deduplication on `client_reference` (see module docs).
/// - Implementations report failure through [`SyncError::RemoteCommit`]
///   (or any error) rather than panicking; the engine treats every error
///   as "keep the record, try again later".
///
/// [`SyncError::RemoteCommit`]: crate::error::SyncError::RemoteCommit
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// Commits a sale and returns the newly created remote sale id.
    async fn commit_sale(&self, request: &SaleCommitRequest) -> SyncResult<String>;

    /// Fetches the current product rows for a store (cache refresh source).
    async fn fetch_products(&self, store_id: &str) -> SyncResult<Vec<CachedProduct>>;

    /// Deletes a product remotely (first phase of the two-phase delete).
    async fn delete_product(&self, product_id: &str) -> SyncResult<()>;
}

// =============================================================================
// Test Support
// =============================================================================

/// Scripted in-process backend used by engine, catalog, and checkout tests.
#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::error::SyncError;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Records every call; failures are scripted per client reference.
    #[derive(Default)]
    pub struct RecordingRemote {
        /// Every commit request received, in order.
        pub commits: Mutex<Vec<SaleCommitRequest>>,
        /// Client references that should be rejected.
        pub fail_refs: Mutex<HashSet<String>>,
        /// Reject every commit regardless of reference.
        pub fail_all_commits: AtomicBool,
        /// Products returned by fetch_products.
        pub products: Mutex<Vec<CachedProduct>>,
        /// Make delete_product fail.
        pub fail_deletes: AtomicBool,
    }

    impl RecordingRemote {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fail_ref(&self, client_reference: &str) {
            self.fail_refs
                .lock()
                .unwrap()
                .insert(client_reference.to_string());
        }

        pub fn clear_failures(&self) {
            self.fail_refs.lock().unwrap().clear();
            self.fail_all_commits.store(false, Ordering::SeqCst);
        }

        pub fn commit_count(&self) -> usize {
            self.commits.lock().unwrap().len()
        }

        pub fn committed_refs(&self) -> Vec<String> {
            self.commits
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.client_reference.clone())
                .collect()
        }
    }

    #[async_trait]
    impl RemoteBackend for RecordingRemote {
        async fn commit_sale(&self, request: &SaleCommitRequest) -> SyncResult<String> {
            self.commits.lock().unwrap().push(request.clone());

            let scripted_failure = self.fail_all_commits.load(Ordering::SeqCst)
                || self
                    .fail_refs
                    .lock()
                    .unwrap()
                    .contains(&request.client_reference);

            if scripted_failure {
                Err(SyncError::RemoteCommit(format!(
                    "scripted rejection of {}",
                    request.client_reference
                )))
            } else {
                Ok(uuid::Uuid::new_v4().to_string())
            }
        }

        async fn fetch_products(&self, store_id: &str) -> SyncResult<Vec<CachedProduct>> {
            Ok(self
                .products
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.store_id == store_id)
                .cloned()
                .collect())
        }

        async fn delete_product(&self, product_id: &str) -> SyncResult<()> {
            if self.fail_deletes.load(Ordering::SeqCst) {
                Err(SyncError::RemoteCommit(format!(
                    "scripted delete failure for {product_id}"
                )))
            } else {
                Ok(())
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cloudpos_core::Money;

    fn pending_sale() -> PendingSale {
        PendingSale {
            id: "tx-1700000000000-0042".to_string(),
            store_id: "store-1".to_string(),
            cashier_id: "cashier-7".to_string(),
            items: vec![
                PendingSaleItem {
                    product_id: "prod-a".to_string(),
                    product_name: "Item A".to_string(),
                    unit_price: Money::from_cents(300),
                    quantity: 2,
                },
                PendingSaleItem {
                    product_id: "prod-b".to_string(),
                    product_name: "Item B".to_string(),
                    unit_price: Money::from_cents(500),
                    quantity: 1,
                },
            ],
            subtotal: Money::from_cents(1100),
            tax: Money::zero(),
            total: Money::from_cents(1100),
            payment_method: PaymentMethod::Cash,
            notes: None,
            created_at: Utc::now(),
            synced: false,
        }
    }

    #[test]
    fn test_replay_translates_to_minor_units_and_wire_casing() {
        let request = SaleCommitRequest::replay(&pending_sale());

        assert_eq!(request.client_reference, "OFFLINE-tx-1700000000000-0042");
        assert_eq!(request.payment_method, "CASH");
        assert_eq!(request.discount_minor_units, 0);
        assert_eq!(request.items.len(), 2);
        assert_eq!(request.items[0].unit_price_minor_units, 300);
        assert_eq!(request.items[0].quantity, 2);
        assert_eq!(request.items[1].unit_price_minor_units, 500);
    }

    #[test]
    fn test_direct_reference_prefix() {
        let sale = pending_sale();
        let request = SaleCommitRequest::direct(
            "store-1",
            "cashier-7",
            "tx-99",
            &sale.items,
            PaymentMethod::Card,
            Some("gift wrap".to_string()),
        );

        assert_eq!(request.client_reference, "TXN-tx-99");
        assert_eq!(request.payment_method, "CARD");
        assert_eq!(request.notes.as_deref(), Some("gift wrap"));
    }

    #[test]
    fn test_request_wire_shape() {
        let request = SaleCommitRequest::replay(&pending_sale());
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["storeId"], "store-1");
        assert_eq!(json["paymentMethod"], "CASH");
        assert_eq!(json["discountMinorUnits"], 0);
        assert_eq!(json["items"][0]["unitPriceMinorUnits"], 300);
    }
}
