//! # Pending Sale Repository
//!
//! The offline sale queue: sales captured during network loss, waiting to
//! be replayed against the remote backend exactly once each.
//!
//! ## Queue Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Pending Sale Queue                                   │
//! │                                                                         │
//! │  OFFLINE CHECKOUT                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  put(sale)  ── INSERT, durable before return                            │
//! │       │        duplicate id → DuplicateKey, nothing overwritten         │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │  pending_sales                                                  │    │
//! │  │  id      | items (JSON) | total_cents | synced                  │    │
//! │  │  ────────┼──────────────┼─────────────┼────────                 │    │
//! │  │  tx-..01 │ [...]        │ 1100        │ 0                       │    │
//! │  │  tx-..02 │ [...]        │  450        │ 0                       │    │
//! │  │  tx-..03 │ [...]        │  300        │ 1  ← already committed  │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  list_unsynced() ── the drain loop's work set (synced = 0 only)         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  mark_synced(id) ── idempotent: unknown / already-synced ids are a      │
//! │                     no-op, so a crash between remote-commit-success     │
//! │                     and mark can be recovered by blind retry            │
//! │                                                                         │
//! │  Records are NEVER deleted here - synced rows stay as an audit trail.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use cloudpos_core::{PendingSale, PendingSaleItem};

use crate::error::{StoreError, StoreResult};

/// Repository for the pending-sale queue.
#[derive(Debug, Clone)]
pub struct PendingSaleRepository {
    pool: SqlitePool,
}

/// Raw row shape; domain conversion happens in [`PendingSaleRow::into_sale`].
#[derive(Debug, sqlx::FromRow)]
struct PendingSaleRow {
    id: String,
    store_id: String,
    cashier_id: String,
    items: String,
    subtotal_cents: i64,
    tax_cents: i64,
    total_cents: i64,
    payment_method: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    synced: bool,
}

impl PendingSaleRow {
    /// Decodes the JSON items payload and payment method into domain types.
    ///
    /// A record that no longer parses is surfaced as `CorruptRecord` rather
    /// than silently dropped - the queue must never lose a sale.
    fn into_sale(self) -> StoreResult<PendingSale> {
        let items: Vec<PendingSaleItem> =
            serde_json::from_str(&self.items).map_err(|e| StoreError::CorruptRecord {
                id: self.id.clone(),
                reason: format!("items payload: {e}"),
            })?;

        let payment_method = self
            .payment_method
            .parse()
            .map_err(|e| StoreError::CorruptRecord {
                id: self.id.clone(),
                reason: format!("payment method: {e}"),
            })?;

        Ok(PendingSale {
            id: self.id,
            store_id: self.store_id,
            cashier_id: self.cashier_id,
            items,
            subtotal: cloudpos_core::Money::from_cents(self.subtotal_cents),
            tax: cloudpos_core::Money::from_cents(self.tax_cents),
            total: cloudpos_core::Money::from_cents(self.total_cents),
            payment_method,
            notes: self.notes,
            created_at: self.created_at,
            synced: self.synced,
        })
    }
}

impl PendingSaleRepository {
    /// Creates a new PendingSaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PendingSaleRepository { pool }
    }

    /// Inserts a new pending sale and returns its id.
    ///
    /// The insert is a single transaction: once this returns `Ok`, the
    /// record is durable and visible to [`list_unsynced`](Self::list_unsynced).
    ///
    /// ## Errors
    /// [`StoreError::DuplicateKey`] if the id is already queued. Callers
    /// generate ids time-based with a random suffix, so this indicates the
    /// same checkout was submitted twice.
    pub async fn put(&self, sale: &PendingSale) -> StoreResult<String> {
        let items_json = serde_json::to_string(&sale.items).map_err(|e| {
            StoreError::Internal(format!("failed to encode items for '{}': {e}", sale.id))
        })?;

        debug!(id = %sale.id, total = %sale.total, "Queueing pending sale");

        sqlx::query(
            r#"
            INSERT INTO pending_sales (
                id, store_id, cashier_id, items,
                subtotal_cents, tax_cents, total_cents,
                payment_method, notes, created_at, synced
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.store_id)
        .bind(&sale.cashier_id)
        .bind(&items_json)
        .bind(sale.subtotal.cents())
        .bind(sale.tax.cents())
        .bind(sale.total.cents())
        .bind(sale.payment_method.as_str())
        .bind(&sale.notes)
        .bind(sale.created_at)
        .bind(sale.synced)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if StoreError::is_unique_violation(&e) {
                StoreError::DuplicateKey {
                    id: sale.id.clone(),
                }
            } else {
                e.into()
            }
        })?;

        Ok(sale.id.clone())
    }

    /// Returns all records with `synced == false`.
    ///
    /// Ordered by creation time for display purposes only - the drain loop
    /// makes no correctness promise about commit order across records.
    pub async fn list_unsynced(&self) -> StoreResult<Vec<PendingSale>> {
        let rows: Vec<PendingSaleRow> = sqlx::query_as(
            r#"
            SELECT id, store_id, cashier_id, items,
                   subtotal_cents, tax_cents, total_cents,
                   payment_method, notes, created_at, synced
            FROM pending_sales
            WHERE synced = 0
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PendingSaleRow::into_sale).collect()
    }

    /// Marks a record as successfully committed remotely.
    ///
    /// ## Idempotency
    /// Marking an already-synced or non-existent record succeeds as a
    /// no-op. A crash between remote-commit-success and this call is
    /// recovered by retrying the mark on the next drain, and that retry
    /// must not fail.
    pub async fn mark_synced(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("UPDATE pending_sales SET synced = 1 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            debug!(id = %id, "mark_synced: unknown or already-synced record, no-op");
        }

        Ok(())
    }

    /// Fetches a single record by id.
    pub async fn get(&self, id: &str) -> StoreResult<Option<PendingSale>> {
        let row: Option<PendingSaleRow> = sqlx::query_as(
            r#"
            SELECT id, store_id, cashier_id, items,
                   subtotal_cents, tax_cents, total_cents,
                   payment_method, notes, created_at, synced
            FROM pending_sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(PendingSaleRow::into_sale).transpose()
    }

    /// Counts records still waiting to be committed.
    pub async fn count_unsynced(&self) -> StoreResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM pending_sales WHERE synced = 0")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
