//! # Sync Engine
//!
//! Drains the pending-sale queue against the remote commit endpoint
//! whenever the device is online, one record at a time, at most one drain
//! in flight.
//!
//! ## Drain State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Engine Drain                                 │
//! │                                                                         │
//! │            trigger (online transition / manual "sync now")              │
//! │                              │                                          │
//! │                              ▼                                          │
//! │     ┌─────────┐  acquire   ┌──────────┐   guard drops   ┌─────────┐     │
//! │     │  Idle   │──────────► │ Draining │───────────────► │  Idle   │     │
//! │     └─────────┘            └──────────┘                 └─────────┘     │
//! │          ▲                       │                                      │
//! │          │     second trigger    │  1. list_unsynced()                  │
//! │          └───── refused with ◄───┤  2. per record:                      │
//! │                DrainInProgress   │     commit_sale → mark_synced        │
//! │                (not queued)      │  3. on failure: keep record,         │
//! │                                  │     halt batch (default policy)      │
//! │                                  │  4. surface last error, clear on     │
//! │                                  │     next fully successful drain      │
//! │                                                                         │
//! │  AT-MOST-ONCE: a record is submitted at most once per drain attempt,    │
//! │  and never again once synced. The only double-submit window is a        │
//! │  crash between commit-success and mark_synced, which the idempotent     │
//! │  mark makes safely retriable.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use cloudpos_core::PendingSale;
use cloudpos_store::{LocalStore, StoreResult};

use crate::config::{DrainPolicy, SyncConfig};
use crate::connectivity::ConnectivityMonitor;
use crate::error::{SyncError, SyncResult};
use crate::remote::{RemoteBackend, SaleCommitRequest};

// =============================================================================
// Sync Status
// =============================================================================

/// Observable engine state for the shell (offline banner, sync spinner).
#[derive(Debug, Clone)]
pub struct SyncStatus {
    /// Current connectivity, straight from the monitor.
    pub is_online: bool,

    /// Whether a drain is in flight right now.
    pub is_syncing: bool,

    /// Last drain failure, as a user-visible string. Cleared by the next
    /// fully successful drain; never blocks new offline checkouts.
    pub last_error: Option<String>,

    /// When the last fully successful drain finished.
    pub last_sync_at: Option<DateTime<Utc>>,
}

impl SyncStatus {
    /// Whether the shell should show its offline/sync indicator: offline,
    /// actively syncing, or carrying a sync error. Otherwise no indicator.
    pub fn show_offline_indicator(&self) -> bool {
        !self.is_online || self.is_syncing || self.last_error.is_some()
    }
}

/// Outcome of one drain pass.
#[derive(Debug, Clone, Default)]
pub struct DrainSummary {
    /// Records committed remotely and marked synced during this pass.
    pub committed: usize,

    /// Records whose remote commit failed (kept queued).
    pub failed: usize,

    /// Unsynced records left in the queue after this pass.
    pub remaining: i64,

    /// Message from the first failing record, if any.
    pub first_error: Option<String>,
}

impl DrainSummary {
    /// True when every attempted record committed.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Debug, Default)]
struct EngineState {
    last_error: Option<String>,
    last_sync_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Drain Guard
// =============================================================================

/// RAII single-flight guard: acquired at drain start, releases the flag on
/// drop so the engine re-enters Idle on every exit path, including errors.
struct DrainGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> DrainGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| DrainGuard { flag })
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

// =============================================================================
// Sync Engine
// =============================================================================

/// Long-lived engine replaying queued sales against the remote backend.
///
/// Dependencies are injected at construction (no ambient globals); the
/// engine is shared as `Arc<SyncEngine>` between the connectivity watcher
/// task and any manual "sync now" surface.
pub struct SyncEngine {
    store: Arc<LocalStore>,
    remote: Arc<dyn RemoteBackend>,
    monitor: Arc<ConnectivityMonitor>,
    config: SyncConfig,

    /// Single-flight flag: true while a drain pass is running.
    draining: AtomicBool,

    /// Error/sync-time state surfaced through [`SyncEngine::status`].
    state: RwLock<EngineState>,
}

impl SyncEngine {
    /// Creates a new sync engine.
    pub fn new(
        store: Arc<LocalStore>,
        remote: Arc<dyn RemoteBackend>,
        monitor: Arc<ConnectivityMonitor>,
        config: SyncConfig,
    ) -> Self {
        SyncEngine {
            store,
            remote,
            monitor,
            config,
            draining: AtomicBool::new(false),
            state: RwLock::new(EngineState::default()),
        }
    }

    /// Whether a drain pass is in flight right now.
    pub fn is_syncing(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    /// Current observable status for the shell.
    pub fn status(&self) -> SyncStatus {
        let (last_error, last_sync_at) = self
            .state
            .read()
            .map(|s| (s.last_error.clone(), s.last_sync_at))
            .unwrap_or((None, None));

        SyncStatus {
            is_online: self.monitor.current_status(),
            is_syncing: self.is_syncing(),
            last_error,
            last_sync_at,
        }
    }

    /// Number of records still waiting to be committed.
    pub async fn pending_count(&self) -> StoreResult<i64> {
        self.store.pending_sales().count_unsynced().await
    }

    /// Spawns the connectivity watcher task.
    ///
    /// The task performs one initial drain attempt if the device is online
    /// at startup (there may be records left over from a previous session),
    /// then triggers one drain per offline→online transition. It runs for
    /// the engine's lifetime; dropping the returned handle detaches it.
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let engine = self;
        let mut rx = engine.monitor.subscribe();

        tokio::spawn(async move {
            if engine.monitor.current_status() {
                engine.trigger_drain().await;
            }

            let mut was_online = *rx.borrow_and_update();
            while rx.changed().await.is_ok() {
                let online = *rx.borrow_and_update();
                if online && !was_online {
                    info!("Connectivity restored, draining pending sales");
                    engine.trigger_drain().await;
                }
                was_online = online;
            }

            debug!("Connectivity watcher stopped");
        })
    }

    /// Runs one drain pass; the entry point for both automatic triggers
    /// and a manual "sync now".
    ///
    /// ## Errors
    /// - [`SyncError::DrainInProgress`] if a pass is already running
    ///   (single-flight; automatic triggers swallow this)
    /// - [`SyncError::Store`] if the queue itself fails
    ///
    /// Remote commit failures are NOT errors at this level: the pass ends
    /// early (under the halt policy), the failure lands in the returned
    /// [`DrainSummary`] and in [`SyncStatus::last_error`], and the records
    /// stay queued for the next drain.
    pub async fn drain(&self) -> SyncResult<DrainSummary> {
        let _guard = match DrainGuard::try_acquire(&self.draining) {
            Some(guard) => guard,
            None => return Err(SyncError::DrainInProgress),
        };

        if !self.monitor.current_status() {
            debug!("Offline, skipping drain");
            let remaining = match self.store.pending_sales().count_unsynced().await {
                Ok(count) => count,
                Err(e) => {
                    self.record_error(&e.to_string());
                    return Err(e.into());
                }
            };
            return Ok(DrainSummary {
                remaining,
                ..Default::default()
            });
        }

        let result = self.drain_queue().await;

        match &result {
            Ok(summary) if summary.is_clean() => {
                self.record_success();
            }
            Ok(summary) => {
                self.record_error(summary.first_error.as_deref().unwrap_or("sync failed"));
            }
            Err(e) => {
                self.record_error(&e.to_string());
            }
        }

        result
        // _guard drops here: back to Idle whatever happened above
    }

    /// The drain pass proper, run under the single-flight guard.
    async fn drain_queue(&self) -> SyncResult<DrainSummary> {
        let repo = self.store.pending_sales();
        let pending = repo.list_unsynced().await?;

        if pending.is_empty() {
            debug!("No pending sales to drain");
            return Ok(DrainSummary::default());
        }

        info!(count = pending.len(), "Draining pending sales");

        let mut summary = DrainSummary::default();

        for sale in &pending {
            match self.commit_one(sale).await {
                Ok(remote_sale_id) => {
                    repo.mark_synced(&sale.id).await?;
                    debug!(id = %sale.id, remote_sale_id = %remote_sale_id, "Pending sale committed");
                    summary.committed += 1;
                }
                Err(e) => {
                    warn!(id = %sale.id, error = %e, "Remote commit failed, record kept in queue");
                    summary.failed += 1;
                    if summary.first_error.is_none() {
                        summary.first_error = Some(e.to_string());
                    }

                    match self.config.sync.drain_policy {
                        DrainPolicy::HaltOnFailure => {
                            warn!("Halting drain after first failure");
                            break;
                        }
                        DrainPolicy::SkipAndContinue => continue,
                    }
                }
            }
        }

        summary.remaining = repo.count_unsynced().await?;

        info!(
            committed = summary.committed,
            failed = summary.failed,
            remaining = summary.remaining,
            "Drain finished"
        );

        Ok(summary)
    }

    /// Submits a single record, translating it to the wire representation
    /// and applying the client-side commit timeout.
    async fn commit_one(&self, sale: &PendingSale) -> SyncResult<String> {
        let request = SaleCommitRequest::replay(sale);
        let timeout = Duration::from_secs(self.config.sync.commit_timeout_secs);

        match tokio::time::timeout(timeout, self.remote.commit_sale(&request)).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::RemoteCommit(format!(
                "commit timed out after {}s",
                self.config.sync.commit_timeout_secs
            ))),
        }
    }

    /// Drain trigger used by the watcher task: logs instead of propagating,
    /// and swallows the single-flight refusal entirely.
    async fn trigger_drain(&self) {
        match self.drain().await {
            Ok(summary) if summary.committed > 0 => {
                info!(committed = summary.committed, "Automatic drain committed sales");
            }
            Ok(_) => {}
            Err(e) if e.is_drain_in_progress() => {
                debug!("Drain already in progress, trigger ignored");
            }
            Err(e) => {
                warn!(error = %e, "Automatic drain failed");
            }
        }
    }

    fn record_success(&self) {
        if let Ok(mut state) = self.state.write() {
            state.last_error = None;
            state.last_sync_at = Some(Utc::now());
        }
    }

    fn record_error(&self, message: &str) {
        if let Ok(mut state) = self.state.write() {
            state.last_error = Some(message.to_string());
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
