//! # Connectivity Monitor
//!
//! A single current "online" boolean, fed by the platform's push-style
//! connectivity events, with change notifications for subscribers.
//!
//! ## Event Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Connectivity Monitor                                │
//! │                                                                         │
//! │  Platform events (shell)          Monitor               Subscribers     │
//! │  ───────────────────────          ───────               ───────────     │
//! │                                                                         │
//! │  "online" event ────────────► set_online(true) ──┐                      │
//! │  "offline" event ───────────► set_online(false) ─┤                      │
//! │                                                  ▼                      │
//! │                                    watch::Sender<bool>                  │
//! │                                          │                              │
//! │              current_status() ◄──────────┤ (synchronous read)           │
//! │                                          │                              │
//! │              subscribe() ◄───────────────┘ (change notifications)       │
//! │                                                                         │
//! │  No polling, no retries: the monitor only reflects what the platform    │
//! │  pushes, starting from an assumed-online default.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why a watch channel?
//! `tokio::sync::watch` holds exactly one current value and wakes receivers
//! only when it changes - precisely the "current flag + on-change" contract.
//! Repeated events with the same value are deduplicated at the sender, so a
//! platform that fires "online" twice produces one transition, not two
//! drain triggers.

use tokio::sync::watch;
use tracing::debug;

/// Observes transitions between offline and online states.
///
/// Passed explicitly (usually as `Arc<ConnectivityMonitor>`) to the sync
/// engine and checkout orchestrator - an injected dependency, not an
/// ambient global.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    tx: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    /// Creates a monitor with the given initial state.
    pub fn new(initially_online: bool) -> Self {
        let (tx, _rx) = watch::channel(initially_online);
        ConnectivityMonitor { tx }
    }

    /// Creates a monitor in the assumed-online startup default.
    ///
    /// Until the first platform event arrives there is no evidence either
    /// way; assuming online keeps checkout on the direct path, and a real
    /// offline event corrects the assumption immediately.
    pub fn assume_online() -> Self {
        Self::new(true)
    }

    /// Returns the current online status synchronously.
    pub fn current_status(&self) -> bool {
        *self.tx.borrow()
    }

    /// Feeds a platform connectivity event into the monitor.
    ///
    /// Subscribers are only notified on actual transitions; repeating the
    /// current state is a no-op.
    pub fn set_online(&self, online: bool) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });

        if changed {
            debug!(online, "Connectivity changed");
        }
    }

    /// Subscribes to connectivity transitions.
    ///
    /// The receiver yields the new state after each transition; this is the
    /// `on_change` surface the sync engine's watcher task is built on.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::assume_online()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assume_online_default() {
        let monitor = ConnectivityMonitor::assume_online();
        assert!(monitor.current_status());
    }

    #[test]
    fn test_set_online_updates_status() {
        let monitor = ConnectivityMonitor::assume_online();

        monitor.set_online(false);
        assert!(!monitor.current_status());

        monitor.set_online(true);
        assert!(monitor.current_status());
    }

    #[tokio::test]
    async fn test_subscriber_sees_transition() {
        let monitor = ConnectivityMonitor::assume_online();
        let mut rx = monitor.subscribe();

        monitor.set_online(false);

        rx.changed().await.unwrap();
        assert!(!*rx.borrow_and_update());
    }

    #[tokio::test]
    async fn test_repeated_event_is_not_a_transition() {
        let monitor = ConnectivityMonitor::assume_online();
        let mut rx = monitor.subscribe();
        rx.borrow_and_update();

        // Platform fires "online" while we're already online
        monitor.set_online(true);
        assert!(!rx.has_changed().unwrap());

        // A real transition still comes through
        monitor.set_online(false);
        assert!(rx.has_changed().unwrap());
    }
}
