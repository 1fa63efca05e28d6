//! # Sync Configuration
//!
//! Configuration for the drain loop, loaded from a TOML file in the
//! platform config directory with sensible defaults when absent.
//!
//! ## Config File
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ~/.config/cloudpos/sync.toml        (Linux; platform-dependent)        │
//! │                                                                         │
//! │  [sync]                                                                 │
//! │  drain_policy = "halt_on_failure"    # or "skip_and_continue"           │
//! │  commit_timeout_secs = 30                                               │
//! │  assume_online_at_startup = true                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Drain Policy
//! The default halts the whole batch on the first failing record: one
//! rejection is more often a systemic failure (endpoint down, auth expired)
//! than a bad record, and halting avoids reporting partial success over a
//! broken link. `skip_and_continue` commits what it can and leaves failing
//! records for the next drain.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Drain Policy
// =============================================================================

/// What the drain loop does when a remote commit fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainPolicy {
    /// Stop the batch on the first failing record. Nothing after it is
    /// attempted; everything stays queued for the next drain.
    HaltOnFailure,

    /// Skip the failing record and keep draining the rest.
    SkipAndContinue,
}

impl Default for DrainPolicy {
    fn default() -> Self {
        DrainPolicy::HaltOnFailure
    }
}

// =============================================================================
// Sync Config
// =============================================================================

/// Sync engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub sync: SyncSettings,
}

/// `[sync]` section of the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Failure handling during a drain.
    pub drain_policy: DrainPolicy,

    /// Client-side timeout for a single remote commit call, in seconds.
    /// A timed-out commit takes the same failure path as a rejected one.
    pub commit_timeout_secs: u64,

    /// Whether the connectivity monitor starts in the online state before
    /// the first platform event arrives.
    pub assume_online_at_startup: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            drain_policy: DrainPolicy::default(),
            commit_timeout_secs: 30,
            assume_online_at_startup: true,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            sync: SyncSettings::default(),
        }
    }
}

impl SyncConfig {
    /// Default config file location in the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "cloudpos", "cloudpos")
            .map(|dirs| dirs.config_dir().join("sync.toml"))
    }

    /// Loads the configuration from a TOML file.
    pub fn load(path: &Path) -> SyncResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: SyncConfig = toml::from_str(&raw)?;
        debug!(path = %path.display(), "Loaded sync config");
        Ok(config)
    }

    /// Loads the configuration, falling back to defaults.
    ///
    /// A missing file is normal (first run); a malformed one falls back too
    /// but is logged, so a typo doesn't silently disable offline sync.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let resolved = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path(),
        };

        match resolved {
            Some(p) if p.exists() => match Self::load(&p) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "Bad sync config, using defaults");
                    SyncConfig::default()
                }
            },
            _ => {
                debug!("No sync config file, using defaults");
                SyncConfig::default()
            }
        }
    }

    /// Saves the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> SyncResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
        }

        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;

        info!(path = %path.display(), "Saved sync config");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
