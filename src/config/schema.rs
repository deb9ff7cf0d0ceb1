//! Configuration schema

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default minimum free disk space before a fetch: 500 MB
pub const DEFAULT_MIN_FREE_BYTES: u64 = 500 * 1024 * 1024;

/// Default retry budget for downloads
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_ATTEMPT_BACKOFF_MS: u64 = 10_000;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache: CacheConfig,
    pub download: DownloadConfig,
}

/// `[cache]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Base directory for cached packages. Required before any
    /// acquisition can run; there is no safe fallback location.
    pub root: Option<PathBuf>,
    /// Whether to check free disk space before fetching
    pub verify_free_space: bool,
    /// Minimum free bytes required on the cache volume
    pub min_free_bytes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: None,
            verify_free_space: true,
            min_free_bytes: DEFAULT_MIN_FREE_BYTES,
        }
    }
}

/// `[download]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Attempts per fetch, including the first
    pub max_attempts: u32,
    /// Fixed pause between attempts, in milliseconds
    pub attempt_backoff_ms: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            attempt_backoff_ms: DEFAULT_ATTEMPT_BACKOFF_MS,
        }
    }
}

impl DownloadConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.attempt_backoff_ms)
    }
}
