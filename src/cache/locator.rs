//! Mapping feeds to cache directories

use crate::config::Config;
use crate::error::{CapstanError, CapstanResult};
use std::path::PathBuf;

/// Resolves the cache directory for a feed.
///
/// The base root comes from injected configuration; a missing root is a
/// construction failure, never a silently wrong location.
#[derive(Debug, Clone)]
pub struct CacheLocator {
    base_root: PathBuf,
}

impl CacheLocator {
    /// Build a locator from configuration.
    pub fn new(config: &Config) -> CapstanResult<Self> {
        let base_root = config
            .cache
            .root
            .clone()
            .ok_or(CapstanError::CacheRootNotConfigured)?;
        Ok(Self { base_root })
    }

    /// Build a locator for an explicit base root.
    pub fn with_root(base_root: PathBuf) -> Self {
        Self { base_root }
    }

    /// The cache directory for a feed: base root joined with the feed id,
    /// or the shared base root when the feed has none.
    ///
    /// Pure path arithmetic; callers create the directory on demand.
    pub fn root(&self, feed_id: Option<&str>) -> PathBuf {
        match feed_id {
            Some(id) if !id.trim().is_empty() => self.base_root.join(id),
            _ => self.base_root.clone(),
        }
    }

    pub fn base_root(&self) -> &PathBuf {
        &self.base_root
    }
}
