//! The local package cache
//!
//! Fetched artifacts live under a configured base root, optionally
//! namespaced per feed. Files are written once under a unique name and
//! never mutated, so readers and writers need no coordination.

pub mod locator;
pub mod scanner;
pub mod space;

pub use locator::CacheLocator;
pub use scanner::{find_in_cache, CachedArtifact};
pub use space::ensure_free_space;
