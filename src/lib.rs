//! Capstan - Package acquisition and content cache
//!
//! Makes a package's bytes available locally exactly once: scan the
//! cache, fetch on miss with a bounded retry budget, verify, and hand
//! the deployment step a path, hash and size.

pub mod acquire;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod package;
pub mod verify;

pub use error::{CapstanError, CapstanResult};
