//! Fetching packages from remote feeds
//!
//! The orchestrator talks to a `PackageFetcher`; production code uses the
//! HTTP implementation, tests substitute counting fakes.

pub mod http;

pub use http::HttpFetcher;

use crate::cache::CachedArtifact;
use crate::error::{CapstanError, CapstanResult};
use crate::package::{Feed, PackageIdentity};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// How often and how patiently a fetch may retry
#[derive(Debug, Clone)]
pub struct RetryBudget {
    max_attempts: u32,
    backoff: Duration,
}

impl RetryBudget {
    /// At least one attempt is always made.
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }
}

/// Retrieves one package from a feed into a destination directory
pub trait PackageFetcher {
    /// Fetch `identity` from `feed`, writing a fully-formed artifact file
    /// under `destination_dir` and returning it opened. Each successful
    /// call produces exactly one new file under a name no other fetch can
    /// produce; failed attempts may leave partial files behind for
    /// external cleanup.
    fn fetch(
        &self,
        identity: &PackageIdentity,
        feed: &Feed,
        destination_dir: &Path,
        budget: &RetryBudget,
    ) -> CapstanResult<CachedArtifact>;
}

/// Why a single attempt did not produce a usable result
pub enum AttemptFailure {
    /// Retrying cannot help; surfaces immediately
    Fatal(CapstanError),
    /// Worth another attempt while the budget lasts
    Transient(String),
}

/// Why a whole fetch, budget included, failed
pub enum FetchFailure {
    Fatal(CapstanError),
    Exhausted { attempts: u32, last_reason: String },
}

/// Run `attempt` up to the budget, sleeping the fixed backoff between
/// tries. No jitter and no exponential growth; the budget is the whole
/// cancellation story.
pub fn with_retries<T>(
    budget: &RetryBudget,
    mut attempt: impl FnMut(u32) -> Result<T, AttemptFailure>,
) -> Result<T, FetchFailure> {
    let mut last_reason = String::new();

    for n in 1..=budget.max_attempts() {
        match attempt(n) {
            Ok(value) => return Ok(value),
            Err(AttemptFailure::Fatal(e)) => return Err(FetchFailure::Fatal(e)),
            Err(AttemptFailure::Transient(reason)) => {
                warn!(
                    "Attempt {}/{} failed: {}",
                    n,
                    budget.max_attempts(),
                    reason
                );
                last_reason = reason;
                if n < budget.max_attempts() {
                    std::thread::sleep(budget.backoff());
                }
            }
        }
    }

    Err(FetchFailure::Exhausted {
        attempts: budget.max_attempts(),
        last_reason,
    })
}
