//! HTTP package fetcher
//!
//! Streams `GET {feed}/{id}/{version}` into a uniquely named file in the
//! cache directory. The unique name is what makes concurrent fetches of
//! the same package safe: two fetchers produce two valid files and a
//! later scan picks either.

use crate::cache::CachedArtifact;
use crate::error::{CapstanError, CapstanResult};
use crate::fetch::{with_retries, AttemptFailure, FetchFailure, PackageFetcher, RetryBudget};
use crate::package::{Feed, LocalPackage, PackageIdentity, ARTIFACT_EXTENSION};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

const USER_AGENT: &str = concat!("capstan/", env!("CARGO_PKG_VERSION"));

/// Fetches packages over HTTP(S) using a shared agent
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let config = ureq::Agent::config_builder()
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent: config.new_agent(),
        }
    }

    /// One transfer attempt: stream the response body into `dest`.
    /// A previous partial attempt at the same path is truncated.
    fn download_once(&self, url: &str, feed: &Feed, dest: &Path) -> Result<(), AttemptFailure> {
        let mut request = self.agent.get(url);
        if let Some(auth) = feed.credentials.authorization_header() {
            request = request.header("Authorization", &auth);
        }

        let response = match request.call() {
            Ok(response) => response,
            // A feed that answers "no such package" will keep answering it
            Err(ureq::Error::StatusCode(code)) if code == 404 || code == 410 => {
                return Err(AttemptFailure::Fatal(CapstanError::PackageNotFound {
                    package: url.to_string(),
                    feed: feed.uri.clone(),
                    status: code,
                }));
            }
            Err(e) => return Err(AttemptFailure::Transient(e.to_string())),
        };

        let mut file = File::create(dest).map_err(|e| {
            AttemptFailure::Fatal(CapstanError::io(
                format!("creating download file {}", dest.display()),
                e,
            ))
        })?;

        let mut reader = response.into_body().into_reader();
        io::copy(&mut reader, &mut file)
            .map_err(|e| AttemptFailure::Transient(format!("transfer interrupted: {}", e)))?;
        Ok(())
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageFetcher for HttpFetcher {
    fn fetch(
        &self,
        identity: &PackageIdentity,
        feed: &Feed,
        destination_dir: &Path,
        budget: &RetryBudget,
    ) -> CapstanResult<CachedArtifact> {
        info!(
            "Downloading package {} from feed: '{}'",
            identity, feed.uri
        );
        debug!(
            "Downloaded package will be stored in: '{}'",
            destination_dir.display()
        );

        fs::create_dir_all(destination_dir).map_err(|e| {
            CapstanError::io(
                format!("creating cache directory {}", destination_dir.display()),
                e,
            )
        })?;

        let dest = destination_dir.join(unique_file_name(identity));
        let url = package_url(&feed.uri, identity);

        let transfer = with_retries(budget, |_| self.download_once(&url, feed, &dest));
        match transfer {
            Ok(()) => {}
            Err(FetchFailure::Fatal(e)) => return Err(e),
            Err(FetchFailure::Exhausted {
                attempts,
                last_reason,
            }) => {
                return Err(CapstanError::DownloadFailed {
                    package: identity.to_string(),
                    feed: feed.uri.clone(),
                    attempts,
                    reason: last_reason,
                });
            }
        }

        // The transfer completed; anything wrong with the bytes now is
        // corruption, not a transport problem, and is not retried.
        let package = LocalPackage::open(&dest)?;
        Ok(CachedArtifact {
            package,
            path: dest,
        })
    }
}

/// `{id}.{version}_{token}.cpkg` — a name no concurrent fetch can collide
/// with, and one the cache scanner's prefix filter recognizes.
fn unique_file_name(identity: &PackageIdentity) -> String {
    format!(
        "{}{}.{}",
        identity.file_prefix(),
        Uuid::new_v4().simple(),
        ARTIFACT_EXTENSION
    )
}

/// Download URL for a package on a feed
fn package_url(feed_uri: &str, identity: &PackageIdentity) -> String {
    format!(
        "{}/{}/{}",
        feed_uri.trim_end_matches('/'),
        identity.id,
        identity.version
    )
}
