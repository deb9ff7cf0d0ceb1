//! The download command: one acquisition call

use crate::acquire::PackageAcquirer;
use crate::cache::CacheLocator;
use crate::cli::args::DownloadArgs;
use crate::config::Config;
use crate::error::CapstanResult;
use crate::fetch::{HttpFetcher, RetryBudget};
use crate::package::{Feed, FeedCredentials, PackageIdentity, PackageVersion};
use std::time::Duration;

pub fn download(args: DownloadArgs, config: &Config) -> CapstanResult<()> {
    let version = PackageVersion::parse(&args.package_version)?;
    let identity = PackageIdentity::new(args.package_id, version);

    let credentials = match (args.feed_token, args.feed_username, args.feed_password) {
        (Some(token), _, _) => FeedCredentials::Token(token),
        (None, Some(username), Some(password)) => FeedCredentials::Basic { username, password },
        _ => FeedCredentials::Anonymous,
    };
    let feed = Feed::new(args.feed_id, args.feed_uri, credentials);

    let budget = RetryBudget::new(
        args.max_attempts.unwrap_or(config.download.max_attempts),
        args.attempt_backoff_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| config.download.backoff()),
    );

    // CLI override beats the config file for the cache root
    let locator = match args.cache_root {
        Some(root) => CacheLocator::with_root(root),
        None => CacheLocator::new(config)?,
    };

    let acquirer = PackageAcquirer::new(locator, config.cache.clone(), HttpFetcher::new());
    let acquired = acquirer.acquire(&identity, &feed, args.force, &budget)?;

    // The three output values the calling deployment step consumes
    println!("path={}", acquired.path.display());
    println!("hash={}", acquired.hash);
    println!("size={}", acquired.size_bytes);
    Ok(())
}
