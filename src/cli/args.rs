//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Capstan - Package acquisition and content cache
///
/// Downloads deployment packages from remote feeds into a verified local
/// cache and reuses them across deployments.
#[derive(Parser, Debug)]
#[command(name = "capstan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CAPSTAN_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Acquire a package: cache scan, download on miss, verify
    Download(DownloadArgs),

    /// Inspect the package cache
    Cache(CacheArgs),

    /// Show configuration
    Config(ConfigArgs),
}

/// Arguments for the download command
#[derive(Parser, Debug)]
pub struct DownloadArgs {
    /// Package id, e.g. Acme.Web
    #[arg(long)]
    pub package_id: String,

    /// Exact package version, e.g. 1.2.3
    #[arg(long)]
    pub package_version: String,

    /// Base URI of the feed to download from
    #[arg(long)]
    pub feed_uri: String,

    /// Optional feed identifier; namespaces the cache
    #[arg(long)]
    pub feed_id: Option<String>,

    /// Bearer token for the feed
    #[arg(long, env = "CAPSTAN_FEED_TOKEN", conflicts_with_all = ["feed_username", "feed_password"])]
    pub feed_token: Option<String>,

    /// Username for basic authentication
    #[arg(long, requires = "feed_password")]
    pub feed_username: Option<String>,

    /// Password for basic authentication
    #[arg(long, env = "CAPSTAN_FEED_PASSWORD", requires = "feed_username")]
    pub feed_password: Option<String>,

    /// Download even when a cached copy exists
    #[arg(long)]
    pub force: bool,

    /// Attempts per download, including the first
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Fixed pause between attempts, in milliseconds
    #[arg(long)]
    pub attempt_backoff_ms: Option<u64>,

    /// Override the configured cache root
    #[arg(long, env = "CAPSTAN_CACHE_ROOT")]
    pub cache_root: Option<PathBuf>,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommands,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// List cached packages
    List {
        /// Limit the listing to one feed's namespace
        #[arg(long)]
        feed_id: Option<String>,

        /// Override the configured cache root
        #[arg(long, env = "CAPSTAN_CACHE_ROOT")]
        cache_root: Option<PathBuf>,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
}
