//! Error types for Capstan
//!
//! All modules use `CapstanResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Capstan operations
pub type CapstanResult<T> = Result<T, CapstanError>;

/// All errors that can occur in Capstan
#[derive(Error, Debug)]
pub enum CapstanError {
    // Configuration errors
    #[error("Package cache root is not configured. Set cache.root in the config file or pass --cache-root.")]
    CacheRootNotConfigured,

    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Cache errors
    #[error("Not enough free disk space on the volume containing {path}: {available} bytes available, {required} bytes required")]
    InsufficientDiskSpace {
        path: PathBuf,
        available: u64,
        required: u64,
    },

    // Fetch errors
    #[error("Failed to download package {package} from feed '{feed}' after {attempts} attempt(s): {reason}")]
    DownloadFailed {
        package: String,
        feed: String,
        attempts: u32,
        reason: String,
    },

    #[error("Package {package} was not found on feed '{feed}' (HTTP {status})")]
    PackageNotFound {
        package: String,
        feed: String,
        status: u16,
    },

    // Package format errors
    #[error("Invalid package file {path}: {reason}")]
    PackageFormat { path: PathBuf, reason: String },

    #[error("Invalid package version '{input}': {reason}")]
    VersionParse { input: String, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CapstanError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a package format error
    pub fn format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::PackageFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CacheRootNotConfigured => {
                Some("Run: capstan config path, then set cache.root in that file")
            }
            Self::InsufficientDiskSpace { .. } => {
                Some("Free up disk space or lower cache.min_free_bytes in the config")
            }
            _ => None,
        }
    }
}
