//! Package identity, versions and feed descriptions

pub mod archive;
pub mod manifest;

pub use archive::{write_package, LocalPackage, ARTIFACT_EXTENSION};
pub use manifest::{DependencySpec, PackageManifest};

use crate::error::{CapstanError, CapstanResult};
use std::fmt;

/// A package version as supplied by a feed or a deployment step.
///
/// Input sources stringify versions inconsistently: the same release may
/// appear as `1.2.3`, `1.2` or the legacy four-part `1.2.3.0`. The raw
/// string is kept alongside the parsed form so both representations can
/// be compared.
#[derive(Debug, Clone)]
pub struct PackageVersion {
    raw: String,
    parsed: Option<semver::Version>,
}

impl PackageVersion {
    /// Parse a version string, tolerating legacy encodings.
    ///
    /// `1.2` is treated as `1.2.0`; a four-part `1.2.3.0` with a zero
    /// revision is treated as `1.2.3`. A nonzero fourth part cannot be
    /// represented as a semantic version and keeps only the raw form.
    pub fn parse(input: &str) -> CapstanResult<Self> {
        let raw = input.trim().to_string();
        if raw.is_empty() {
            return Err(CapstanError::VersionParse {
                input: input.to_string(),
                reason: "empty version string".to_string(),
            });
        }

        let parsed = Self::normalize(&raw).and_then(|n| semver::Version::parse(&n).ok());
        if parsed.is_none() && !raw.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return Err(CapstanError::VersionParse {
                input: input.to_string(),
                reason: "version must start with a digit".to_string(),
            });
        }

        Ok(Self { raw, parsed })
    }

    /// Rewrite legacy encodings into semver syntax, if possible.
    fn normalize(raw: &str) -> Option<String> {
        let (numbers, suffix) = match raw.find(['-', '+']) {
            Some(idx) => (&raw[..idx], &raw[idx..]),
            None => (raw, ""),
        };

        let parts: Vec<&str> = numbers.split('.').collect();
        if parts.iter().any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit())) {
            return None;
        }

        match parts.len() {
            1 => Some(format!("{}.0.0{}", parts[0], suffix)),
            2 => Some(format!("{}.{}.0{}", parts[0], parts[1], suffix)),
            3 => Some(format!("{}{}", numbers, suffix)),
            // Four-part versions only map onto semver when the revision is zero
            4 if parts[3].chars().all(|c| c == '0') => {
                Some(format!("{}.{}.{}{}", parts[0], parts[1], parts[2], suffix))
            }
            _ => None,
        }
    }

    /// The version string exactly as supplied.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The parsed semantic version, when the input mapped onto one.
    pub fn semver(&self) -> Option<&semver::Version> {
        self.parsed.as_ref()
    }

    /// Whether two versions denote the same release.
    ///
    /// Accepts either parsed-semver equality or raw-string equality, so a
    /// cached `1.0.0.0` still matches a requested `1.0.0` and vice versa.
    pub fn matches(&self, other: &PackageVersion) -> bool {
        let semver_match = match (&self.parsed, &other.parsed) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        semver_match || self.raw.eq_ignore_ascii_case(&other.raw)
    }
}

impl fmt::Display for PackageVersion {
    /// Normalized form when available, raw form otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parsed {
            Some(v) => write!(f, "{}", v),
            None => write!(f, "{}", self.raw),
        }
    }
}

/// The (id, version) pair naming a fetchable package within a feed
#[derive(Debug, Clone)]
pub struct PackageIdentity {
    pub id: String,
    pub version: PackageVersion,
}

impl PackageIdentity {
    pub fn new(id: impl Into<String>, version: PackageVersion) -> Self {
        Self {
            id: id.into(),
            version,
        }
    }

    /// Case-insensitive id comparison; feeds do not distinguish casing.
    pub fn id_matches(&self, other_id: &str) -> bool {
        self.id.eq_ignore_ascii_case(other_id)
    }

    /// The filename prefix every cached copy of this package carries:
    /// `{id}.{version}_`
    pub fn file_prefix(&self) -> String {
        format!("{}.{}_", self.id, self.version)
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.version)
    }
}

/// Credentials presented to a feed when fetching
#[derive(Debug, Clone, Default)]
pub enum FeedCredentials {
    #[default]
    Anonymous,
    Token(String),
    Basic {
        username: String,
        password: String,
    },
}

impl FeedCredentials {
    /// The Authorization header value to send, if any.
    pub fn authorization_header(&self) -> Option<String> {
        use base64::prelude::{Engine as _, BASE64_STANDARD};
        match self {
            Self::Anonymous => None,
            Self::Token(token) => Some(format!("Bearer {}", token)),
            Self::Basic { username, password } => {
                let encoded = BASE64_STANDARD.encode(format!("{}:{}", username, password));
                Some(format!("Basic {}", encoded))
            }
        }
    }
}

/// A remote source of packages
#[derive(Debug, Clone)]
pub struct Feed {
    /// Optional namespace identifier; namespaces the cache root when present
    pub id: Option<String>,
    /// Base URI of the feed
    pub uri: String,
    pub credentials: FeedCredentials,
}

impl Feed {
    pub fn new(id: Option<String>, uri: impl Into<String>, credentials: FeedCredentials) -> Self {
        Self {
            id,
            uri: uri.into(),
            credentials,
        }
    }
}
