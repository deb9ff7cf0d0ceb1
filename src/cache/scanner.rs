//! Searching the cache for an existing artifact
//!
//! Concurrent fetchers may be writing while a scan runs, so every
//! per-file failure is a skip, never an error. A file only counts once
//! it parses as a complete package whose manifest matches the request.

use crate::package::{LocalPackage, PackageIdentity, PackageVersion, ARTIFACT_EXTENSION};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// A package discovered in the cache. Read-only from here on.
#[derive(Debug)]
pub struct CachedArtifact {
    pub package: LocalPackage,
    pub path: PathBuf,
}

/// Outcome of safely reading one candidate file
enum ReadOutcome {
    Artifact(LocalPackage),
    Skip(String),
}

/// Attempt to read a candidate as a package, mapping every failure to a
/// skip reason. Files vanishing mid-scan and half-written files land here.
fn try_read_artifact(path: &Path) -> ReadOutcome {
    match LocalPackage::open(path) {
        Ok(package) => ReadOutcome::Artifact(package),
        Err(e) => ReadOutcome::Skip(e.to_string()),
    }
}

/// Search `root` for a cached copy of `identity`.
///
/// Candidates are files anywhere under `root` whose name starts with
/// `{id}.{version}_` (case-insensitive) and carries the artifact
/// extension. The first candidate whose manifest matches wins; if several
/// equivalent copies exist, any one of them is as good as another.
pub fn find_in_cache(root: &Path, identity: &PackageIdentity) -> Option<CachedArtifact> {
    debug!(
        "Checking package cache for package {} in '{}'",
        identity,
        root.display()
    );

    let prefix = identity.file_prefix().to_ascii_lowercase();
    let mut candidates = Vec::new();
    collect_candidates(root, &prefix, &mut candidates);

    for path in candidates {
        let package = match try_read_artifact(&path) {
            ReadOutcome::Artifact(package) => package,
            ReadOutcome::Skip(reason) => {
                trace!("Skipping cache file {}: {}", path.display(), reason);
                continue;
            }
        };

        if manifest_matches(&package, identity) {
            debug!("Cache hit: {}", path.display());
            return Some(CachedArtifact { package, path });
        }
    }

    None
}

/// Whether a parsed package's declared identity satisfies the request:
/// case-insensitive id equality, and version equality in either the
/// parsed-semver or raw-string representation.
fn manifest_matches(package: &LocalPackage, identity: &PackageIdentity) -> bool {
    let manifest = package.manifest();
    if !identity.id_matches(&manifest.id) {
        return false;
    }
    match PackageVersion::parse(&manifest.version) {
        Ok(declared) => declared.matches(&identity.version),
        Err(_) => false,
    }
}

/// Recursively gather files under `dir` matching the name prefix.
/// Unreadable directories are skipped; the cache tolerates concurrent
/// writers and external cleanup.
fn collect_candidates(dir: &Path, prefix_lower: &str, out: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_candidates(&path, prefix_lower, out);
            continue;
        }

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let name_lower = name.to_ascii_lowercase();
        if name_lower.starts_with(prefix_lower)
            && name_lower.ends_with(&format!(".{}", ARTIFACT_EXTENSION))
        {
            out.push(path);
        }
    }
}
