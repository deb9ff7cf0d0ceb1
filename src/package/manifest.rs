//! Package manifests and the dependency advisory
//!
//! A manifest declares its dependencies either as a flat list or grouped
//! by target framework. Both encodings are normalized to a flat list of
//! descriptors; callers never see the difference.

use crate::package::archive::LocalPackage;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Documentation explaining why declared dependencies are not installed
pub const DEPENDENCY_DOCS_URL: &str = "https://capstan-deploy.github.io/docs/packaging";

/// A single declared dependency
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DependencySpec {
    pub id: String,
    pub version: String,
}

impl fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.version)
    }
}

/// Dependencies scoped to one target framework
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyGroup {
    #[serde(default)]
    pub target_framework: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<DependencySpec>,
}

/// The metadata document embedded in a package file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageManifest {
    pub id: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencySpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependency_groups: Vec<DependencyGroup>,
}

impl PackageManifest {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            description: None,
            dependencies: Vec::new(),
            dependency_groups: Vec::new(),
        }
    }

    /// All declared dependencies, flat and grouped forms merged
    pub fn dependencies(&self) -> Vec<DependencySpec> {
        self.dependencies
            .iter()
            .cloned()
            .chain(
                self.dependency_groups
                    .iter()
                    .flat_map(|g| g.dependencies.iter().cloned()),
            )
            .collect()
    }
}

/// Log an advisory when a freshly fetched package declares dependencies.
///
/// Dependencies are reported, never fetched; deployment steps install
/// exactly the one package they were given.
pub fn report_dependencies(package: &LocalPackage) {
    if let Some(message) = dependency_advisory(package.manifest()) {
        info!("{}", message);
    }
}

/// The advisory message for a manifest, or `None` when it declares no
/// dependencies. One message covers the whole list.
fn dependency_advisory(manifest: &PackageManifest) -> Option<String> {
    let dependencies = manifest.dependencies();
    if dependencies.is_empty() {
        return None;
    }

    let listing = dependencies
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!(
        "Packages with dependencies are not currently supported, and dependencies won't be installed. \
         The package '{} {}' appears to have the following dependencies: {}. \
         For more information please see {}",
        manifest.id, manifest.version, listing, DEPENDENCY_DOCS_URL
    ))
}
