//! Deployment manifest release references.
//!
//! Only the parts of a deployment manifest that matter for release upload are
//! modelled; every other key is ignored.

use serde::{Deserialize, Serialize};

use crate::error::{ReleaseError, ReleaseResult};

/// A deployment manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentManifest {
    /// Deployment name
    pub name: String,
    /// Releases the deployment uses
    #[serde(default)]
    pub releases: Vec<ReleaseRef>,
}

impl DeploymentManifest {
    /// Parses a deployment manifest from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::DeploymentManifest`] if the YAML is malformed.
    pub fn from_yaml(yaml: &str) -> ReleaseResult<Self> {
        serde_yaml::from_str(yaml).map_err(ReleaseError::DeploymentManifest)
    }
}

/// A release referenced by a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRef {
    /// Release name
    pub name: String,
    /// Release version, or `latest`
    pub version: String,
    /// Where the director can fetch the release from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Expected digest of the release tarball
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    /// Stemcell the release was compiled against, for compiled releases
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stemcell: Option<StemcellRef>,
}

impl ReleaseRef {
    /// `name/version`.
    #[must_use]
    pub fn slug(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }

    /// True when the version pins a concrete release.
    #[must_use]
    pub fn has_pinned_version(&self) -> bool {
        !self.version.is_empty() && self.version != "latest"
    }
}

/// Stemcell a compiled release targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemcellRef {
    /// Operating system
    pub os: String,
    /// Stemcell version
    pub version: String,
}
