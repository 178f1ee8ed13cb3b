//! Release model.
//!
//! A release bundles jobs, source packages, compiled packages and an optional
//! license. Each of these is stored as its own nested tarball inside the
//! release archive and described by an entry in `release.MF`:
//!
//! - [`Job`]: a job template, `jobs/<name>.tgz`
//! - [`Package`]: a source package, `packages/<name>.tgz`
//! - [`CompiledPackage`]: a package compiled for a stemcell, `compiled_packages/<name>.tgz`
//! - [`License`]: `license.tgz`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tempfile::TempDir;

use crate::error::ArtifactKind;

/// File name of the manifest at the root of a release archive.
pub const MANIFEST_FILE: &str = "release.MF";

/// An item stored as a nested tarball inside a release archive.
pub trait Bundled {
    /// Path of the item relative to the root of the release archive.
    fn entry_path(&self) -> PathBuf;

    /// Digest recorded in `release.MF`.
    fn digest(&self) -> &str;

    /// Location of the backing file on disk.
    fn archive_path(&self) -> &Path;

    /// Points the item at its backing file.
    fn set_archive_path(&mut self, path: PathBuf);
}

/// A named, fingerprinted item that can be merged across releases.
pub trait Artifact: Bundled + Clone {
    /// Class reported in merge conflicts.
    const KIND: ArtifactKind;

    /// Artifact name, unique within a release.
    fn name(&self) -> &str;

    /// Content fingerprint.
    fn fingerprint(&self) -> &str;
}

/// A release job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Job name
    pub name: String,
    /// Job version
    pub version: String,
    /// Content fingerprint
    pub fingerprint: String,
    /// Digest of the job tarball
    #[serde(rename = "sha1")]
    pub digest: String,
    /// Packages the job depends on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<String>,
    /// Backing tarball on disk
    #[serde(skip)]
    pub archive_path: PathBuf,
}

impl Job {
    /// Creates a job whose version equals its fingerprint.
    #[must_use]
    pub fn new(name: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        let fingerprint = fingerprint.into();
        Self {
            name: name.into(),
            version: fingerprint.clone(),
            fingerprint,
            digest: String::new(),
            packages: Vec::new(),
            archive_path: PathBuf::new(),
        }
    }

    /// Sets the recorded digest.
    #[must_use]
    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        self.digest = digest.into();
        self
    }

    /// Sets the backing tarball.
    #[must_use]
    pub fn with_archive(mut self, path: impl Into<PathBuf>) -> Self {
        self.archive_path = path.into();
        self
    }

    /// Sets the package dependencies.
    #[must_use]
    pub fn with_packages(mut self, packages: Vec<String>) -> Self {
        self.packages = packages;
        self
    }
}

impl Bundled for Job {
    fn entry_path(&self) -> PathBuf {
        Path::new("jobs").join(format!("{}.tgz", self.name))
    }

    fn digest(&self) -> &str {
        &self.digest
    }

    fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    fn set_archive_path(&mut self, path: PathBuf) {
        self.archive_path = path;
    }
}

impl Artifact for Job {
    const KIND: ArtifactKind = ArtifactKind::Job;

    fn name(&self) -> &str {
        &self.name
    }

    fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// A source package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Package name
    pub name: String,
    /// Package version
    pub version: String,
    /// Content fingerprint
    pub fingerprint: String,
    /// Digest of the package tarball
    #[serde(rename = "sha1")]
    pub digest: String,
    /// Packages this package depends on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    /// Backing tarball on disk
    #[serde(skip)]
    pub archive_path: PathBuf,
}

impl Package {
    /// Creates a source package whose version equals its fingerprint.
    #[must_use]
    pub fn new(name: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        let fingerprint = fingerprint.into();
        Self {
            name: name.into(),
            version: fingerprint.clone(),
            fingerprint,
            digest: String::new(),
            dependencies: Vec::new(),
            archive_path: PathBuf::new(),
        }
    }
}

impl Bundled for Package {
    fn entry_path(&self) -> PathBuf {
        Path::new("packages").join(format!("{}.tgz", self.name))
    }

    fn digest(&self) -> &str {
        &self.digest
    }

    fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    fn set_archive_path(&mut self, path: PathBuf) {
        self.archive_path = path;
    }
}

/// A package compiled against a specific stemcell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledPackage {
    /// Package name
    pub name: String,
    /// Package version
    pub version: String,
    /// Content fingerprint of the package source
    pub fingerprint: String,
    /// Digest of the compiled tarball
    #[serde(rename = "sha1")]
    pub digest: String,
    /// Stemcell the package was compiled on, as `os/version`
    pub stemcell: String,
    /// Packages this package depends on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    /// Backing tarball on disk
    #[serde(skip)]
    pub archive_path: PathBuf,
}

impl CompiledPackage {
    /// Creates a compiled package whose version equals its fingerprint.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        fingerprint: impl Into<String>,
        stemcell: impl Into<String>,
    ) -> Self {
        let fingerprint = fingerprint.into();
        Self {
            name: name.into(),
            version: fingerprint.clone(),
            fingerprint,
            digest: String::new(),
            stemcell: stemcell.into(),
            dependencies: Vec::new(),
            archive_path: PathBuf::new(),
        }
    }

    /// Sets the recorded digest.
    #[must_use]
    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        self.digest = digest.into();
        self
    }

    /// Sets the backing tarball.
    #[must_use]
    pub fn with_archive(mut self, path: impl Into<PathBuf>) -> Self {
        self.archive_path = path.into();
        self
    }
}

impl Bundled for CompiledPackage {
    fn entry_path(&self) -> PathBuf {
        Path::new("compiled_packages").join(format!("{}.tgz", self.name))
    }

    fn digest(&self) -> &str {
        &self.digest
    }

    fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    fn set_archive_path(&mut self, path: PathBuf) {
        self.archive_path = path;
    }
}

impl Artifact for CompiledPackage {
    const KIND: ArtifactKind = ArtifactKind::CompiledPackage;

    fn name(&self) -> &str {
        &self.name
    }

    fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// The release license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    /// License version
    pub version: String,
    /// Content fingerprint
    pub fingerprint: String,
    /// Digest of the license tarball
    #[serde(rename = "sha1")]
    pub digest: String,
    /// Backing tarball on disk
    #[serde(skip)]
    pub archive_path: PathBuf,
}

impl Bundled for License {
    fn entry_path(&self) -> PathBuf {
        PathBuf::from("license.tgz")
    }

    fn digest(&self) -> &str {
        &self.digest
    }

    fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    fn set_archive_path(&mut self, path: PathBuf) {
        self.archive_path = path;
    }
}

/// Contents of `release.MF`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseManifest {
    /// Release name
    pub name: String,
    /// Release version
    pub version: String,
    /// Commit the release was built from
    #[serde(default)]
    pub commit_hash: String,
    /// Whether the working tree was dirty at build time
    #[serde(default)]
    pub uncommitted_changes: bool,
    /// Jobs
    #[serde(default)]
    pub jobs: Vec<Job>,
    /// Source packages
    #[serde(default)]
    pub packages: Vec<Package>,
    /// Compiled packages
    #[serde(default)]
    pub compiled_packages: Vec<CompiledPackage>,
    /// License, if the release ships one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
}

impl ReleaseManifest {
    /// Creates an empty manifest.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            commit_hash: String::new(),
            uncommitted_changes: false,
            jobs: Vec::new(),
            packages: Vec::new(),
            compiled_packages: Vec::new(),
            license: None,
        }
    }
}

/// A release together with the storage backing its artifacts.
///
/// Releases read from an archive own the directory the archive was unpacked
/// into. The directory is shared, so a release produced by merging keeps the
/// storage of both inputs alive after the inputs are dropped.
#[derive(Debug, Clone)]
pub struct Release {
    manifest: ReleaseManifest,
    storage: Vec<Arc<TempDir>>,
}

impl Release {
    /// Creates a release whose artifacts point at caller-managed files.
    #[must_use]
    pub fn new(manifest: ReleaseManifest) -> Self {
        Self {
            manifest,
            storage: Vec::new(),
        }
    }

    pub(crate) fn with_storage(manifest: ReleaseManifest, storage: Vec<Arc<TempDir>>) -> Self {
        Self { manifest, storage }
    }

    pub(crate) fn storage(&self) -> &[Arc<TempDir>] {
        &self.storage
    }

    /// The parsed manifest.
    #[must_use]
    pub fn manifest(&self) -> &ReleaseManifest {
        &self.manifest
    }

    /// Release name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    /// Release version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.manifest.version
    }

    /// `name/version`.
    #[must_use]
    pub fn slug(&self) -> String {
        format!("{}/{}", self.manifest.name, self.manifest.version)
    }

    /// Commit hash, suffixed with `+` when built from a dirty tree.
    #[must_use]
    pub fn commit_hash_with_mark(&self) -> String {
        if self.manifest.uncommitted_changes {
            format!("{}+", self.manifest.commit_hash)
        } else {
            self.manifest.commit_hash.clone()
        }
    }

    /// Jobs.
    #[must_use]
    pub fn jobs(&self) -> &[Job] {
        &self.manifest.jobs
    }

    /// Source packages.
    #[must_use]
    pub fn packages(&self) -> &[Package] {
        &self.manifest.packages
    }

    /// Compiled packages.
    #[must_use]
    pub fn compiled_packages(&self) -> &[CompiledPackage] {
        &self.manifest.compiled_packages
    }

    /// License.
    #[must_use]
    pub fn license(&self) -> Option<&License> {
        self.manifest.license.as_ref()
    }

    /// True when the release carries no source packages.
    #[must_use]
    pub fn is_compiled(&self) -> bool {
        self.manifest.packages.is_empty()
    }
}
