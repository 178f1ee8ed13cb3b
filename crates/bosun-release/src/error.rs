//! Error types for release handling.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for release operations.
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// The class of artifact a fingerprint conflict was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// A release job.
    Job,
    /// A package compiled against a stemcell.
    CompiledPackage,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Job => write!(f, "Job"),
            Self::CompiledPackage => write!(f, "Compiled package"),
        }
    }
}

/// Errors that can occur while reading, merging or writing releases.
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// The two releases do not share a name.
    #[error("Expected releases to have the same name, got conflicting names: {first}, {second}")]
    NameMismatch {
        /// Name of the first release
        first: String,
        /// Name of the second release
        second: String,
    },

    /// The two releases do not share a version.
    #[error(
        "Expected releases to have the same version, got conflicting versions: {first}, {second}"
    )]
    VersionMismatch {
        /// Version of the first release
        first: String,
        /// Version of the second release
        second: String,
    },

    /// A release carries source packages.
    #[error("Only compiled releases can be specified, release {release} has {count} source package(s)")]
    SourcePackagesPresent {
        /// Release name and version
        release: String,
        /// Number of source packages found
        count: usize,
    },

    /// Two artifacts share a name but not a fingerprint.
    #[error("{kind} {name} has conflicting fingerprints ({first}, {second})")]
    FingerprintConflict {
        /// Artifact class
        kind: ArtifactKind,
        /// Artifact name
        name: String,
        /// Fingerprint seen first
        first: String,
        /// Conflicting fingerprint
        second: String,
    },

    /// `release.MF` is malformed.
    #[error("invalid release manifest {}: {source}", .path.display())]
    Manifest {
        /// Manifest location
        path: PathBuf,
        /// Parse failure
        #[source]
        source: serde_yaml::Error,
    },

    /// A deployment manifest is malformed.
    #[error("invalid deployment manifest: {0}")]
    DeploymentManifest(#[source] serde_yaml::Error),

    /// An artifact name that cannot be mapped to a file inside the archive.
    #[error("invalid artifact name: {0:?}")]
    InvalidArtifactName(String),

    /// The manifest lists an artifact the archive does not contain.
    #[error("release archive is missing {}", .0.display())]
    MissingArtifact(PathBuf),

    /// An artifact entry is a link or directory, or resolves outside the
    /// unpacked archive.
    #[error("release archive entry {} is not a regular file", .0.display())]
    NotRegularFile(PathBuf),

    /// An artifact's content does not match its recorded digest.
    #[error("digest mismatch for {}: expected {expected}, got {actual}", .path.display())]
    DigestMismatch {
        /// Artifact location
        path: PathBuf,
        /// Digest recorded in the manifest
        expected: String,
        /// Digest of the file on disk
        actual: String,
    },

    /// Refusing to overwrite an existing file.
    #[error("output {} already exists", .0.display())]
    OutputExists(PathBuf),

    /// Filesystem or archive I/O failure.
    #[error("{context} {}: {source}", .path.display())]
    Io {
        /// What was being done
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl ReleaseError {
    /// Creates an I/O error with context.
    #[must_use]
    pub fn io(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }

    /// Creates a fingerprint conflict error.
    #[must_use]
    pub fn fingerprint_conflict(
        kind: ArtifactKind,
        name: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Self::FingerprintConflict {
            kind,
            name: name.into(),
            first: first.into(),
            second: second.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = ReleaseError::NameMismatch {
            first: "capi".into(),
            second: "consul".into(),
        };
        assert!(err.to_string().contains("conflicting names: capi, consul"));

        let err = ReleaseError::VersionMismatch {
            first: "1".into(),
            second: "2".into(),
        };
        assert!(err.to_string().contains("conflicting versions: 1, 2"));

        let err = ReleaseError::fingerprint_conflict(ArtifactKind::Job, "x", "fp1", "fp2");
        assert_eq!(err.to_string(), "Job x has conflicting fingerprints (fp1, fp2)");
    }

    #[test]
    fn compiled_package_kind_display() {
        let err = ReleaseError::fingerprint_conflict(ArtifactKind::CompiledPackage, "ruby", "a", "b");
        assert_eq!(
            err.to_string(),
            "Compiled package ruby has conflicting fingerprints (a, b)"
        );
    }

    #[test]
    fn io_helper_keeps_context() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ReleaseError::io("opening release archive", "/tmp/capi.tgz", source);
        assert_eq!(
            err.to_string(),
            "opening release archive /tmp/capi.tgz: no such file"
        );
    }
}
