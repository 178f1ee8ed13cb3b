//! # bosun-release
//!
//! Release handling for the bosun director CLI.
//!
//! ## Features
//!
//! - **Release archives**: read and write `.tgz` release bundles
//! - **Fingerprint merging**: combine two compiled builds of one release,
//!   rejecting artifacts whose fingerprints disagree
//! - **Release upload**: push the releases a deployment references to the
//!   director in parallel
//!
//! The `bosun` binary uses the archive and merge APIs. [`ReleaseManager`],
//! [`ReleaseDirector`] and [`DeploymentManifest`] are an embedding API with
//! no command of their own: a host program supplies the director client by
//! implementing [`ReleaseDirector`].
//!
//! ## Example
//!
//! ```rust
//! use bosun_release::{merge_artifacts, Job};
//!
//! let first = vec![Job::new("api", "1")];
//! let second = vec![Job::new("api", "1"), Job::new("worker", "2")];
//!
//! let merged = merge_artifacts(&first, &second).expect("fingerprints agree");
//! assert_eq!(merged.len(), 2);
//!
//! let conflict = merge_artifacts(&first, &[Job::new("api", "9")]);
//! assert!(conflict.is_err());
//! ```
//!
//! ## Modules
//!
//! - [`types`]: release, job and package model
//! - [`merge`]: release validation and fingerprint merging
//! - [`archive`]: release archive reader and writer
//! - [`digest`]: artifact digests
//! - [`manifest`]: deployment manifest release references
//! - [`manager`]: parallel release upload
//! - [`error`]: error types

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
pub mod digest;
pub mod error;
pub mod manager;
pub mod manifest;
pub mod merge;
pub mod types;

pub use archive::{read_release, write_release};
pub use digest::{sha256_file, verify_digest};
pub use error::{ArtifactKind, ReleaseError, ReleaseResult};
pub use manager::{ReleaseDirector, ReleaseManager, UploadAction, UploadOutcome};
pub use manifest::{DeploymentManifest, ReleaseRef, StemcellRef};
pub use merge::{merge_artifacts, merge_releases, validate};
pub use types::{
    Artifact, Bundled, CompiledPackage, Job, License, Package, Release, ReleaseManifest,
    MANIFEST_FILE,
};
