//! Reading and writing release archives.
//!
//! A release archive is a gzip-compressed tarball:
//!
//! ```text
//! release.MF
//! jobs/<name>.tgz
//! packages/<name>.tgz
//! compiled_packages/<name>.tgz
//! license.tgz
//! ```
//!
//! Reading unpacks the archive into a private temporary directory owned by
//! the returned [`Release`]. Writing streams `release.MF` and every backing
//! file into a new archive.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::digest::verify_digest;
use crate::error::{ReleaseError, ReleaseResult};
use crate::types::{Bundled, Release, ReleaseManifest, MANIFEST_FILE};

/// Reads a release archive.
///
/// Every artifact listed in `release.MF` must be present, and `sha256:`
/// digests are verified.
///
/// # Errors
///
/// Returns an error if the archive cannot be unpacked, the manifest is
/// malformed, an artifact is missing, or a digest does not match.
pub fn read_release(path: &Path) -> ReleaseResult<Release> {
    debug!(path = %path.display(), "reading release archive");

    let file = File::open(path).map_err(|e| ReleaseError::io("opening release archive", path, e))?;
    let dir = tempfile::Builder::new()
        .prefix("bosun-release-")
        .tempdir()
        .map_err(|e| ReleaseError::io("creating scratch directory for", path, e))?;

    tar::Archive::new(GzDecoder::new(BufReader::new(file)))
        .unpack(dir.path())
        .map_err(|e| ReleaseError::io("unpacking release archive", path, e))?;

    let manifest_path = dir.path().join(MANIFEST_FILE);
    let raw = fs::read_to_string(&manifest_path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ReleaseError::MissingArtifact(PathBuf::from(MANIFEST_FILE)),
        _ => ReleaseError::io("reading", manifest_path.clone(), e),
    })?;
    let mut manifest: ReleaseManifest =
        serde_yaml::from_str(&raw).map_err(|source| ReleaseError::Manifest {
            path: path.to_path_buf(),
            source,
        })?;

    attach(dir.path(), &mut manifest.jobs)?;
    attach(dir.path(), &mut manifest.packages)?;
    attach(dir.path(), &mut manifest.compiled_packages)?;
    if let Some(license) = manifest.license.as_mut() {
        attach(dir.path(), std::slice::from_mut(license))?;
    }

    info!(
        release = %format!("{}/{}", manifest.name, manifest.version),
        jobs = manifest.jobs.len(),
        packages = manifest.packages.len(),
        compiled_packages = manifest.compiled_packages.len(),
        "read release archive"
    );

    Ok(Release::with_storage(manifest, vec![Arc::new(dir)]))
}

/// Writes a release archive to `dest`.
///
/// The archive is assembled in a temporary file next to `dest` and moved into
/// place once complete.
///
/// # Errors
///
/// Returns [`ReleaseError::OutputExists`] if `dest` exists, or an I/O error if
/// a backing file cannot be read or the archive cannot be written.
pub fn write_release(release: &Release, dest: &Path) -> ReleaseResult<()> {
    if dest.exists() {
        return Err(ReleaseError::OutputExists(dest.to_path_buf()));
    }

    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = NamedTempFile::new_in(parent)
        .map_err(|e| ReleaseError::io("creating temporary file in", parent, e))?;

    {
        let encoder = GzEncoder::new(tmp.as_file(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder.follow_symlinks(false);

        let manifest = serde_yaml::to_string(release.manifest()).map_err(|source| {
            ReleaseError::Manifest {
                path: dest.to_path_buf(),
                source,
            }
        })?;
        let mut header = tar::Header::new_gnu();
        header.set_size(manifest.len() as u64);
        header.set_mode(0o644);
        builder
            .append_data(&mut header, MANIFEST_FILE, manifest.as_bytes())
            .map_err(|e| ReleaseError::io("writing", dest, e))?;

        for job in release.jobs() {
            append(&mut builder, job)?;
        }
        for package in release.packages() {
            append(&mut builder, package)?;
        }
        for package in release.compiled_packages() {
            append(&mut builder, package)?;
        }
        if let Some(license) = release.license() {
            append(&mut builder, license)?;
        }

        builder
            .into_inner()
            .and_then(GzEncoder::finish)
            .map_err(|e| ReleaseError::io("finishing", dest, e))?;
    }

    tmp.persist_noclobber(dest)
        .map_err(|e| ReleaseError::io("persisting", dest, e.error))?;

    info!(release = %release.slug(), output = %dest.display(), "wrote release archive");
    Ok(())
}

fn attach<B: Bundled>(root: &Path, items: &mut [B]) -> ReleaseResult<()> {
    let base = root
        .canonicalize()
        .map_err(|e| ReleaseError::io("resolving", root, e))?;

    for item in items {
        let entry = item.entry_path();
        if !is_plain_relative(&entry) {
            return Err(ReleaseError::InvalidArtifactName(entry.display().to_string()));
        }

        let full = base.join(&entry);
        let metadata = match fs::symlink_metadata(&full) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ReleaseError::MissingArtifact(entry));
            }
            Err(e) => return Err(ReleaseError::io("inspecting", full, e)),
        };
        if !metadata.file_type().is_file() {
            return Err(ReleaseError::NotRegularFile(entry));
        }

        // A linked parent directory can still point outside the archive.
        let resolved = full
            .canonicalize()
            .map_err(|e| ReleaseError::io("resolving", full.clone(), e))?;
        if !resolved.starts_with(&base) {
            return Err(ReleaseError::NotRegularFile(entry));
        }

        verify_digest(&resolved, item.digest())?;
        item.set_archive_path(resolved);
    }
    Ok(())
}

fn append<W: io::Write, B: Bundled>(builder: &mut tar::Builder<W>, item: &B) -> ReleaseResult<()> {
    builder
        .append_path_with_name(item.archive_path(), item.entry_path())
        .map_err(|e| ReleaseError::io("adding", item.archive_path(), e))
}

/// True when `path` only walks down into the archive.
fn is_plain_relative(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_)))
}
