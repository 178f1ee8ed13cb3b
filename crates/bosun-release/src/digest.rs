//! Content digests for release artifacts.
//!
//! Digests are written as `sha256:<hex>`. Manifests produced by older tooling
//! may carry bare SHA-1 values, which are accepted but not verified.

use std::fs::File;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{ReleaseError, ReleaseResult};

const SHA256_PREFIX: &str = "sha256:";

/// Computes the `sha256:<hex>` digest of a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn sha256_file(path: &Path) -> ReleaseResult<String> {
    let mut file = File::open(path).map_err(|e| ReleaseError::io("opening", path, e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|e| ReleaseError::io("hashing", path, e))?;
    Ok(format!("{SHA256_PREFIX}{}", hex::encode(hasher.finalize())))
}

/// Checks a file against a recorded digest.
///
/// Only `sha256:` digests are verified; anything else is skipped.
///
/// # Errors
///
/// Returns [`ReleaseError::DigestMismatch`] if the file does not match, or an
/// I/O error if it cannot be read.
pub fn verify_digest(path: &Path, expected: &str) -> ReleaseResult<()> {
    if !expected.starts_with(SHA256_PREFIX) {
        debug!(path = %path.display(), digest = expected, "skipping unverifiable digest");
        return Ok(());
    }

    let actual = sha256_file(path)?;
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(ReleaseError::DigestMismatch {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        })
    }
}
