//! Uploading the releases a deployment references.
//!
//! Releases that carry a `url` are checked against the director and uploaded
//! when missing. Director calls run on a [`WorkerPool`] so slow uploads
//! overlap.
//!
//! This module is for embedding. The director client is whatever
//! [`ReleaseDirector`] implementation the host program passes in.

use anyhow::Context;
use bosun_pool::{task, AggregateError, PoolResult, Task, WorkerPool};
use tracing::{debug, info};

use crate::manifest::{DeploymentManifest, ReleaseRef, StemcellRef};

/// Release operations the director exposes.
pub trait ReleaseDirector: Send + Sync {
    /// Whether the director already has `name/version`, optionally compiled
    /// against `stemcell`.
    ///
    /// # Errors
    ///
    /// Returns an error if the director cannot be queried.
    fn has_release(
        &self,
        name: &str,
        version: &str,
        stemcell: Option<&StemcellRef>,
    ) -> anyhow::Result<bool>;

    /// Asks the director to fetch and import a release from its URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails.
    fn upload_release(&self, release: &ReleaseRef) -> anyhow::Result<()>;
}

/// What happened to one referenced release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadAction {
    /// The release was uploaded.
    Uploaded,
    /// The director already had the release.
    AlreadyPresent,
    /// The reference has no URL; the release must already be on the director.
    NoSource,
}

/// Outcome for one referenced release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// `name/version`
    pub release: String,
    /// What was done
    pub action: UploadAction,
}

/// Uploads the releases of a deployment in parallel.
#[derive(Debug)]
pub struct ReleaseManager<D> {
    director: D,
    pool: WorkerPool,
}

impl<D: ReleaseDirector> ReleaseManager<D> {
    /// Creates a manager that runs up to `parallel` director calls at once.
    ///
    /// # Errors
    ///
    /// Returns an error if `parallel` is zero.
    pub fn new(director: D, parallel: usize) -> PoolResult<Self> {
        Ok(Self {
            director,
            pool: WorkerPool::new(parallel)?,
        })
    }

    /// The director this manager talks to.
    pub fn director(&self) -> &D {
        &self.director
    }

    /// Uploads every release in `manifest` that has a URL and is not yet on
    /// the director.
    ///
    /// Outcomes for releases without a URL come first; the rest follow in
    /// completion order.
    ///
    /// # Errors
    ///
    /// Returns every director failure folded into one [`AggregateError`].
    pub fn upload_releases(
        &self,
        manifest: &DeploymentManifest,
    ) -> Result<Vec<UploadOutcome>, AggregateError> {
        let mut outcomes = Vec::with_capacity(manifest.releases.len());
        let mut tasks: Vec<Task<'_, UploadOutcome>> = Vec::new();

        for release in &manifest.releases {
            if release.url.is_none() {
                debug!(release = %release.slug(), "no url, expecting release on director");
                outcomes.push(UploadOutcome {
                    release: release.slug(),
                    action: UploadAction::NoSource,
                });
                continue;
            }

            let director = &self.director;
            tasks.push(task(move || upload_one(director, release)));
        }

        outcomes.extend(self.pool.run(tasks)?);
        Ok(outcomes)
    }
}

fn upload_one<D: ReleaseDirector>(director: &D, release: &ReleaseRef) -> anyhow::Result<UploadOutcome> {
    let slug = release.slug();

    if release.has_pinned_version() {
        let present = director
            .has_release(&release.name, &release.version, release.stemcell.as_ref())
            .with_context(|| format!("checking release {slug}"))?;
        if present {
            debug!(release = %slug, "release already on director");
            return Ok(UploadOutcome {
                release: slug,
                action: UploadAction::AlreadyPresent,
            });
        }
    }

    director
        .upload_release(release)
        .with_context(|| format!("uploading release {slug}"))?;
    info!(release = %slug, "uploaded release");

    Ok(UploadOutcome {
        release: slug,
        action: UploadAction::Uploaded,
    })
}
