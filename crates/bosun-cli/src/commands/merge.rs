//! Merge-releases command implementation.
//!
//! Combines two compiled builds of one release into a single archive.

use std::io::Write;

use bosun_pool::WorkerPool;
use bosun_release::{merge_releases, write_release};
use tracing::info;

use super::{display_path, read_archives};
use crate::cli::MergeReleasesArgs;
use crate::error::CliError;
use crate::output::{MergeSummary, OutputFormat};

/// Handler for the merge-releases command.
pub struct MergeReleasesCommand {
    pool: WorkerPool,
}

impl MergeReleasesCommand {
    /// Creates a merge-releases handler that reads archives with `parallel`
    /// workers.
    ///
    /// # Errors
    ///
    /// Returns an error if `parallel` is zero.
    pub fn new(parallel: usize) -> Result<Self, CliError> {
        Ok(Self {
            pool: WorkerPool::new(parallel)?,
        })
    }

    /// Executes the merge-releases command.
    ///
    /// Nothing is written when either archive cannot be read or the releases
    /// do not merge cleanly.
    ///
    /// # Errors
    ///
    /// Returns error if the command fails.
    pub fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &MergeReleasesArgs,
    ) -> Result<(), CliError> {
        let mut releases =
            read_archives(&self.pool, &[args.first.clone(), args.second.clone()])?.into_iter();
        let (Some(first), Some(second)) = (releases.next(), releases.next()) else {
            return Err(CliError::Command("expected two release archives".into()));
        };

        let merged = merge_releases(&first, &second)?;
        drop((first, second));

        write_release(&merged, &args.output)?;
        info!(output = %args.output.display(), release = %merged.slug(), "merged release written");

        let summary = MergeSummary {
            name: merged.name().to_string(),
            version: merged.version().to_string(),
            commit_hash: merged.commit_hash_with_mark(),
            jobs: merged.jobs().len(),
            compiled_packages: merged.compiled_packages().len(),
            license: merged.license().is_some(),
            output: display_path(&args.output),
        };
        format.write(out, &summary)?;
        Ok(())
    }
}
