//! Inspect-releases command implementation.

use std::io::Write;

use bosun_pool::WorkerPool;

use super::{display_path, read_archives};
use crate::cli::InspectReleasesArgs;
use crate::error::CliError;
use crate::output::{OutputFormat, ReleaseList, ReleaseSummary};

/// Handler for the inspect-releases command.
pub struct InspectReleasesCommand {
    pool: WorkerPool,
}

impl InspectReleasesCommand {
    /// Creates an inspect-releases handler that reads archives with
    /// `parallel` workers.
    ///
    /// # Errors
    ///
    /// Returns an error if `parallel` is zero.
    pub fn new(parallel: usize) -> Result<Self, CliError> {
        Ok(Self {
            pool: WorkerPool::new(parallel)?,
        })
    }

    /// Executes the inspect-releases command.
    ///
    /// # Errors
    ///
    /// Returns error if any archive cannot be read.
    pub fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &InspectReleasesArgs,
    ) -> Result<(), CliError> {
        let releases = read_archives(&self.pool, &args.archives)?;

        let mut summaries: Vec<ReleaseSummary> = args
            .archives
            .iter()
            .zip(&releases)
            .map(|(path, release)| ReleaseSummary {
                path: display_path(path),
                name: release.name().to_string(),
                version: release.version().to_string(),
                commit_hash: release.commit_hash_with_mark(),
                jobs: release.jobs().len(),
                packages: release.packages().len(),
                compiled_packages: release.compiled_packages().len(),
                license: release.license().is_some(),
            })
            .collect();
        summaries.sort_by(|a, b| a.path.cmp(&b.path));

        format.write(out, &ReleaseList { releases: summaries })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Format;
    use crate::commands::testing::ReleaseFixture;

    #[test]
    fn summarizes_archives_sorted_by_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let compiled = ReleaseFixture {
            name: "capi",
            version: "1.2",
            jobs: &[("api", "j1"), ("worker", "j2")],
            compiled_packages: &[("ruby", "p1")],
            source_packages: &[],
        }
        .write(dir.path(), "b-capi.tgz");
        let source = ReleaseFixture {
            name: "consul",
            version: "9",
            jobs: &[("agent", "j3")],
            compiled_packages: &[],
            source_packages: &["consul"],
        }
        .write(dir.path(), "a-consul.tgz");

        let args = InspectReleasesArgs {
            archives: vec![compiled, source],
        };
        let mut out = Vec::new();
        InspectReleasesCommand::new(2)
            .expect("command")
            .execute(&mut out, &OutputFormat::new(Format::Json), &args)
            .expect("inspect succeeds");

        let parsed: serde_json::Value = serde_json::from_slice(&out).expect("valid json");
        let releases = parsed["releases"].as_array().expect("array");
        assert_eq!(releases.len(), 2);
        assert_eq!(releases[0]["name"], "consul");
        assert_eq!(releases[0]["packages"], 1);
        assert_eq!(releases[1]["name"], "capi");
        assert_eq!(releases[1]["jobs"], 2);
        assert_eq!(releases[1]["compiled_packages"], 1);
        assert_eq!(releases[1]["commit_hash"], "abc123");
    }

    #[test]
    fn table_output_lists_each_archive() {
        let dir = tempfile::tempdir().expect("tempdir");
        let archive = ReleaseFixture {
            name: "capi",
            version: "1.2",
            jobs: &[("api", "j1")],
            compiled_packages: &[],
            source_packages: &[],
        }
        .write(dir.path(), "capi.tgz");

        let args = InspectReleasesArgs {
            archives: vec![archive],
        };
        let mut out = Vec::new();
        InspectReleasesCommand::new(1)
            .expect("command")
            .execute(&mut out, &OutputFormat::default(), &args)
            .expect("inspect succeeds");

        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("capi"));
        assert!(text.contains("Total: 1 release(s)"));
    }

    #[test]
    fn missing_archive_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let args = InspectReleasesArgs {
            archives: vec![dir.path().join("missing.tgz")],
        };
        let err = InspectReleasesCommand::new(1)
            .expect("command")
            .execute(&mut Vec::new(), &OutputFormat::default(), &args)
            .expect_err("missing archive");
        assert!(matches!(err, CliError::Tasks(_)));
    }
}
