//! CLI command implementations.
//!
//! - [`merge`] - Merge two compiled releases
//! - [`inspect`] - Summarize release archives

pub mod inspect;
pub mod merge;

pub use inspect::InspectReleasesCommand;
pub use merge::MergeReleasesCommand;

use std::path::{Path, PathBuf};

use bosun_pool::{task, Task, WorkerPool};
use bosun_release::{read_release, Release};
use tracing::debug;

use crate::error::CliError;

/// Reads release archives concurrently, returning them in argument order.
fn read_archives(pool: &WorkerPool, paths: &[PathBuf]) -> Result<Vec<Release>, CliError> {
    debug!(archives = paths.len(), workers = pool.workers(), "reading release archives");

    let tasks: Vec<Task<'_, (usize, Release)>> = paths
        .iter()
        .enumerate()
        .map(|(index, path)| task(move || Ok((index, read_release(path)?))))
        .collect();

    let mut releases = pool.run(tasks)?;
    releases.sort_unstable_by_key(|(index, _)| *index);
    Ok(releases.into_iter().map(|(_, release)| release).collect())
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
pub(crate) mod testing {
    use std::fs;
    use std::path::{Path, PathBuf};

    use bosun_release::{
        sha256_file, write_release, CompiledPackage, Job, Package, Release, ReleaseManifest,
    };

    /// Describes a release archive to build for a test.
    pub(crate) struct ReleaseFixture<'a> {
        pub name: &'a str,
        pub version: &'a str,
        pub jobs: &'a [(&'a str, &'a str)],
        pub compiled_packages: &'a [(&'a str, &'a str)],
        pub source_packages: &'a [&'a str],
    }

    impl ReleaseFixture<'_> {
        /// Writes the release to `dir/file_name` and returns the archive path.
        pub(crate) fn write(&self, dir: &Path, file_name: &str) -> PathBuf {
            let staging = dir.join(format!("{file_name}.staging"));
            fs::create_dir_all(&staging).expect("staging dir");

            let mut manifest = ReleaseManifest::new(self.name, self.version);
            manifest.commit_hash = "abc123".into();
            for (name, fingerprint) in self.jobs {
                let path = staging.join(format!("job-{name}.tgz"));
                fs::write(&path, format!("job {name} {fingerprint}")).expect("job file");
                manifest.jobs.push(
                    Job::new(*name, *fingerprint)
                        .with_digest(sha256_file(&path).expect("hash"))
                        .with_archive(path),
                );
            }
            for (name, fingerprint) in self.compiled_packages {
                let path = staging.join(format!("pkg-{name}.tgz"));
                fs::write(&path, format!("package {name} {fingerprint}")).expect("package file");
                manifest.compiled_packages.push(
                    CompiledPackage::new(*name, *fingerprint, "ubuntu-jammy/1.0")
                        .with_digest(sha256_file(&path).expect("hash"))
                        .with_archive(path),
                );
            }
            for name in self.source_packages {
                let path = staging.join(format!("src-{name}.tgz"));
                fs::write(&path, format!("source {name}")).expect("source file");
                let mut package = Package::new(*name, "src");
                package.digest = sha256_file(&path).expect("hash");
                package.archive_path = path;
                manifest.packages.push(package);
            }

            let dest = dir.join(file_name);
            write_release(&Release::new(manifest), &dest).expect("write release");
            dest
        }
    }
}
