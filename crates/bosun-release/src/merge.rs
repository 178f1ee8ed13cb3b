//! Merging of compiled releases.
//!
//! Two compiled builds of the same release (for example one per stemcell)
//! are combined by taking the union of their jobs and compiled packages.
//! Artifacts are matched by name. A name seen twice must carry the same
//! fingerprint, otherwise the merge is rejected as a whole.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::{ReleaseError, ReleaseResult};
use crate::types::{Artifact, Release, ReleaseManifest};

/// Checks that two releases can be merged.
///
/// # Errors
///
/// Returns [`ReleaseError::NameMismatch`] or [`ReleaseError::VersionMismatch`]
/// when the releases differ in name or version, and
/// [`ReleaseError::SourcePackagesPresent`] when either carries source packages.
pub fn validate(first: &Release, second: &Release) -> ReleaseResult<()> {
    if first.name() != second.name() {
        return Err(ReleaseError::NameMismatch {
            first: first.name().to_string(),
            second: second.name().to_string(),
        });
    }

    if first.version() != second.version() {
        return Err(ReleaseError::VersionMismatch {
            first: first.version().to_string(),
            second: second.version().to_string(),
        });
    }

    for release in [first, second] {
        if !release.is_compiled() {
            return Err(ReleaseError::SourcePackagesPresent {
                release: release.slug(),
                count: release.packages().len(),
            });
        }
    }

    Ok(())
}

/// Merges two artifact lists by name.
///
/// Artifacts from `first` win. Later artifacts with an already seen name are
/// dropped when their fingerprint matches.
///
/// # Errors
///
/// Returns [`ReleaseError::FingerprintConflict`] on the first name whose
/// fingerprints disagree. No partial result is returned.
pub fn merge_artifacts<A: Artifact>(first: &[A], second: &[A]) -> ReleaseResult<Vec<A>> {
    let mut seen: HashMap<&str, &str> = HashMap::with_capacity(first.len() + second.len());
    let mut merged = Vec::with_capacity(first.len());

    for artifact in first.iter().chain(second) {
        match seen.get(artifact.name()) {
            None => {
                seen.insert(artifact.name(), artifact.fingerprint());
                merged.push(artifact.clone());
            }
            Some(&known) if known == artifact.fingerprint() => {
                debug!(kind = %A::KIND, name = artifact.name(), "skipping duplicate artifact");
            }
            Some(&known) => {
                return Err(ReleaseError::fingerprint_conflict(
                    A::KIND,
                    artifact.name(),
                    known,
                    artifact.fingerprint(),
                ));
            }
        }
    }

    Ok(merged)
}

/// Merges two compiled builds of the same release.
///
/// The result carries the first release's name, version, commit and license.
/// Artifacts keep their backing files; nothing is recompressed and no
/// fingerprint is recomputed.
///
/// # Errors
///
/// Fails if [`validate`] or [`merge_artifacts`] fails.
pub fn merge_releases(first: &Release, second: &Release) -> ReleaseResult<Release> {
    validate(first, second)?;

    let jobs = merge_artifacts(first.jobs(), second.jobs())?;
    let compiled_packages = merge_artifacts(first.compiled_packages(), second.compiled_packages())?;

    let source = first.manifest();
    let manifest = ReleaseManifest {
        name: source.name.clone(),
        version: source.version.clone(),
        commit_hash: source.commit_hash.clone(),
        uncommitted_changes: source.uncommitted_changes,
        jobs,
        packages: Vec::new(),
        compiled_packages,
        license: source.license.clone(),
    };

    let storage = first
        .storage()
        .iter()
        .chain(second.storage())
        .cloned()
        .collect();

    info!(
        release = %first.slug(),
        jobs = manifest.jobs.len(),
        compiled_packages = manifest.compiled_packages.len(),
        "merged releases"
    );

    Ok(Release::with_storage(manifest, storage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArtifactKind;
    use crate::types::{CompiledPackage, Job, License, Package};

    fn job(name: &str, fingerprint: &str) -> Job {
        Job::new(name, fingerprint)
    }

    fn compiled(name: &str, fingerprint: &str) -> CompiledPackage {
        CompiledPackage::new(name, fingerprint, "ubuntu-jammy/1.0")
    }

    fn release(name: &str, version: &str) -> Release {
        Release::new(ReleaseManifest::new(name, version))
    }

    mod validate_releases {
        use super::*;
        use test_case::test_case;

        #[test]
        fn accepts_matching_compiled_releases() {
            assert!(validate(&release("capi", "1"), &release("capi", "1")).is_ok());
        }

        #[test]
        fn rejects_different_names() {
            let err = validate(&release("capi", "1"), &release("consul", "1"))
                .expect_err("names differ");
            assert!(matches!(err, ReleaseError::NameMismatch { .. }));
            assert!(err.to_string().contains("conflicting names: capi, consul"));
        }

        #[test]
        fn rejects_different_versions() {
            let err = validate(&release("capi", "1"), &release("capi", "2"))
                .expect_err("versions differ");
            assert!(matches!(err, ReleaseError::VersionMismatch { .. }));
            assert!(err.to_string().contains("conflicting versions: 1, 2"));
        }

        #[test_case(true, false ; "first has source packages")]
        #[test_case(false, true ; "second has source packages")]
        #[test_case(true, true ; "both have source packages")]
        fn rejects_source_packages(first_source: bool, second_source: bool) {
            let with_source = |source: bool| {
                let mut manifest = ReleaseManifest::new("capi", "1");
                if source {
                    manifest.packages.push(Package::new("ruby", "fp"));
                }
                Release::new(manifest)
            };

            let err = validate(&with_source(first_source), &with_source(second_source))
                .expect_err("source packages present");
            assert!(matches!(err, ReleaseError::SourcePackagesPresent { .. }));
            assert!(err.to_string().contains("Only compiled releases can be specified"));
        }
    }

    mod merge_artifact_lists {
        use super::*;

        #[test]
        fn self_merge_collapses_duplicates() {
            let jobs = vec![job("api", "1"), job("worker", "2"), job("clock", "3")];
            let merged = merge_artifacts(&jobs, &jobs).expect("identical lists merge");
            assert_eq!(merged, jobs);
        }

        #[test]
        fn conflicting_fingerprints_fail() {
            let err = merge_artifacts(&[job("x", "1")], &[job("x", "2")])
                .expect_err("fingerprints differ");
            match &err {
                ReleaseError::FingerprintConflict {
                    kind,
                    name,
                    first,
                    second,
                } => {
                    assert_eq!(*kind, ArtifactKind::Job);
                    assert_eq!(name, "x");
                    assert_eq!(first, "1");
                    assert_eq!(second, "2");
                }
                other => panic!("expected fingerprint conflict, got {other:?}"),
            }
            assert_eq!(err.to_string(), "Job x has conflicting fingerprints (1, 2)");
        }

        #[test]
        fn first_seen_wins() {
            let first = vec![job("x", "1").with_archive("/first/x.tgz")];
            let second = vec![job("x", "1").with_archive("/second/x.tgz"), job("y", "2")];

            let merged = merge_artifacts(&first, &second).expect("fingerprints agree");
            let summary: Vec<(&str, &str)> = merged
                .iter()
                .map(|j| (j.name.as_str(), j.fingerprint.as_str()))
                .collect();
            assert_eq!(summary, vec![("x", "1"), ("y", "2")]);
            assert_eq!(merged[0].archive_path, std::path::Path::new("/first/x.tgz"));
        }

        #[test]
        fn conflict_inside_first_list_is_detected() {
            let err = merge_artifacts(&[compiled("ruby", "a"), compiled("ruby", "b")], &[])
                .expect_err("duplicate name with different fingerprint");
            assert_eq!(
                err.to_string(),
                "Compiled package ruby has conflicting fingerprints (a, b)"
            );
        }

        #[test]
        fn empty_inputs_merge_to_empty() {
            let merged = merge_artifacts::<Job>(&[], &[]).expect("nothing to merge");
            assert!(merged.is_empty());
        }
    }

    mod merge_whole_releases {
        use super::*;

        fn compiled_release(jobs: Vec<Job>, packages: Vec<CompiledPackage>) -> Release {
            let mut manifest = ReleaseManifest::new("capi", "1.2");
            manifest.jobs = jobs;
            manifest.compiled_packages = packages;
            Release::new(manifest)
        }

        #[test]
        fn unions_jobs_and_compiled_packages() {
            let mut manifest = ReleaseManifest::new("capi", "1.2");
            manifest.commit_hash = "abc123".into();
            manifest.jobs = vec![job("api", "j1")];
            manifest.compiled_packages = vec![compiled("ruby", "p1"), compiled("nginx", "p2")];
            manifest.license = Some(License {
                version: "l1".into(),
                fingerprint: "l1".into(),
                digest: "sha256:00".into(),
                archive_path: "/first/license.tgz".into(),
            });
            let first = Release::new(manifest);
            let second = compiled_release(
                vec![job("api", "j1"), job("worker", "j2")],
                vec![compiled("ruby", "p1"), compiled("golang", "p3")],
            );

            let merged = merge_releases(&first, &second).expect("releases merge");
            assert_eq!(merged.name(), "capi");
            assert_eq!(merged.version(), "1.2");
            assert_eq!(merged.manifest().commit_hash, "abc123");
            assert_eq!(merged.jobs().len(), 2);
            let names: Vec<&str> = merged.compiled_packages().iter().map(|p| p.name.as_str()).collect();
            assert_eq!(names, vec!["ruby", "nginx", "golang"]);
            assert_eq!(
                merged.license().map(|l| l.archive_path.as_path()),
                Some(std::path::Path::new("/first/license.tgz"))
            );
        }

        #[test]
        fn inputs_are_left_untouched() {
            let first = compiled_release(vec![job("api", "j1")], vec![]);
            let second = compiled_release(vec![job("worker", "j2")], vec![]);

            let _ = merge_releases(&first, &second).expect("releases merge");
            assert_eq!(first.jobs().len(), 1);
            assert_eq!(second.jobs().len(), 1);
        }

        #[test]
        fn job_conflict_aborts_merge() {
            let first = compiled_release(vec![job("api", "j1")], vec![]);
            let second = compiled_release(vec![job("api", "j9")], vec![]);

            let err = merge_releases(&first, &second).expect_err("job conflict");
            assert!(matches!(
                err,
                ReleaseError::FingerprintConflict {
                    kind: ArtifactKind::Job,
                    ..
                }
            ));
        }

        #[test]
        fn compiled_package_conflict_aborts_merge() {
            let first = compiled_release(vec![], vec![compiled("ruby", "p1")]);
            let second = compiled_release(vec![], vec![compiled("ruby", "p2")]);

            let err = merge_releases(&first, &second).expect_err("package conflict");
            assert!(err.to_string().contains("ruby has conflicting fingerprints (p1, p2)"));
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn unique_jobs() -> impl Strategy<Value = Vec<Job>> {
            prop::collection::btree_map("[a-z]{1,8}", "[0-9a-f]{8}", 0..20).prop_map(|entries| {
                entries
                    .into_iter()
                    .map(|(name, fingerprint)| Job::new(name, fingerprint))
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn merging_with_itself_is_identity(jobs in unique_jobs()) {
                let merged = merge_artifacts(&jobs, &jobs).expect("self merge");
                prop_assert_eq!(merged, jobs);
            }

            #[test]
            fn merged_names_are_unique(first in unique_jobs(), second in unique_jobs()) {
                if let Ok(merged) = merge_artifacts(&first, &second) {
                    let mut names: Vec<&str> = merged.iter().map(|j| j.name.as_str()).collect();
                    let total = names.len();
                    names.sort_unstable();
                    names.dedup();
                    prop_assert_eq!(names.len(), total);
                }
            }
        }
    }
}
