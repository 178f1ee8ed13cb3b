//! Benchmarks for bosun-release.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bosun_release::{merge_artifacts, CompiledPackage, Job};

fn jobs(prefix: &str, count: usize) -> Vec<Job> {
    (0..count)
        .map(|i| Job::new(format!("{prefix}-{i}"), format!("fp-{i}")))
        .collect()
}

fn benchmark_merge_disjoint_jobs(c: &mut Criterion) {
    let first = jobs("api", 500);
    let second = jobs("worker", 500);

    c.bench_function("merge_1k_disjoint_jobs", |b| {
        b.iter(|| merge_artifacts(black_box(&first), black_box(&second)));
    });
}

fn benchmark_merge_overlapping_packages(c: &mut Criterion) {
    // Two stemcell builds share most of their packages.
    let first: Vec<CompiledPackage> = (0..1000)
        .map(|i| CompiledPackage::new(format!("pkg-{i}"), format!("fp-{i}"), "ubuntu-jammy/1.0"))
        .collect();
    let second: Vec<CompiledPackage> = (100..1100)
        .map(|i| CompiledPackage::new(format!("pkg-{i}"), format!("fp-{i}"), "ubuntu-noble/1.0"))
        .collect();

    c.bench_function("merge_1k_overlapping_packages", |b| {
        b.iter(|| merge_artifacts(black_box(&first), black_box(&second)));
    });
}

criterion_group!(
    benches,
    benchmark_merge_disjoint_jobs,
    benchmark_merge_overlapping_packages
);
criterion_main!(benches);
