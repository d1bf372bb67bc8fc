use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use groupnest::config::{GroupnestConfig, ParallelConfig};
use groupnest::{scan_directory, InMemoryDirectory};
use std::hint::black_box;

/// A balanced tree of groups `fanout` wide and `levels` deep, with every
/// leaf pointing back at the root so every branch ends in a cycle.
fn build_tree(fanout: usize, levels: usize) -> InMemoryDirectory {
    let mut directory = InMemoryDirectory::new().with_group("G");
    let mut frontier = vec!["G".to_string()];
    for _ in 0..levels {
        let mut next = Vec::with_capacity(frontier.len() * fanout);
        for parent in &frontier {
            for i in 0..fanout {
                let child = format!("{parent}.{i}");
                directory = directory.with_child(parent, &child).with_group(&child);
                next.push(child);
            }
        }
        frontier = next;
    }
    frontier
        .iter()
        .fold(directory, |dir, leaf| dir.with_child(leaf, "G"))
}

fn config(parallel: ParallelConfig) -> GroupnestConfig {
    GroupnestConfig {
        max_depth: 8,
        parallel,
        ..Default::default()
    }
}

fn bench_scan_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("nesting_scan");

    for &(fanout, levels) in &[(3usize, 3usize), (4, 4)] {
        let directory = build_tree(fanout, levels);
        let label = format!("{fanout}x{levels}");

        group.bench_with_input(
            BenchmarkId::new("sequential", &label),
            &directory,
            |b, directory| {
                let config = config(ParallelConfig::sequential());
                b.iter(|| scan_directory(black_box(directory), &config))
            },
        );

        group.bench_with_input(
            BenchmarkId::new("parallel_roots", &label),
            &directory,
            |b, directory| {
                let config = config(ParallelConfig::default());
                b.iter(|| scan_directory(black_box(directory), &config))
            },
        );

        group.bench_with_input(
            BenchmarkId::new("parallel_branches", &label),
            &directory,
            |b, directory| {
                let config = config(ParallelConfig {
                    parallel_branches: true,
                    ..ParallelConfig::default()
                });
                b.iter(|| scan_directory(black_box(directory), &config))
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_scan_modes);
criterion_main!(benches);
