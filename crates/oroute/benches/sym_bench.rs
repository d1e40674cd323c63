//! Criterion microbenches for symmetry detection and LP assembly.
//!
//! - Orbit-partition detection on rings and 2D tori of growing size.
//! - Reduced vs full LP assembly on a ring.
//!
//! Results live under `target/criterion`.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use oroute::formulate::formulate;
use oroute::sym::{OrbitPartition, SymCfg};
use oroute::topo::gen;

fn bench_detect(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect");
    let cfg = SymCfg::default();
    for n in [6usize, 10, 16] {
        let topo = gen::ring(n, 1, 1.0);
        group.bench_function(BenchmarkId::new("ring", n), |b| {
            b.iter(|| OrbitPartition::detect(&topo, &cfg))
        });
    }
    for (rows, cols) in [(3usize, 3usize), (4, 4)] {
        let topo = gen::torus2d(rows, cols, 1, 1.0);
        group.bench_function(BenchmarkId::new("torus", rows * cols), |b| {
            b.iter(|| OrbitPartition::detect(&topo, &cfg))
        });
    }
    group.finish();
}

fn bench_formulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("formulate");
    let topo = gen::ring(10, 1, 1.0);
    let reduced = OrbitPartition::detect(&topo, &SymCfg::default());
    let full = OrbitPartition::trivial(&topo);
    group.bench_function("ring10_reduced", |b| b.iter(|| formulate(&topo, &reduced)));
    group.bench_function("ring10_full", |b| b.iter(|| formulate(&topo, &full)));
    group.finish();
}

criterion_group!(benches, bench_detect, bench_formulate);
criterion_main!(benches);
