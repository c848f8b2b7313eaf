//! Benchmarks for spectral transforms, dealiased Jacobians and tendencies.
//!
//! Run with: `cargo bench --bench tendency_bench`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use mqg_rs::config::ModelConfig;
use mqg_rs::grid::GridSpec;
use mqg_rs::initial::initial_state;
use mqg_rs::physics::PhysicalParameters;
use mqg_rs::solver::{ModelState, TendencyEngine};
use mqg_rs::spectral::{SpectralOperators, SpectralTransform};
use ndarray::s;

/// Setup a seeded moist state on an `n × n` grid.
fn setup_problem(n: usize) -> (TendencyEngine, ModelState) {
    let config = ModelConfig::default().with_grid(n, n).with_noise(0.01, 1);
    let grid = GridSpec::from_config(&config.grid).unwrap();
    let params = PhysicalParameters::from_config(&config, &grid).unwrap();
    let state = initial_state(&config.initial, &params, &grid);
    (TendencyEngine::new(params, SpectralOperators::new(grid)), state)
}

/// Benchmark native-size forward and inverse transforms.
fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");

    for n in [64, 128, 256] {
        let (engine, state) = setup_problem(n);
        let ops = engine.operators();
        let spectrum = state.psi.slice(s![0, .., ..]).to_owned();
        let physical = ops.to_physical(&spectrum);

        group.bench_with_input(BenchmarkId::new("forward", n), &n, |b, _| {
            b.iter(|| ops.native.forward(black_box(&physical)))
        });
        group.bench_with_input(BenchmarkId::new("inverse", n), &n, |b, _| {
            b.iter(|| ops.native.inverse(black_box(&spectrum)))
        });
    }

    group.finish();
}

/// Benchmark single and double dealiased Jacobians.
fn bench_jacobian(c: &mut Criterion) {
    let mut group = c.benchmark_group("jacobian");

    for n in [64, 128, 256] {
        let (engine, state) = setup_problem(n);
        let ops = engine.operators();
        let psi = state.psi.slice(s![1, .., ..]).to_owned();
        let q = state.pv.slice(s![1, .., ..]).to_owned();
        let qm = state.pv.slice(s![2, .., ..]).to_owned();

        group.bench_with_input(BenchmarkId::new("single", n), &n, |b, _| {
            b.iter(|| ops.jacobian(black_box(&psi), black_box(&q)))
        });
        group.bench_with_input(BenchmarkId::new("double", n), &n, |b, _| {
            b.iter(|| ops.double_jacobian(black_box(&psi), black_box(&q), black_box(&qm)))
        });
    }

    group.finish();
}

/// Benchmark the full tendency including precipitation.
fn bench_tendency(c: &mut Criterion) {
    let mut group = c.benchmark_group("tendency");
    group.sample_size(30);

    for n in [64, 128] {
        let (engine, state) = setup_problem(n);
        group.bench_with_input(BenchmarkId::new("precipitation_relaxation", n), &n, |b, _| {
            b.iter(|| engine.compute(black_box(&state)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_transform, bench_jacobian, bench_tendency);
criterion_main!(benches);
