//! Benchmark of variance inflation factors and collinearity pruning
//!
//! Run with: cargo bench --bench vif_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use faer::Mat;
use rand::prelude::*;
use rand::SeedableRng;

use senatax::pipeline::regression::{prune_collinear, variance_inflation_factors};
use senatax::pipeline::{ModelFrame, StateYear, Winner};

/// Generate a frame where every third predictor is a noisy copy of an
/// earlier one, so pruning has work to do.
fn generate_frame(n_rows: usize, n_predictors: usize, seed: u64) -> ModelFrame {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut x = Mat::<f64>::zeros(n_rows, n_predictors);

    for j in 0..n_predictors {
        for i in 0..n_rows {
            let value = if j % 3 == 2 {
                x[(i, j - 2)] + rng.gen::<f64>() * 0.1
            } else {
                rng.gen::<f64>() * 1000.0
            };
            x[(i, j)] = value;
        }
    }

    let net_votes: Vec<f64> = (0..n_rows).map(|_| rng.gen::<f64>() - 0.5).collect();
    ModelFrame {
        keys: (0..n_rows)
            .map(|i| StateYear::new(2000 + (i / 50) as i32, format!("S{}", i % 50)))
            .collect(),
        predictors: (0..n_predictors).map(|j| format!("field{j}")).collect(),
        x,
        winners: net_votes
            .iter()
            .map(|v| if *v > 0.0 { Winner::Rep } else { Winner::Dem })
            .collect(),
        net_votes,
    }
}

fn bench_vif(c: &mut Criterion) {
    let mut group = c.benchmark_group("variance_inflation_factors");

    for n_predictors in [12, 30, 60] {
        let frame = generate_frame(400, n_predictors, 42);
        group.bench_with_input(
            BenchmarkId::from_parameter(n_predictors),
            &frame,
            |b, frame| b.iter(|| variance_inflation_factors(black_box(frame))),
        );
    }

    group.finish();
}

fn bench_prune(c: &mut Criterion) {
    let mut group = c.benchmark_group("prune_collinear");
    group.sample_size(20);

    for n_predictors in [12, 30, 60] {
        let frame = generate_frame(400, n_predictors, 7);
        group.bench_with_input(
            BenchmarkId::from_parameter(n_predictors),
            &frame,
            |b, frame| b.iter(|| prune_collinear(black_box(frame), 10.0)),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_vif, bench_prune);
criterion_main!(benches);
