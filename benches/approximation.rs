//! Benchmarks for building approximations and estimating peak parameters.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use peakinit_rs::approximation::{ApproximationBase, PiecewiseApproximation};
use peakinit_rs::domain::{FunctionDomain1D, FunctionValues};
use peakinit_rs::estimator::ParameterEstimator;
use peakinit_rs::models::gaussian_peak;
use std::f64::consts::PI;

fn bench_best_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("best_fit");

    for &half_width in &[PI, 4.0 * PI, 16.0 * PI] {
        group.bench_with_input(
            BenchmarkId::new("sin", format!("{:.1}", half_width)),
            &half_width,
            |b, &w| {
                b.iter(|| ApproximationBase::best_fit(-w, w, f64::sin, 0, black_box(1e-15)));
            },
        );
    }

    group.finish();
}

fn bench_split(c: &mut Criterion) {
    c.bench_function("split_abs", |b| {
        b.iter(|| PiecewiseApproximation::split(-1.0, 1.0, |x: f64| x.abs(), black_box(1e-10)))
    });
}

fn bench_from_data(c: &mut Criterion) {
    let mut group = c.benchmark_group("from_data");

    for &n in &[101usize, 401, 1001] {
        let xs: Vec<f64> = (0..n)
            .map(|i| -10.0 + 20.0 * i as f64 / (n - 1) as f64)
            .collect();
        let ys: Vec<f64> = xs.iter().map(|&x| (-0.5 * x * x).exp()).collect();

        group.bench_with_input(BenchmarkId::from_parameter(n), &(xs, ys), |b, (xs, ys)| {
            b.iter(|| PiecewiseApproximation::from_data(black_box(xs), black_box(ys)));
        });
    }

    group.finish();
}

fn bench_estimate(c: &mut Criterion) {
    let domain = FunctionDomain1D::linspace(-10.0, 10.0, 401).unwrap();
    let values = FunctionValues::from_fn(&domain, |x| 2.0 * (-x * x / 1.5).exp());

    c.bench_function("estimate_gaussian", |b| {
        b.iter(|| {
            let mut model = gaussian_peak(2.0, 0.0).unwrap();
            ParameterEstimator::estimate(&mut model, black_box(&domain), black_box(&values))
        })
    });
}

criterion_group!(
    benches,
    bench_best_fit,
    bench_split,
    bench_from_data,
    bench_estimate
);
criterion_main!(benches);
