//! Benchmarks for the O(n^2) quadrature operator and a short end-to-end run.
//!
//! ```bash
//! cargo bench --bench quadrature
//! cargo bench --bench quadrature operator
//! ```

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use hsolve::quadrature::QuadratureOperator;
use hsolve::{solve, SolverOptions};
use nalgebra::DVector;

fn bench_operator(c: &mut Criterion) {
    let mut group = c.benchmark_group("operator");
    for n in [100usize, 500, 2_000] {
        let operator = QuadratureOperator::new(n);
        let h = DVector::from_element(n, 1.0);
        group.bench_with_input(BenchmarkId::from_parameter(n), &h, |b, h| {
            b.iter(|| operator.apply(black_box(h)).expect("matching length"))
        });
    }
    group.finish();
}

fn bench_short_run(c: &mut Criterion) {
    let options = SolverOptions::default().max_iters(10);
    c.bench_function("solve/n500_10_iterations", |b| {
        b.iter(|| solve(black_box(options.clone())).expect("valid options"))
    });
}

criterion_group!(benches, bench_operator, bench_short_run);
criterion_main!(benches);
