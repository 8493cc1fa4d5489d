// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Galerkin Arithmetic Benchmark
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::Array1;
use std::hint::black_box;
use uq_pce::PcSet;
use uq_types::config::ArithmeticConfig;
use uq_types::family::BasisFamily;

/// Smooth positive test expansion: mean 2, geometrically decaying modes.
fn sample_coeffs(set: &PcSet) -> Array1<f64> {
    let mut c = Array1::from_shape_fn(set.len(), |k| 0.1 * 0.5f64.powi(k as i32));
    c[0] = 2.0;
    c
}

/// Benchmark: triple-product assembly for a 4D order-4 Hermite set.
fn bench_triple_product_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("triple_product");
    group.sample_size(10);
    group.bench_function("hg_d4_p4", |b| {
        b.iter(|| {
            let set = PcSet::new(BasisFamily::hermite(), 4, 4).unwrap();
            black_box(set.triple_product().nnz())
        })
    });
    group.finish();
}

fn bench_product(c: &mut Criterion) {
    let set = PcSet::new(BasisFamily::legendre(), 4, 4).unwrap();
    let a = sample_coeffs(&set);
    // build the tensor outside the timed loop
    let _ = set.triple_product();
    let mut out = Array1::zeros(set.len());

    c.bench_function("product_into_lu_d4_p4", |b| {
        b.iter(|| {
            set.product_into(black_box(&a), black_box(&a), &mut out).unwrap();
            black_box(out[0])
        })
    });
}

/// Benchmark: exp/log by Taylor series vs pseudo-time integration.
fn bench_exp_log(c: &mut Criterion) {
    let taylor = PcSet::new(BasisFamily::legendre(), 3, 3).unwrap();
    let integ = taylor
        .clone()
        .with_arithmetic(ArithmeticConfig::integration(16))
        .unwrap();
    let a = sample_coeffs(&taylor);
    let _ = taylor.triple_product();
    let _ = integ.triple_product();

    let mut group = c.benchmark_group("exp_log_lu_d3_p3");
    group.bench_function("exp_taylor", |b| {
        b.iter(|| black_box(taylor.exp(black_box(&a)).unwrap()))
    });
    group.bench_function("exp_integration", |b| {
        b.iter(|| black_box(integ.exp(black_box(&a)).unwrap()))
    });
    group.bench_function("log_taylor", |b| {
        b.iter(|| black_box(taylor.log(black_box(&a)).unwrap()))
    });
    group.bench_function("log_integration", |b| {
        b.iter(|| black_box(integ.log(black_box(&a)).unwrap()))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_triple_product_build,
    bench_product,
    bench_exp_log
);
criterion_main!(benches);
