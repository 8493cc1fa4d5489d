// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Sparse Grid Benchmark
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use uq_math::quad::QuadRule;
use uq_math::rules::{GaussFamily, QuadratureFamily, RuleFamily};
use uq_math::sparse::SparseGrid;
use uq_types::family::BasisFamily;

fn bench_isotropic_lu(c: &mut Criterion) {
    let fam = RuleFamily::Gauss(GaussFamily::new(BasisFamily::legendre(), 5).unwrap());
    let grid = SparseGrid::new(vec![fam; 4]).unwrap();

    c.bench_function("sparse_lu_d4_level5", |b| {
        b.iter(|| black_box(grid.isotropic(5).unwrap().len()))
    });
}

fn bench_nested_vs_gauss(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_d3_level4");
    group.sample_size(20);

    let cc = SparseGrid::new(vec![RuleFamily::ClenshawCurtis; 3]).unwrap();
    group.bench_function("clenshaw_curtis", |b| {
        b.iter(|| black_box(cc.isotropic(4).unwrap().len()))
    });

    let gkp = SparseGrid::new(vec![RuleFamily::GkpUniform; 3]).unwrap();
    // warm the process-wide table before timing
    let _ = RuleFamily::GkpUniform.rule(4);
    group.bench_function("gkp_uniform", |b| {
        b.iter(|| black_box(gkp.isotropic(4).unwrap().len()))
    });

    let fams = [BasisFamily::legendre(); 3];
    group.bench_function("gauss_via_quadrule", |b| {
        b.iter(|| black_box(QuadRule::sparse(&fams, 4).unwrap().len()))
    });

    group.finish();
}

criterion_group!(benches, bench_isotropic_lu, bench_nested_vs_gauss);
criterion_main!(benches);
