// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Product Tensors
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Sparse triple and quadruple product tensors `⟨Ψ_i Ψ_j Ψ_k⟩`,
//! `⟨Ψ_i Ψ_j Ψ_l Ψ_k⟩` of a multivariate basis.
//!
//! Multivariate entries factor into 1D moments, which are integrated
//! exactly with a `(2p + 1)`-point Gauss rule per dimension. Assembly
//! only walks degree tuples whose 1D moments are all non-zero.

use crate::basis::PcBasis;
use crate::multiindex::MultiIndex;
use ndarray::{Array1, Array2, Array3, Array4};
use std::sync::OnceLock;
use uq_math::gauss::gauss_rule;
use uq_types::constants::PRODUCT_SPARSITY_TOL;
use uq_types::error::UqResult;

/// Gauss rule and basis values of one dimension, exact for the product
/// of four basis polynomials of degree `<= p`.
#[derive(Debug, Clone)]
pub(crate) struct ProductRule {
    pub(crate) points: Vec<f64>,
    pub(crate) weights: Vec<f64>,
    /// `n_points × (p + 1)`
    pub(crate) values: Array2<f64>,
    norms: Vec<f64>,
}

impl ProductRule {
    pub(crate) fn new(basis: &PcBasis) -> UqResult<Self> {
        let p = basis.order();
        let rule = gauss_rule(basis.family(), 2 * p + 1)?;
        let values = basis.evaluate_at_points(&rule.points);
        Ok(Self {
            points: rule.points,
            weights: rule.weights,
            values,
            norms: (0..=p).map(|a| basis.norm_squared(a)).collect(),
        })
    }

    fn degrees(&self) -> usize {
        self.values.ncols()
    }

    /// Roundoff left where a 1D moment vanishes analytically.
    fn is_structural_zero(&self, v: f64, degrees: &[usize]) -> bool {
        let scale: f64 = degrees.iter().map(|&a| self.norms[a]).product();
        v.abs() <= PRODUCT_SPARSITY_TOL * scale.sqrt()
    }

    fn triple_table(&self) -> Array3<f64> {
        let m = self.degrees();
        let mut t = Array3::zeros((m, m, m));
        for (q, &w) in self.weights.iter().enumerate() {
            let v = self.values.row(q);
            for a in 0..m {
                for b in 0..m {
                    let wab = w * v[a] * v[b];
                    for c in 0..m {
                        t[[a, b, c]] += wab * v[c];
                    }
                }
            }
        }
        t.indexed_iter_mut().for_each(|((a, b, c), x)| {
            if self.is_structural_zero(*x, &[a, b, c]) {
                *x = 0.0;
            }
        });
        t
    }

    fn quad_table(&self) -> Array4<f64> {
        let m = self.degrees();
        let mut t = Array4::zeros((m, m, m, m));
        for (q, &w) in self.weights.iter().enumerate() {
            let v = self.values.row(q);
            for a in 0..m {
                for b in 0..m {
                    let wab = w * v[a] * v[b];
                    for c in 0..m {
                        let wabc = wab * v[c];
                        for e in 0..m {
                            t[[a, b, c, e]] += wabc * v[e];
                        }
                    }
                }
            }
        }
        t.indexed_iter_mut().for_each(|((a, b, c, e), x)| {
            if self.is_structural_zero(*x, &[a, b, c, e]) {
                *x = 0.0;
            }
        });
        t
    }

    /// For each `(a, c)`, the degrees `b` with `⟨ψ_a ψ_b ψ_c⟩ ≠ 0`.
    fn triple_partners(&self) -> Partners {
        let t = self.triple_table();
        let m = self.degrees();
        let mut lists = vec![Vec::new(); m * m];
        for ((a, b, c), &v) in t.indexed_iter() {
            if v != 0.0 {
                lists[a * m + c].push((b, v));
            }
        }
        Partners::new(m, lists)
    }

    /// For each `(a, b, c)`, the degrees `l` with `⟨ψ_a ψ_b ψ_l ψ_c⟩ ≠ 0`.
    fn quad_partners(&self) -> Partners {
        let t = self.quad_table();
        let m = self.degrees();
        let mut lists = vec![Vec::new(); m * m * m];
        for ((a, b, l, c), &v) in t.indexed_iter() {
            if v != 0.0 {
                lists[(a * m + b) * m + c].push((l, v));
            }
        }
        Partners::new(m, lists)
    }
}

/// Non-zero 1D factors keyed by the fixed degrees, free degree ascending.
#[derive(Debug)]
struct Partners {
    stride: usize,
    lists: Vec<Vec<(usize, f64)>>,
}

impl Partners {
    fn new(stride: usize, mut lists: Vec<Vec<(usize, f64)>>) -> Self {
        for list in &mut lists {
            list.sort_unstable_by_key(|e| e.0);
        }
        Self { stride, lists }
    }

    fn get(&self, fixed: &[usize]) -> &[(usize, f64)] {
        let key = fixed.iter().fold(0, |acc, &a| acc * self.stride + a);
        &self.lists[key]
    }
}

/// Depth-first walk over the degree tuples whose 1D factors are all
/// non-zero and whose total degree stays within `budget`. `visit` gets
/// each complete tuple with the product of its factors.
fn walk_partners<F: FnMut(&[usize], f64)>(
    lists: &[&[(usize, f64)]],
    budget: usize,
    tuple: &mut Vec<usize>,
    acc: f64,
    visit: &mut F,
) {
    let Some((first, rest)) = lists.split_first() else {
        visit(tuple, acc);
        return;
    };
    for &(deg, v) in first.iter() {
        if deg > budget {
            break;
        }
        tuple.push(deg);
        walk_partners(rest, budget - deg, tuple, acc * v, visit);
        tuple.pop();
    }
}

/// Non-zero `⟨Ψ_i Ψ_j Ψ_k⟩`, grouped by `k`.
#[derive(Debug, Clone)]
pub struct TripleProduct {
    by_term: Vec<Vec<(usize, usize, f64)>>,
}

impl TripleProduct {
    /// Only the `j` reachable through non-zero 1D factors of `(i, k)` are
    /// visited; a vanishing dimension prunes the whole subtree.
    pub(crate) fn build(mi: &MultiIndex, rules: &[ProductRule], norms: &Array1<f64>) -> Self {
        let partners: Vec<Partners> = rules.iter().map(ProductRule::triple_partners).collect();
        let budget = mi.order();
        let n = mi.len();
        let mut by_term = vec![Vec::new(); n];
        let mut tuple = Vec::with_capacity(mi.dim());
        for (k, entries) in by_term.iter_mut().enumerate() {
            let tk = mi.term(k);
            for i in 0..n {
                let ti = mi.term(i);
                let lists: Vec<&[(usize, f64)]> = partners
                    .iter()
                    .enumerate()
                    .map(|(d, p)| p.get(&[ti[d], tk[d]]))
                    .collect();
                walk_partners(&lists, budget, &mut tuple, 1.0, &mut |tj: &[usize], v: f64| {
                    let Some(j) = mi.encode(tj) else {
                        return;
                    };
                    let scale = (norms[i] * norms[j] * norms[k]).sqrt();
                    if v.abs() > PRODUCT_SPARSITY_TOL * scale {
                        entries.push((i, j, v));
                    }
                });
            }
            entries.sort_unstable_by_key(|e| (e.0, e.1));
        }
        let tp = Self { by_term };
        log::debug!("triple product: {} of {} entries kept", tp.nnz(), n * n * n);
        tp
    }

    /// `(i, j, ⟨Ψ_i Ψ_j Ψ_k⟩)` for fixed `k`.
    pub fn entries(&self, k: usize) -> &[(usize, usize, f64)] {
        &self.by_term[k]
    }

    pub fn nnz(&self) -> usize {
        self.by_term.iter().map(Vec::len).sum()
    }

    /// All stored `(i, j, k, value)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, usize, f64)> + '_ {
        self.by_term
            .iter()
            .enumerate()
            .flat_map(|(k, e)| e.iter().map(move |&(i, j, v)| (i, j, k, v)))
    }
}

/// Non-zero `⟨Ψ_i Ψ_j Ψ_l Ψ_k⟩`, grouped by `k`.
#[derive(Debug, Clone)]
pub struct QuadProduct {
    by_term: Vec<Vec<(usize, usize, usize, f64)>>,
}

impl QuadProduct {
    pub(crate) fn build(mi: &MultiIndex, rules: &[ProductRule], norms: &Array1<f64>) -> Self {
        let partners: Vec<Partners> = rules.iter().map(ProductRule::quad_partners).collect();
        let budget = mi.order();
        let n = mi.len();
        let mut by_term = vec![Vec::new(); n];
        let mut tuple = Vec::with_capacity(mi.dim());
        for (k, entries) in by_term.iter_mut().enumerate() {
            let tk = mi.term(k);
            for i in 0..n {
                let ti = mi.term(i);
                for j in 0..n {
                    let tj = mi.term(j);
                    let lists: Vec<&[(usize, f64)]> = partners
                        .iter()
                        .enumerate()
                        .map(|(d, p)| p.get(&[ti[d], tj[d], tk[d]]))
                        .collect();
                    walk_partners(&lists, budget, &mut tuple, 1.0, &mut |tl: &[usize], v: f64| {
                        let Some(l) = mi.encode(tl) else {
                            return;
                        };
                        let scale = (norms[i] * norms[j] * norms[l] * norms[k]).sqrt();
                        if v.abs() > PRODUCT_SPARSITY_TOL * scale {
                            entries.push((i, j, l, v));
                        }
                    });
                }
            }
            entries.sort_unstable_by_key(|e| (e.0, e.1, e.2));
        }
        let qp = Self { by_term };
        log::debug!("quad product: {} of {} entries kept", qp.nnz(), n * n * n * n);
        qp
    }

    /// `(i, j, l, ⟨Ψ_i Ψ_j Ψ_l Ψ_k⟩)` for fixed `k`.
    pub fn entries(&self, k: usize) -> &[(usize, usize, usize, f64)] {
        &self.by_term[k]
    }

    pub fn nnz(&self) -> usize {
        self.by_term.iter().map(Vec::len).sum()
    }
}

/// Per-dimension product rules plus the lazily built tensors.
#[derive(Debug, Clone)]
pub(crate) struct ProductCache {
    pub(crate) rules: Vec<ProductRule>,
    triple: OnceLock<TripleProduct>,
    quad: OnceLock<QuadProduct>,
}

impl ProductCache {
    pub(crate) fn new(bases: &[PcBasis]) -> UqResult<Self> {
        Ok(Self {
            rules: bases
                .iter()
                .map(ProductRule::new)
                .collect::<UqResult<Vec<_>>>()?,
            triple: OnceLock::new(),
            quad: OnceLock::new(),
        })
    }

    pub(crate) fn triple(&self, mi: &MultiIndex, norms: &Array1<f64>) -> &TripleProduct {
        self.triple
            .get_or_init(|| TripleProduct::build(mi, &self.rules, norms))
    }

    pub(crate) fn quad(&self, mi: &MultiIndex, norms: &Array1<f64>) -> &QuadProduct {
        self.quad
            .get_or_init(|| QuadProduct::build(mi, &self.rules, norms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uq_types::family::BasisFamily;

    fn cache(family: BasisFamily, order: usize, dim: usize) -> (MultiIndex, Array1<f64>, ProductCache) {
        let mi = MultiIndex::total_order(dim, order).unwrap();
        let bases: Vec<PcBasis> = (0..dim)
            .map(|_| PcBasis::new(family, order).unwrap())
            .collect();
        let norms = Array1::from_shape_fn(mi.len(), |k| {
            mi.term(k)
                .iter()
                .zip(&bases)
                .map(|(&a, b)| b.norm_squared(a))
                .product()
        });
        let cache = ProductCache::new(&bases).unwrap();
        (mi, norms, cache)
    }

    /// Every `(i, j, k)` through the full 1D tables, same keep rule.
    fn dense_triple(
        mi: &MultiIndex,
        rules: &[ProductRule],
        norms: &Array1<f64>,
    ) -> Vec<(usize, usize, usize, f64)> {
        let tables: Vec<Array3<f64>> = rules.iter().map(ProductRule::triple_table).collect();
        let n = mi.len();
        let mut out = Vec::new();
        for k in 0..n {
            for i in 0..n {
                for j in 0..n {
                    let (ti, tj, tk) = (mi.term(i), mi.term(j), mi.term(k));
                    let v: f64 = tables
                        .iter()
                        .enumerate()
                        .map(|(d, t)| t[[ti[d], tj[d], tk[d]]])
                        .product();
                    if v.abs() > PRODUCT_SPARSITY_TOL * (norms[i] * norms[j] * norms[k]).sqrt() {
                        out.push((i, j, k, v));
                    }
                }
            }
        }
        out
    }

    fn dense_quad_nnz(mi: &MultiIndex, rules: &[ProductRule], norms: &Array1<f64>) -> usize {
        let tables: Vec<Array4<f64>> = rules.iter().map(ProductRule::quad_table).collect();
        let n = mi.len();
        let mut count = 0;
        for k in 0..n {
            for i in 0..n {
                for j in 0..n {
                    for l in 0..n {
                        let (ti, tj, tl, tk) = (mi.term(i), mi.term(j), mi.term(l), mi.term(k));
                        let v: f64 = tables
                            .iter()
                            .enumerate()
                            .map(|(d, t)| t[[ti[d], tj[d], tl[d], tk[d]]])
                            .product();
                        let scale = (norms[i] * norms[j] * norms[l] * norms[k]).sqrt();
                        if v.abs() > PRODUCT_SPARSITY_TOL * scale {
                            count += 1;
                        }
                    }
                }
            }
        }
        count
    }

    #[test]
    fn test_pruned_build_matches_dense_enumeration() {
        let (mi, norms, products) = cache(BasisFamily::hermite(), 3, 3);
        let tp = products.triple(&mi, &norms);
        let dense = dense_triple(&mi, &products.rules, &norms);
        assert_eq!(tp.nnz(), dense.len());
        assert!(tp.nnz() < mi.len().pow(3));
        assert_eq!(tp.iter().collect::<Vec<_>>(), dense);

        let (mi, norms, products) = cache(BasisFamily::legendre(), 2, 3);
        assert_eq!(
            products.quad(&mi, &norms).nnz(),
            dense_quad_nnz(&mi, &products.rules, &norms)
        );
    }

    #[test]
    fn test_pruned_build_on_tensor_index() {
        // anisotropic tensor set with an asymmetric Jacobi dimension
        let mi = MultiIndex::tensor(&[2, 1, 3]).unwrap();
        let families = [
            BasisFamily::legendre(),
            BasisFamily::laguerre(0.5).unwrap(),
            BasisFamily::jacobi(1.0, 0.5).unwrap(),
        ];
        let bases: Vec<PcBasis> = families
            .iter()
            .zip(mi.max_degree_per_dim())
            .map(|(f, p)| PcBasis::new(*f, p).unwrap())
            .collect();
        let norms = Array1::from_shape_fn(mi.len(), |k| {
            mi.term(k)
                .iter()
                .zip(&bases)
                .map(|(&a, b)| b.norm_squared(a))
                .product()
        });
        let cache = ProductCache::new(&bases).unwrap();
        let tp = cache.triple(&mi, &norms);
        assert_eq!(tp.iter().collect::<Vec<_>>(), dense_triple(&mi, &cache.rules, &norms));
        assert_eq!(cache.quad(&mi, &norms).nnz(), dense_quad_nnz(&mi, &cache.rules, &norms));
    }

    #[test]
    fn test_legendre_triple_entries() {
        let (mi, norms, cache) = cache(BasisFamily::legendre(), 2, 1);
        let tp = cache.triple(&mi, &norms);
        // ⟨P_0 P_k P_k⟩ = 1/(2k+1), ⟨P_1 P_1 P_2⟩ = 2/15
        let lookup = |i, j, k| {
            tp.entries(k)
                .iter()
                .find(|e| e.0 == i && e.1 == j)
                .map(|e| e.2)
                .unwrap_or(0.0)
        };
        assert!((lookup(0, 2, 2) - 0.2).abs() < 1e-15);
        assert!((lookup(1, 1, 2) - 2.0 / 15.0).abs() < 1e-15);
        assert_eq!(lookup(0, 1, 2), 0.0);
        assert_eq!(lookup(1, 2, 2), 0.0);
    }

    #[test]
    fn test_tensors_are_symmetric_and_sparse() {
        let (mi, norms, cache) = cache(BasisFamily::hermite(), 3, 2);
        let tp = cache.triple(&mi, &norms);
        let n = mi.len();
        assert!(tp.nnz() < n * n * n);
        for (i, j, k, v) in tp.iter() {
            let swapped = tp.entries(k).iter().find(|e| e.0 == j && e.1 == i);
            assert!(matches!(swapped, Some(e) if (e.2 - v).abs() < 1e-12 * v.abs().max(1.0)));
        }
        // ⟨Ψ_0 Ψ_j Ψ_k⟩ = δ_jk ‖Ψ_k‖²
        for k in 0..n {
            for &(i, j, v) in tp.entries(k) {
                if i == 0 {
                    assert_eq!(j, k);
                    assert!((v - norms[k]).abs() < 1e-12 * norms[k]);
                }
            }
        }
        let qp = cache.quad(&mi, &norms);
        assert!(qp.nnz() > tp.nnz());
    }

    #[test]
    fn test_quad_reduces_to_triple_with_mean_term() {
        let (mi, norms, cache) = cache(BasisFamily::legendre(), 2, 2);
        let tp = cache.triple(&mi, &norms).clone();
        let qp = cache.quad(&mi, &norms);
        for k in 0..mi.len() {
            for &(i, j, v) in tp.entries(k) {
                let q = qp
                    .entries(k)
                    .iter()
                    .find(|e| e.0 == i && e.1 == j && e.2 == 0)
                    .map(|e| e.3);
                assert!(matches!(q, Some(q) if (q - v).abs() < 1e-14));
            }
        }
    }
}
