// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Nested Extensions
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Kronrod–Patterson style nested extension of a 1D rule.
//!
//! Extending an `n`-point rule by `m` nodes: the new nodes are the roots of
//! the degree-`m` polynomial orthogonal to all lower degrees under the germ
//! density times the node polynomial `π(x) = Π (x - x_i)` of the old rule.
//! The `n + m` point interpolatory rule is then exact to degree `n + 2m - 1`.
//! Old nodes are carried over bit-for-bit so the sequence stays nested.

use crate::gauss::{gauss_rule, symmetrize_nodes, symmetrize_weights, OrthonormalRecurrence};
use crate::linalg::solve_dense;
use crate::rules::Rule1d;
use ndarray::{Array1, Array2};
use uq_types::error::{UqError, UqResult};
use uq_types::family::BasisFamily;

const SCAN_POINTS: usize = 200_000;
const BISECTION_STEPS: usize = 200;

/// Builds the nested sequence starting from the one-point rule at the mean
/// and applying `extensions` in turn.
pub fn nested_sequence(family: &BasisFamily, extensions: &[usize]) -> UqResult<Vec<Rule1d>> {
    let mean = gauss_rule(family, 1)?;
    let mut rules = vec![mean];
    for &m in extensions {
        let last = &rules[rules.len() - 1];
        let next = extend(family, last, m)?;
        rules.push(next);
    }
    Ok(rules)
}

/// Adds `added` nodes to `old`.
pub fn extend(family: &BasisFamily, old: &Rule1d, added: usize) -> UqResult<Rule1d> {
    let n = old.len();
    let m = added;
    let total = n + m;
    if m == 0 {
        return Ok(old.clone());
    }

    let rec = OrthonormalRecurrence::new(family, total.max(m));
    let coeffs = node_polynomial(family, old, m, &rec)?;

    let mut roots = scan_roots(family, total, |x| rec.combination(x, &coeffs));
    if roots.len() != m {
        return Err(UqError::InvalidRuleTable(format!(
            "extending a {n}-point {family} rule: expected {m} real roots, found {}",
            roots.len()
        )));
    }
    if family.is_symmetric() {
        symmetrize_nodes(&mut roots);
    }
    for &r in &roots {
        if old.points.iter().any(|&x| (x - r).abs() <= 1e-10 * x.abs().max(1.0)) {
            return Err(UqError::InvalidRuleTable(format!(
                "extension node {r} of a {n}-point {family} rule coincides with an old node"
            )));
        }
    }

    let mut nodes: Vec<f64> = old.points.iter().copied().chain(roots).collect();
    nodes.sort_by(|a, b| a.total_cmp(b));

    let mut weights = interpolatory_weights(family, &nodes)?;
    if family.is_symmetric() {
        symmetrize_weights(&mut weights);
    }

    Rule1d::new(nodes, weights)
}

/// `w_i = ∫ ℓ_i dμ` with `ℓ_i(x) = Π_{j≠i} (x - z_j) / (z_i - z_j)`, integrated
/// by a Gauss rule with as many points as nodes. Unlike a moment solve this
/// keeps tail weights accurate relative to their own size.
fn interpolatory_weights(family: &BasisFamily, nodes: &[f64]) -> UqResult<Vec<f64>> {
    let aux = gauss_rule(family, nodes.len())?;
    let weights = nodes
        .iter()
        .enumerate()
        .map(|(i, &zi)| {
            let others = || nodes.iter().enumerate().filter(move |&(j, _)| j != i);
            let denom: f64 = others().map(|(_, &zj)| zi - zj).product();
            let numer: f64 = aux
                .points
                .iter()
                .zip(&aux.weights)
                .map(|(&x, &w)| w * others().map(|(_, &zj)| x - zj).product::<f64>())
                .sum();
            numer / denom
        })
        .collect();
    Ok(weights)
}

/// Coefficients `c` with `q = φ_m + Σ_{k<m} c_k φ_k` orthogonal to degrees
/// below `m` under `π(x) dμ`.
fn node_polynomial(
    family: &BasisFamily,
    old: &Rule1d,
    m: usize,
    rec: &OrthonormalRecurrence,
) -> UqResult<Vec<f64>> {
    let n = old.len();
    let aux = gauss_rule(family, n + m + 1)?;

    let mut pi: Vec<f64> = aux
        .points
        .iter()
        .map(|&x| old.points.iter().map(|&xi| x - xi).product())
        .collect();
    let pi_scale = pi.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
    if pi_scale > 0.0 {
        pi.iter_mut().for_each(|v| *v /= pi_scale);
    }

    let mut a = Array2::zeros((m, m));
    let mut r = Array1::zeros(m);
    let mut phi = vec![0.0; m + 1];
    for ((&x, &w), &p) in aux.points.iter().zip(&aux.weights).zip(&pi) {
        rec.values_into(x, &mut phi);
        let wp = w * p;
        for j in 0..m {
            for k in 0..m {
                a[[j, k]] += wp * phi[j] * phi[k];
            }
            r[j] -= wp * phi[j] * phi[m];
        }
    }
    Ok(solve_dense(&a, &r)?.to_vec())
}

/// Real roots of `f`, bracketed on a fine grid and bisected.
fn scan_roots<F: Fn(f64) -> f64>(family: &BasisFamily, total: usize, f: F) -> Vec<f64> {
    let grid: Box<dyn Fn(usize) -> f64> = if family.is_bounded() {
        let (lo, hi) = family.support();
        let (mid, half) = (0.5 * (lo + hi), 0.5 * (hi - lo));
        Box::new(move |i| {
            let t = std::f64::consts::PI * i as f64 / (SCAN_POINTS - 1) as f64;
            mid - half * t.cos()
        })
    } else {
        let (lo, _) = family.support();
        let reach = 2.0 * (total as f64).sqrt() + 3.0;
        let start = if lo.is_finite() { lo } else { -reach };
        let end = if lo.is_finite() { 4.0 * total as f64 + 10.0 } else { reach };
        Box::new(move |i| start + (end - start) * i as f64 / (SCAN_POINTS - 1) as f64)
    };

    let mut roots = Vec::new();
    let mut xa = grid(0);
    let mut fa = f(xa);
    if fa == 0.0 {
        roots.push(xa);
    }
    for i in 1..SCAN_POINTS {
        let xb = grid(i);
        let fb = f(xb);
        if fb == 0.0 {
            roots.push(xb);
        } else if fa != 0.0 && fa.signum() != fb.signum() {
            roots.push(bisect(&f, xa, xb, fa));
        }
        xa = xb;
        fa = fb;
    }
    roots
}

fn bisect<F: Fn(f64) -> f64>(f: &F, mut a: f64, mut b: f64, mut fa: f64) -> f64 {
    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (a + b);
        if mid <= a || mid >= b {
            break;
        }
        let fm = f(mid);
        if fm == 0.0 {
            return mid;
        }
        if fm.signum() == fa.signum() {
            a = mid;
            fa = fm;
        } else {
            b = mid;
        }
    }
    0.5 * (a + b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_extension_is_gauss() {
        // {0} extended by two nodes is the 3-point Gauss rule
        let lu = nested_sequence(&BasisFamily::legendre(), &[2]).unwrap();
        let g3 = gauss_rule(&BasisFamily::legendre(), 3).unwrap();
        for i in 0..3 {
            assert!((lu[1].points[i] - g3.points[i]).abs() < 1e-13);
            assert!((lu[1].weights[i] - g3.weights[i]).abs() < 1e-13);
        }
        let hg = nested_sequence(&BasisFamily::hermite(), &[2]).unwrap();
        assert!((hg[1].points[2] - 3.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_kronrod_seven_point() {
        let rules = nested_sequence(&BasisFamily::legendre(), &[2, 4]).unwrap();
        let r7 = &rules[2];
        assert_eq!(r7.len(), 7);
        // nested: the 3-point nodes survive unchanged
        for x in &rules[1].points {
            assert!(r7.points.contains(x));
        }
        // exact to degree 11 under the uniform density on [-1, 1]
        for p in 0..=11 {
            let exact = if p % 2 == 1 { 0.0 } else { 1.0 / (p as f64 + 1.0) };
            let got = r7.integrate(|x| x.powi(p));
            assert!((got - exact).abs() < 1e-14, "degree {p}: {got} vs {exact}");
        }
        // the outer Kronrod node of the 7-point Patterson rule
        assert!((r7.points[6] - 0.960_491_268_708_020_3).abs() < 1e-12);
    }

    #[test]
    fn test_empty_extension_is_identity() {
        let g3 = gauss_rule(&BasisFamily::hermite(), 3).unwrap();
        assert_eq!(extend(&BasisFamily::hermite(), &g3, 0).unwrap(), g3);
    }
}
