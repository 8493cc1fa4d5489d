// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Gauss Rules
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Gauss rules for the four germ densities.
//!
//! Nodes are the eigenvalues of the Jacobi matrix of the orthonormal
//! recurrence (Golub–Welsch); weights come from the Christoffel function
//! `1 / Σ_k φ_k(x)²`, which keeps small tail weights accurate.
//! All weights are normalised to total mass 1.

use crate::linalg::tridiagonal_eigenvalues;
use crate::rules::Rule1d;
use uq_types::error::{UqError, UqResult};
use uq_types::family::{BasisFamily, PcType};

/// Three-term recurrence of the orthonormal polynomials of a germ density:
/// `x φ_k = b_{k+1} φ_{k+1} + a_k φ_k + b_k φ_{k-1}`.
#[derive(Debug, Clone)]
pub struct OrthonormalRecurrence {
    /// `a_0 ..= a_n`
    a: Vec<f64>,
    /// `b_0 ..= b_n` (`b_0` unused and zero)
    b: Vec<f64>,
}

impl OrthonormalRecurrence {
    /// Coefficients sufficient to evaluate degrees `0..=n`.
    pub fn new(family: &BasisFamily, n: usize) -> Self {
        let mut a = Vec::with_capacity(n + 1);
        let mut b = Vec::with_capacity(n + 1);
        for k in 0..=n {
            let (ak, bk) = jacobi_entries(family, k);
            a.push(ak);
            b.push(bk);
        }
        Self { a, b }
    }

    /// Highest degree this recurrence can evaluate.
    pub fn degree(&self) -> usize {
        self.a.len() - 1
    }

    /// Writes `φ_0(x) ..= φ_{out.len()-1}(x)`.
    pub fn values_into(&self, x: f64, out: &mut [f64]) {
        if out.is_empty() {
            return;
        }
        out[0] = 1.0;
        if out.len() > 1 {
            out[1] = (x - self.a[0]) / self.b[1];
        }
        for k in 1..out.len().saturating_sub(1) {
            out[k + 1] = ((x - self.a[k]) * out[k] - self.b[k] * out[k - 1]) / self.b[k + 1];
        }
    }

    pub fn values(&self, x: f64, n: usize) -> Vec<f64> {
        let mut out = vec![0.0; n + 1];
        self.values_into(x, &mut out);
        out
    }

    /// Single value `φ_n(x) + Σ_{k<n} c_k φ_k(x)` without allocating.
    pub fn combination(&self, x: f64, coeffs: &[f64]) -> f64 {
        let n = coeffs.len();
        let mut prev = 0.0;
        let mut cur = 1.0;
        let mut acc = 0.0;
        for k in 0..n {
            acc += coeffs[k] * cur;
            let next = if k == 0 {
                (x - self.a[0]) / self.b[1]
            } else {
                ((x - self.a[k]) * cur - self.b[k] * prev) / self.b[k + 1]
            };
            prev = cur;
            cur = next;
        }
        acc + cur
    }
}

/// `(a_k, b_k)` of the orthonormal Jacobi matrix; `b_0 = 0`.
fn jacobi_entries(family: &BasisFamily, k: usize) -> (f64, f64) {
    let kf = k as f64;
    match family.pc_type {
        PcType::Legendre => {
            let b = if k == 0 {
                0.0
            } else {
                kf / (4.0 * kf * kf - 1.0).sqrt()
            };
            (0.0, b)
        }
        PcType::Hermite => (0.0, kf.sqrt()),
        PcType::Laguerre => {
            let al = family.alpha;
            (2.0 * kf + al + 1.0, (kf * (kf + al)).sqrt())
        }
        PcType::Jacobi => {
            let (al, be) = (family.alpha, family.beta);
            let s = al + be;
            let a = if k == 0 {
                (be - al) / (s + 2.0)
            } else {
                (be * be - al * al) / ((2.0 * kf + s) * (2.0 * kf + s + 2.0))
            };
            let b = match k {
                0 => 0.0,
                1 => (4.0 * (1.0 + al) * (1.0 + be) / ((2.0 + s).powi(2) * (3.0 + s))).sqrt(),
                _ => {
                    let t = 2.0 * kf + s;
                    (4.0 * kf * (kf + al) * (kf + be) * (kf + s)
                        / (t * t * (t + 1.0) * (t - 1.0)))
                        .sqrt()
                }
            };
            (a, b)
        }
    }
}

/// `n`-point Gauss rule of the family's germ density.
pub fn gauss_rule(family: &BasisFamily, n: usize) -> UqResult<Rule1d> {
    if n == 0 {
        return Err(UqError::ConfigError(
            "Gauss rule needs at least one point".to_string(),
        ));
    }
    family.validate()?;
    let rec = OrthonormalRecurrence::new(family, n);
    let mut nodes = tridiagonal_eigenvalues(&rec.a[..n], &rec.b[1..n])?;
    if family.is_symmetric() {
        symmetrize_nodes(&mut nodes);
    }

    let mut phi = vec![0.0; n];
    let mut weights: Vec<f64> = nodes
        .iter()
        .map(|&x| {
            rec.values_into(x, &mut phi);
            let s: f64 = phi.iter().map(|v| v * v).sum();
            if s.is_finite() {
                1.0 / s
            } else {
                0.0
            }
        })
        .collect();
    if family.is_symmetric() {
        symmetrize_weights(&mut weights);
    }
    let total: f64 = weights.iter().sum();
    weights.iter_mut().for_each(|w| *w /= total);

    Rule1d::new(nodes, weights)
}

/// Forces exact antisymmetry `x_i = -x_{n-1-i}` of ascending nodes.
pub(crate) fn symmetrize_nodes(nodes: &mut [f64]) {
    let n = nodes.len();
    for i in 0..n / 2 {
        let half = 0.5 * (nodes[n - 1 - i] - nodes[i]);
        nodes[i] = -half;
        nodes[n - 1 - i] = half;
    }
    if n % 2 == 1 {
        nodes[n / 2] = 0.0;
    }
}

pub(crate) fn symmetrize_weights(weights: &mut [f64]) {
    let n = weights.len();
    for i in 0..n / 2 {
        let mean = 0.5 * (weights[i] + weights[n - 1 - i]);
        weights[i] = mean;
        weights[n - 1 - i] = mean;
    }
}
