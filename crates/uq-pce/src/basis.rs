// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Univariate PC Basis
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Orthogonal polynomial basis of one stochastic dimension.
//!
//! Polynomials follow the standard (non-normalised) conventions:
//!
//! | tag | polynomials                  | germ density on support               |
//! |-----|------------------------------|---------------------------------------|
//! | LU  | Legendre `P_n`               | `1/2` on `[-1, 1]`                    |
//! | HG  | probabilists' Hermite `He_n` | standard normal                       |
//! | LG  | Laguerre `L_n^(α)`           | `x^α e^-x / Γ(α+1)` on `[0, ∞)`       |
//! | JB  | Jacobi `P_n^(α,β)`           | `∝ (1-x)^α (1+x)^β` on `[-1, 1]`      |
//!
//! Every family obeys `P_{n+1} = (A_n x + B_n) P_n - C_n P_{n-1}`; the
//! derivative recurrences follow by differentiating it.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Beta, Distribution, Gamma, StandardNormal};
use statrs::function::gamma::ln_gamma;
use uq_math::gauss::gauss_rule;
use uq_math::rules::{QuadratureFamily, Rule1d, RuleFamily};
use uq_types::constants::DEFAULT_SEED;
use uq_types::error::{UqError, UqResult};
use uq_types::family::{BasisFamily, PcType, RuleKind};

/// 1D rule used for numerical norms and basis tabulation.
#[derive(Debug, Clone, PartialEq)]
pub enum QuadInit {
    /// `n`-point Gauss rule of the germ density.
    Gauss(usize),
    /// Level of a tabulated rule family.
    Level(RuleKind, usize),
    /// Caller-supplied points and weights, any order.
    Custom(Vec<f64>, Vec<f64>),
}

#[derive(Debug, Clone, Copy)]
enum Germ {
    Uniform,
    Normal,
    Gamma(Gamma<f64>),
    /// Beta variate mapped from `[0, 1]` to `[-1, 1]`.
    Beta(Beta<f64>),
}

impl Germ {
    fn new(family: &BasisFamily) -> UqResult<Self> {
        let invalid = |e: String| UqError::ConfigError(format!("germ distribution of {family}: {e}"));
        Ok(match family.pc_type {
            PcType::Legendre => Germ::Uniform,
            PcType::Hermite => Germ::Normal,
            PcType::Laguerre => Germ::Gamma(
                Gamma::new(family.alpha + 1.0, 1.0).map_err(|e| invalid(e.to_string()))?,
            ),
            PcType::Jacobi => Germ::Beta(
                Beta::new(family.beta + 1.0, family.alpha + 1.0)
                    .map_err(|e| invalid(e.to_string()))?,
            ),
        })
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Germ::Uniform => 2.0 * rng.gen::<f64>() - 1.0,
            Germ::Normal => StandardNormal.sample(rng),
            Germ::Gamma(g) => g.sample(rng),
            Germ::Beta(b) => 2.0 * b.sample(rng) - 1.0,
        }
    }
}

/// `(A_n, B_n, C_n)` of the standard recurrence; a pure function of the
/// family parameters and `n`.
fn recurrence_coeffs(family: &BasisFamily, n: usize) -> (f64, f64, f64) {
    let nf = n as f64;
    match family.pc_type {
        PcType::Legendre => ((2.0 * nf + 1.0) / (nf + 1.0), 0.0, nf / (nf + 1.0)),
        PcType::Hermite => (1.0, 0.0, nf),
        PcType::Laguerre => {
            let al = family.alpha;
            (
                -1.0 / (nf + 1.0),
                (2.0 * nf + 1.0 + al) / (nf + 1.0),
                (nf + al) / (nf + 1.0),
            )
        }
        PcType::Jacobi => {
            let (al, be) = (family.alpha, family.beta);
            let s = al + be;
            if n == 0 {
                return (0.5 * (s + 2.0), 0.5 * (al - be), 0.0);
            }
            let t = 2.0 * nf + s;
            let den = 2.0 * (nf + 1.0) * (nf + s + 1.0) * t;
            (
                (t + 1.0) * (t + 2.0) * t / den,
                (t + 1.0) * (al * al - be * be) / den,
                2.0 * (nf + al) * (nf + be) * (t + 2.0) / den,
            )
        }
    }
}

/// `E[P_n²]` under the germ density.
fn exact_norm_squared(family: &BasisFamily, n: usize) -> f64 {
    let nf = n as f64;
    match family.pc_type {
        PcType::Legendre => 1.0 / (2.0 * nf + 1.0),
        PcType::Hermite => (1..=n).fold(1.0, |acc, k| acc * k as f64),
        PcType::Laguerre => {
            let al = family.alpha;
            (ln_gamma(nf + al + 1.0) - ln_gamma(nf + 1.0) - ln_gamma(al + 1.0)).exp()
        }
        PcType::Jacobi => {
            if n == 0 {
                return 1.0;
            }
            let (al, be) = (family.alpha, family.beta);
            let s = al + be;
            let log = ln_gamma(nf + al + 1.0) + ln_gamma(nf + be + 1.0) + ln_gamma(s + 2.0)
                - ln_gamma(nf + s + 1.0)
                - ln_gamma(nf + 1.0)
                - ln_gamma(al + 1.0)
                - ln_gamma(be + 1.0);
            log.exp() / (2.0 * nf + s + 1.0)
        }
    }
}

/// Univariate basis of degrees `0..=order` with a bound quadrature rule and
/// its own random stream.
#[derive(Debug, Clone)]
pub struct PcBasis {
    family: BasisFamily,
    order: usize,
    recurrence: Vec<(f64, f64, f64)>,
    norms: Array1<f64>,
    quad: Rule1d,
    /// Basis values at the quadrature points, `n_points × (order + 1)`.
    psi: Array2<f64>,
    germ: Germ,
    seed: u64,
    rng: StdRng,
}

impl PcBasis {
    /// Basis bound to the `(order + 1)`-point Gauss rule.
    pub fn new(family: BasisFamily, order: usize) -> UqResult<Self> {
        family.validate()?;
        let recurrence = (0..order).map(|n| recurrence_coeffs(&family, n)).collect();
        let norms = Array1::from_shape_fn(order + 1, |n| exact_norm_squared(&family, n));
        let quad = gauss_rule(&family, order + 1)?;
        let mut basis = Self {
            family,
            order,
            recurrence,
            norms,
            psi: Array2::zeros((0, order + 1)),
            quad,
            germ: Germ::new(&family)?,
            seed: DEFAULT_SEED,
            rng: StdRng::seed_from_u64(DEFAULT_SEED),
        };
        basis.psi = basis.evaluate_at_points(&basis.quad.points);
        Ok(basis)
    }

    pub fn family(&self) -> &BasisFamily {
        &self.family
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Rebinds the quadrature rule and re-tabulates the basis on it.
    pub fn init_quadrature(&mut self, init: QuadInit) -> UqResult<()> {
        let quad = match init {
            QuadInit::Gauss(n) => gauss_rule(&self.family, n)?,
            QuadInit::Level(kind, level) => RuleFamily::for_basis(kind, &self.family, level)?
                .rule(level)?
                .clone(),
            QuadInit::Custom(points, weights) => {
                if points.len() != weights.len() {
                    return Err(UqError::dimension_mismatch(
                        "custom quadrature weights",
                        points.len(),
                        weights.len(),
                    ));
                }
                let mut pairs: Vec<(f64, f64)> = points.into_iter().zip(weights).collect();
                pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
                let (points, weights) = pairs.into_iter().unzip();
                Rule1d::new(points, weights)?
            }
        };
        self.psi = self.evaluate_at_points(&quad.points);
        self.quad = quad;
        Ok(())
    }

    pub fn quadrature(&self) -> &Rule1d {
        &self.quad
    }

    /// Basis values at the bound quadrature points.
    pub fn values_at_quadrature(&self) -> &Array2<f64> {
        &self.psi
    }

    fn coeffs(&self, n: usize) -> (f64, f64, f64) {
        self.recurrence
            .get(n)
            .copied()
            .unwrap_or_else(|| recurrence_coeffs(&self.family, n))
    }

    /// Writes `P_0(x) ..= P_{m-1}(x)` for `m = out.len()` and returns the
    /// last value (`0.0` for an empty buffer). `m` may exceed `order + 1`.
    pub fn evaluate_into(&self, x: f64, out: &mut [f64]) -> f64 {
        let m = out.len();
        if m == 0 {
            return 0.0;
        }
        out[0] = 1.0;
        for n in 0..m - 1 {
            let (a, b, c) = self.coeffs(n);
            let prev = if n > 0 { out[n - 1] } else { 0.0 };
            out[n + 1] = (a * x + b) * out[n] - c * prev;
        }
        out[m - 1]
    }

    pub fn evaluate(&self, x: f64) -> Array1<f64> {
        let mut out = vec![0.0; self.order + 1];
        self.evaluate_into(x, &mut out);
        Array1::from_vec(out)
    }

    /// Values, first and second derivatives of degrees `0..values.len()`.
    /// All three buffers must have the same length.
    pub fn evaluate_with_derivatives(
        &self,
        x: f64,
        values: &mut [f64],
        first: &mut [f64],
        second: &mut [f64],
    ) {
        let m = values.len().min(first.len()).min(second.len());
        if m == 0 {
            return;
        }
        values[0] = 1.0;
        first[0] = 0.0;
        second[0] = 0.0;
        for n in 0..m - 1 {
            let (a, b, c) = self.coeffs(n);
            let lin = a * x + b;
            let (v0, d0, s0) = if n > 0 {
                (values[n - 1], first[n - 1], second[n - 1])
            } else {
                (0.0, 0.0, 0.0)
            };
            values[n + 1] = lin * values[n] - c * v0;
            first[n + 1] = a * values[n] + lin * first[n] - c * d0;
            second[n + 1] = 2.0 * a * first[n] + lin * second[n] - c * s0;
        }
    }

    pub fn evaluate_derivative(&self, x: f64) -> Array1<f64> {
        self.derivatives(x).1
    }

    pub fn evaluate_second_derivative(&self, x: f64) -> Array1<f64> {
        self.derivatives(x).2
    }

    fn derivatives(&self, x: f64) -> (Array1<f64>, Array1<f64>, Array1<f64>) {
        let m = self.order + 1;
        let (mut v, mut d1, mut d2) = (vec![0.0; m], vec![0.0; m], vec![0.0; m]);
        self.evaluate_with_derivatives(x, &mut v, &mut d1, &mut d2);
        (v.into(), d1.into(), d2.into())
    }

    /// `n_points × (order + 1)` basis values.
    pub fn evaluate_at_points(&self, points: &[f64]) -> Array2<f64> {
        let mut out = Array2::zeros((points.len(), self.order + 1));
        let mut row = vec![0.0; self.order + 1];
        for (i, &x) in points.iter().enumerate() {
            self.evaluate_into(x, &mut row);
            out.row_mut(i).assign(&ndarray::ArrayView1::from(&row[..]));
        }
        out
    }

    pub fn derivative_at_points(&self, points: &[f64]) -> Array2<f64> {
        let mut out = Array2::zeros((points.len(), self.order + 1));
        for (i, &x) in points.iter().enumerate() {
            out.row_mut(i).assign(&self.evaluate_derivative(x));
        }
        out
    }

    pub fn second_derivative_at_points(&self, points: &[f64]) -> Array2<f64> {
        let mut out = Array2::zeros((points.len(), self.order + 1));
        for (i, &x) in points.iter().enumerate() {
            out.row_mut(i).assign(&self.evaluate_second_derivative(x));
        }
        out
    }

    /// Exact `E[P_n²]`; defined for any `n`, not just `n <= order`.
    pub fn norm_squared(&self, n: usize) -> f64 {
        match self.norms.get(n) {
            Some(&v) => v,
            None => exact_norm_squared(&self.family, n),
        }
    }

    pub fn norms_squared(&self) -> &Array1<f64> {
        &self.norms
    }

    /// `Σ_q w_q P_n(x_q)²` over the bound rule.
    pub fn norms_squared_quadrature(&self) -> Array1<f64> {
        let w = Array1::from_vec(self.quad.weights.clone());
        self.psi.mapv(|v| v * v).t().dot(&w)
    }

    /// True when every quadrature norm is within `rtol` of the exact one.
    pub fn check_norms(&self, rtol: f64) -> bool {
        let mut ok = true;
        for (n, (num, exact)) in self
            .norms_squared_quadrature()
            .iter()
            .zip(self.norms.iter())
            .enumerate()
        {
            let rel = (num - exact).abs() / exact.abs();
            if rel.is_nan() || rel > rtol {
                log::warn!(
                    "{} degree {n}: quadrature norm {num:e} vs exact {exact:e} (rel {rel:e})",
                    self.family
                );
                ok = false;
            }
        }
        ok
    }

    pub fn contains(&self, x: f64) -> bool {
        self.family.contains(x)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restarts the random stream from `seed`.
    pub fn seed_rng(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// One germ variate from the basis' own stream.
    pub fn sample(&mut self) -> f64 {
        self.germ.sample(&mut self.rng)
    }

    pub fn sample_into(&mut self, out: &mut [f64]) {
        for v in out.iter_mut() {
            *v = self.germ.sample(&mut self.rng);
        }
    }

    pub fn sample_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.germ.sample(rng)
    }
}
