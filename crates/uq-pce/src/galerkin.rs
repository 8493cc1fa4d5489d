// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Galerkin Arithmetic
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Intrusive arithmetic on PC coefficient vectors.
//!
//! Products are Galerkin projections through the triple (or quadruple)
//! product tensor. `exp` and `log` follow the set's [`LogCompMethod`]:
//! a truncated Taylor series of the zero-mean part, or numerical
//! integration in a pseudo-time variable (RK4 for `exp`, Gauss–Legendre
//! for `log`). Both compute the same Galerkin operator; they differ only
//! in discretisation error and cost.

use crate::pcset::PcSet;
use ndarray::{Array1, Array2};
use uq_math::gauss::gauss_rule;
use uq_math::linalg::solve_dense;
use uq_types::error::{ensure_terms, UqError, UqResult};
use uq_types::family::{BasisFamily, LogCompMethod};

fn series_failure(op: &str, iterations: usize, residual: f64) -> UqError {
    log::warn!(
        "{op}: Taylor series did not converge after {iterations} terms \
         (relative change {residual:e})"
    );
    UqError::ConvergenceFailure {
        iterations,
        residual,
    }
}

impl PcSet {
    pub(crate) fn mean_index(&self) -> UqResult<usize> {
        self.multi_index.zero_term().ok_or_else(|| {
            UqError::UnsupportedOperation("multi-index has no zero (mean) term".to_string())
        })
    }

    /// Mean-square norm `sqrt(Σ c_k² ‖Ψ_k‖²)` of an expansion.
    fn l2_norm(&self, a: &Array1<f64>) -> f64 {
        a.iter()
            .zip(self.norms.iter())
            .map(|(c, n)| c * c * n)
            .sum::<f64>()
            .sqrt()
    }

    /// Expansion of the constant 1.
    pub fn unit(&self) -> UqResult<Array1<f64>> {
        let mut u = Array1::zeros(self.len());
        u[self.mean_index()?] = 1.0;
        Ok(u)
    }

    pub fn add(&self, a: &Array1<f64>, b: &Array1<f64>) -> UqResult<Array1<f64>> {
        self.check_coeffs(a)?;
        self.check_coeffs(b)?;
        Ok(a + b)
    }

    pub fn subtract(&self, a: &Array1<f64>, b: &Array1<f64>) -> UqResult<Array1<f64>> {
        self.check_coeffs(a)?;
        self.check_coeffs(b)?;
        Ok(a - b)
    }

    pub fn scale(&self, a: &Array1<f64>, s: f64) -> UqResult<Array1<f64>> {
        self.check_coeffs(a)?;
        Ok(a * s)
    }

    pub fn add_in_place(&self, a: &mut Array1<f64>, b: &Array1<f64>) -> UqResult<()> {
        self.check_coeffs(a)?;
        self.check_coeffs(b)?;
        *a += b;
        Ok(())
    }

    pub fn subtract_in_place(&self, a: &mut Array1<f64>, b: &Array1<f64>) -> UqResult<()> {
        self.check_coeffs(a)?;
        self.check_coeffs(b)?;
        *a -= b;
        Ok(())
    }

    pub fn scale_in_place(&self, a: &mut Array1<f64>, s: f64) -> UqResult<()> {
        self.check_coeffs(a)?;
        *a *= s;
        Ok(())
    }

    /// Galerkin product into a caller buffer of `len()` values.
    pub fn product_into(
        &self,
        a: &Array1<f64>,
        b: &Array1<f64>,
        out: &mut Array1<f64>,
    ) -> UqResult<()> {
        self.check_coeffs(a)?;
        self.check_coeffs(b)?;
        ensure_terms(self.len(), out.len())?;
        let tp = self.triple_product();
        for (k, o) in out.iter_mut().enumerate() {
            let acc: f64 = tp
                .entries(k)
                .iter()
                .map(|&(i, j, v)| a[i] * b[j] * v)
                .sum();
            *o = acc / self.norms[k];
        }
        Ok(())
    }

    /// `(a·b)_k = Σ_{i,j} a_i b_j ⟨Ψ_i Ψ_j Ψ_k⟩ / ‖Ψ_k‖²`.
    pub fn product(&self, a: &Array1<f64>, b: &Array1<f64>) -> UqResult<Array1<f64>> {
        let mut out = Array1::zeros(self.len());
        self.product_into(a, b, &mut out)?;
        Ok(out)
    }

    pub fn product_in_place(&self, a: &mut Array1<f64>, b: &Array1<f64>) -> UqResult<()> {
        let p = self.product(a, b)?;
        a.assign(&p);
        Ok(())
    }

    /// Three-factor product through the quadruple product tensor.
    pub fn product3(
        &self,
        a: &Array1<f64>,
        b: &Array1<f64>,
        c: &Array1<f64>,
    ) -> UqResult<Array1<f64>> {
        self.check_coeffs(a)?;
        self.check_coeffs(b)?;
        self.check_coeffs(c)?;
        let qp = self.quad_product();
        Ok(Array1::from_shape_fn(self.len(), |k| {
            let acc: f64 = qp
                .entries(k)
                .iter()
                .map(|&(i, j, l, v)| a[i] * b[j] * c[l] * v)
                .sum();
            acc / self.norms[k]
        }))
    }

    /// `Σ_n poly[n] a^n` by Horner's scheme.
    pub fn polynomial(&self, a: &Array1<f64>, poly: &[f64]) -> UqResult<Array1<f64>> {
        self.check_coeffs(a)?;
        let unit = self.unit()?;
        let Some((&top, rest)) = poly.split_last() else {
            return Ok(Array1::zeros(self.len()));
        };
        let mut acc = &unit * top;
        for &p in rest.iter().rev() {
            acc = self.product(&acc, a)?;
            acc.scaled_add(p, &unit);
        }
        Ok(acc)
    }

    /// `a^n` by repeated squaring.
    pub fn ipow(&self, a: &Array1<f64>, n: u32) -> UqResult<Array1<f64>> {
        self.check_coeffs(a)?;
        let mut result = self.unit()?;
        let mut base = a.clone();
        let mut e = n;
        while e > 0 {
            if e & 1 == 1 {
                result = self.product(&result, &base)?;
            }
            e >>= 1;
            if e > 0 {
                base = self.product(&base, &base)?;
            }
        }
        Ok(result)
    }

    /// `a^e = exp(e log a)`; needs a positive mean.
    pub fn power(&self, a: &Array1<f64>, exponent: f64) -> UqResult<Array1<f64>> {
        let log_a = self.log(a)?;
        self.exp(&(log_a * exponent))
    }

    /// Solves the Galerkin system `b · x = a` for `x`.
    pub fn divide(&self, a: &Array1<f64>, b: &Array1<f64>) -> UqResult<Array1<f64>> {
        self.check_coeffs(a)?;
        self.check_coeffs(b)?;
        let n = self.len();
        let tp = self.triple_product();
        let mut system = Array2::zeros((n, n));
        for k in 0..n {
            for &(i, j, v) in tp.entries(k) {
                system[[k, j]] += b[i] * v / self.norms[k];
            }
        }
        solve_dense(&system, a)
    }

    pub fn inverse(&self, b: &Array1<f64>) -> UqResult<Array1<f64>> {
        self.divide(&self.unit()?, b)
    }

    pub fn exp(&self, a: &Array1<f64>) -> UqResult<Array1<f64>> {
        self.check_coeffs(a)?;
        match self.arithmetic.method {
            LogCompMethod::TaylorSeries => self.exp_taylor(a),
            LogCompMethod::Integration => self.exp_integration(a),
        }
    }

    /// Natural logarithm; the mean of `a` must be positive.
    pub fn log(&self, a: &Array1<f64>) -> UqResult<Array1<f64>> {
        self.check_coeffs(a)?;
        let m = self.mean_index()?;
        if a[m].is_nan() || a[m] <= 0.0 {
            return Err(UqError::UnsupportedOperation(format!(
                "log of a PC expansion with non-positive mean {}",
                a[m]
            )));
        }
        match self.arithmetic.method {
            LogCompMethod::TaylorSeries => self.log_taylor(a, m),
            LogCompMethod::Integration => self.log_integration(a, m),
        }
    }

    pub fn log10(&self, a: &Array1<f64>) -> UqResult<Array1<f64>> {
        Ok(self.log(a)? / std::f64::consts::LN_10)
    }

    /// `exp(a_0) Σ_n d^n / n!` with `d` the zero-mean part of `a`.
    fn exp_taylor(&self, a: &Array1<f64>) -> UqResult<Array1<f64>> {
        let m = self.mean_index()?;
        let scale = a[m].exp();
        let mut d = a.clone();
        d[m] = 0.0;
        let mut sum = self.unit()?;
        if d.iter().all(|&v| v == 0.0) {
            return Ok(sum * scale);
        }
        let mut term = sum.clone();
        let mut residual = f64::INFINITY;
        for n in 1..=self.arithmetic.taylor_max_terms {
            term = self.product(&term, &d)? / n as f64;
            sum += &term;
            residual = self.l2_norm(&term) / self.l2_norm(&sum);
            if residual < self.arithmetic.taylor_tolerance {
                return Ok(sum * scale);
            }
        }
        Err(series_failure(
            "exp",
            self.arithmetic.taylor_max_terms,
            residual,
        ))
    }

    /// `log(a_0) + Σ_n (-1)^{n+1} x^n / n` with `x = (a - a_0) / a_0`.
    fn log_taylor(&self, a: &Array1<f64>, m: usize) -> UqResult<Array1<f64>> {
        let a0 = a[m];
        let mut x = a / a0;
        x[m] = 0.0;
        let mut sum = Array1::zeros(self.len());
        if x.iter().all(|&v| v == 0.0) {
            sum[m] = a0.ln();
            return Ok(sum);
        }
        let mut power = self.unit()?;
        let mut residual = f64::INFINITY;
        for n in 1..=self.arithmetic.taylor_max_terms {
            power = self.product(&power, &x)?;
            let sign = if n % 2 == 1 { 1.0 } else { -1.0 };
            let term = &power * (sign / n as f64);
            sum += &term;
            residual = self.l2_norm(&term) / self.l2_norm(&sum);
            if residual < self.arithmetic.taylor_tolerance {
                sum[m] += a0.ln();
                return Ok(sum);
            }
        }
        Err(series_failure(
            "log",
            self.arithmetic.taylor_max_terms,
            residual,
        ))
    }

    /// RK4 on `y' = d · y`, `y(0) = exp(a_0)`, integrated to `t = 1`.
    fn exp_integration(&self, a: &Array1<f64>) -> UqResult<Array1<f64>> {
        let m = self.mean_index()?;
        let mut d = a.clone();
        d[m] = 0.0;
        let mut y = self.unit()? * a[m].exp();
        let steps = self.arithmetic.integration_points;
        let h = 1.0 / steps as f64;
        for _ in 0..steps {
            let k1 = self.product(&d, &y)?;
            let k2 = self.product(&d, &(&y + &(&k1 * (0.5 * h))))?;
            let k3 = self.product(&d, &(&y + &(&k2 * (0.5 * h))))?;
            let k4 = self.product(&d, &(&y + &(&k3 * h)))?;
            y = y + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (h / 6.0);
        }
        Ok(y)
    }

    /// `log(a_0) + ∫_0^1 d / (a_0 + t d) dt` by Gauss–Legendre quadrature,
    /// one Galerkin division per node.
    fn log_integration(&self, a: &Array1<f64>, m: usize) -> UqResult<Array1<f64>> {
        let a0 = a[m];
        let mut d = a.clone();
        d[m] = 0.0;
        let rule = gauss_rule(&BasisFamily::legendre(), self.arithmetic.integration_points)?;
        let unit = self.unit()?;
        let mut sum = Array1::zeros(self.len());
        for (&x, &w) in rule.points.iter().zip(&rule.weights) {
            let t = 0.5 * (x + 1.0);
            let denom = &unit * a0 + &d * t;
            let q = self.divide(&d, &denom)?;
            sum.scaled_add(w, &q);
        }
        sum[m] += a0.ln();
        Ok(sum)
    }

    /// Coefficients of `d/dx` of a one-dimensional expansion.
    pub fn derivative(&self, a: &Array1<f64>) -> UqResult<Array1<f64>> {
        self.check_coeffs(a)?;
        if self.dim() != 1 {
            return Err(UqError::UnsupportedOperation(format!(
                "derivative is only defined for one-dimensional PC sets, not dim {}",
                self.dim()
            )));
        }
        let basis = &self.bases[0];
        let rule = &self.products.rules[0];
        let degrees: Vec<usize> = self.multi_index.iter().map(|t| t[0]).collect();
        let mut out = Array1::zeros(self.len());
        for (q, (&x, &w)) in rule.points.iter().zip(&rule.weights).enumerate() {
            let dpsi = basis.evaluate_derivative(x);
            let slope: f64 = degrees.iter().zip(a.iter()).map(|(&p, c)| c * dpsi[p]).sum();
            for (j, &p) in degrees.iter().enumerate() {
                out[j] += w * slope * rule.values[[q, p]];
            }
        }
        Ok(out / &self.norms)
    }

    /// Expansion with the given mean and standard deviation carried by the
    /// first-order term of dimension 0.
    pub fn init_mean_std(&self, mean: f64, std: f64) -> UqResult<Array1<f64>> {
        let m = self.mean_index()?;
        let mut first = vec![0usize; self.dim()];
        first[0] = 1;
        let k = self.multi_index.encode(&first).ok_or_else(|| {
            UqError::UnsupportedOperation(
                "multi-index has no first-order term in dimension 0".to_string(),
            )
        })?;
        let mut c = Array1::zeros(self.len());
        c[m] = mean;
        c[k] = std / self.norms[k].sqrt();
        Ok(c)
    }

    pub fn std_dev(&self, a: &Array1<f64>) -> UqResult<f64> {
        Ok(self.variance(a)?.sqrt())
    }

    /// Root mean square of the non-mean coefficients.
    pub fn modes_rms(&self, a: &Array1<f64>) -> UqResult<f64> {
        self.check_coeffs(a)?;
        let m = self.mean_index()?;
        if self.len() < 2 {
            return Ok(0.0);
        }
        let sum: f64 = a
            .iter()
            .enumerate()
            .filter(|&(k, _)| k != m)
            .map(|(_, c)| c * c)
            .sum();
        Ok((sum / (self.len() - 1) as f64).sqrt())
    }
}
