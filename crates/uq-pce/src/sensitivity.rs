// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Sensitivity Indices
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Moments and variance-based (Sobol) sensitivity indices read directly
//! off PC coefficients.

use crate::pcset::PcSet;
use ndarray::{Array1, Array2};
use uq_types::error::UqResult;

/// Variances below this are treated as a deterministic output.
const MIN_VARIANCE: f64 = 1e-16;

impl PcSet {
    pub fn mean(&self, coeffs: &Array1<f64>) -> UqResult<f64> {
        self.check_coeffs(coeffs)?;
        Ok(coeffs[self.mean_index()?])
    }

    /// `Σ_{k ≠ 0} c_k² ‖Ψ_k‖²`.
    pub fn variance(&self, coeffs: &Array1<f64>) -> UqResult<f64> {
        Ok(self.term_variances(coeffs)?.sum())
    }

    /// Contribution of each term to the variance; zero for the mean term.
    fn term_variances(&self, coeffs: &Array1<f64>) -> UqResult<Array1<f64>> {
        self.check_coeffs(coeffs)?;
        let zero = self.multi_index.zero_term();
        Ok(Array1::from_shape_fn(self.len(), |k| {
            if Some(k) == zero {
                0.0
            } else {
                coeffs[k] * coeffs[k] * self.norms[k]
            }
        }))
    }

    /// Share of the variance carried by each term.
    pub fn variance_fractions(&self, coeffs: &Array1<f64>) -> UqResult<Array1<f64>> {
        let parts = self.term_variances(coeffs)?;
        let total = parts.sum();
        if total <= MIN_VARIANCE {
            return Ok(Array1::zeros(self.len()));
        }
        Ok(parts / total)
    }

    /// First-order indices: terms whose only active dimension is `d`.
    pub fn main_sensitivity(&self, coeffs: &Array1<f64>) -> UqResult<Array1<f64>> {
        let fractions = self.variance_fractions(coeffs)?;
        let mut main = Array1::zeros(self.dim());
        for (k, f) in fractions.iter().enumerate() {
            if let [d] = self.multi_index.active_dims(k)[..] {
                main[d] += f;
            }
        }
        Ok(main)
    }

    /// Total indices: every term in which dimension `d` is active.
    pub fn total_sensitivity(&self, coeffs: &Array1<f64>) -> UqResult<Array1<f64>> {
        let fractions = self.variance_fractions(coeffs)?;
        let mut total = Array1::zeros(self.dim());
        for (k, f) in fractions.iter().enumerate() {
            for d in self.multi_index.active_dims(k) {
                total[d] += f;
            }
        }
        Ok(total)
    }

    /// Symmetric `dim × dim` matrix; entry `(i, j)` sums the terms in which
    /// both `i` and `j` are active. The diagonal is zero.
    pub fn joint_sensitivity(&self, coeffs: &Array1<f64>) -> UqResult<Array2<f64>> {
        let fractions = self.variance_fractions(coeffs)?;
        let dim = self.dim();
        let mut joint = Array2::zeros((dim, dim));
        for (k, &f) in fractions.iter().enumerate() {
            if f == 0.0 {
                continue;
            }
            let active = self.multi_index.active_dims(k);
            for (a, &i) in active.iter().enumerate() {
                for &j in &active[a + 1..] {
                    joint[[i, j]] += f;
                    joint[[j, i]] += f;
                }
            }
        }
        Ok(joint)
    }
}
