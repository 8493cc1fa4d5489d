// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Projection
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Computing PC coefficients from function samples.

use crate::pcset::PcSet;
use ndarray::{Array1, Array2, ArrayView1};
use uq_math::linalg::pinv_svd;
use uq_types::error::{UqError, UqResult};

/// Relative singular-value cutoff of the regression pseudo-inverse.
const LSQ_RCOND: f64 = 1e-10;

fn check_finite(values: &Array1<f64>, what: &str) -> UqResult<()> {
    if !values.iter().all(|v| v.is_finite()) {
        return Err(UqError::ConfigError(format!(
            "{what} contain non-finite values"
        )));
    }
    Ok(())
}

impl PcSet {
    /// `c_k = Σ_q w_q f(x_q) Ψ_k(x_q) / ‖Ψ_k‖²` over the bound quadrature;
    /// `samples[q]` is `f` at quadrature point `q`.
    pub fn galerkin_projection(&self, samples: &Array1<f64>) -> UqResult<Array1<f64>> {
        let (rule, psi) = self.bound_quadrature()?;
        if samples.len() != rule.len() {
            return Err(UqError::dimension_mismatch(
                "samples at quadrature points",
                rule.len(),
                samples.len(),
            ));
        }
        check_finite(samples, "projection samples")?;
        let wf = rule.weights() * samples;
        Ok(psi.t().dot(&wf) / &self.norms)
    }

    /// Samples `f` at the bound quadrature points and projects it.
    pub fn project_function<F>(&self, f: F) -> UqResult<Array1<f64>>
    where
        F: Fn(ArrayView1<'_, f64>) -> f64,
    {
        let (rule, _) = self.bound_quadrature()?;
        let samples = Array1::from_iter(rule.points().rows().into_iter().map(f));
        self.galerkin_projection(&samples)
    }

    /// Monte-Carlo projection: plain sample averages over germ samples
    /// `points` instead of quadrature weights.
    pub fn galerkin_projection_mc(
        &self,
        points: &Array2<f64>,
        samples: &Array1<f64>,
    ) -> UqResult<Array1<f64>> {
        if points.nrows() != samples.len() {
            return Err(UqError::dimension_mismatch(
                "Monte-Carlo samples",
                points.nrows(),
                samples.len(),
            ));
        }
        if samples.is_empty() {
            return Err(UqError::ConfigError(
                "Monte-Carlo projection needs at least one sample".to_string(),
            ));
        }
        check_finite(samples, "projection samples")?;
        let psi = self.evaluate_basis_at_points(points)?;
        let n = samples.len() as f64;
        Ok(psi.t().dot(samples) / n / &self.norms)
    }

    /// Least-squares fit of the coefficients to scattered samples through
    /// an SVD pseudo-inverse of the basis matrix.
    pub fn least_squares(&self, points: &Array2<f64>, samples: &Array1<f64>) -> UqResult<Array1<f64>> {
        if points.nrows() != samples.len() {
            return Err(UqError::dimension_mismatch(
                "regression samples",
                points.nrows(),
                samples.len(),
            ));
        }
        check_finite(samples, "regression samples")?;
        let design = self.evaluate_basis_at_points(points)?;
        let pinv = pinv_svd(&design, LSQ_RCOND)?;
        let coeffs = pinv.dot(samples);
        if !coeffs.iter().all(|v| v.is_finite()) {
            return Err(UqError::LinAlg(
                "PC regression coefficients contain non-finite values".to_string(),
            ));
        }
        Ok(coeffs)
    }

    /// `E[Ψ_k²]` integrated with the bound quadrature.
    pub fn norms_squared_quadrature(&self) -> UqResult<Array1<f64>> {
        let (rule, psi) = self.bound_quadrature()?;
        Ok(psi.mapv(|v| v * v).t().dot(rule.weights()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use uq_math::quad::QuadRule;
    use uq_types::family::{BasisFamily, GridType};

    fn cubic(x: ArrayView1<'_, f64>) -> f64 {
        1.0 - x[0] + 0.5 * x[0] * x[1] + x[1] * x[1] * x[1]
    }

    #[test]
    fn test_projection_round_trip() {
        for fam in [BasisFamily::legendre(), BasisFamily::hermite()] {
            let mut set = PcSet::new(fam, 3, 2).unwrap();
            set.bind_default_quadrature(GridType::Sparse, 3).unwrap();
            let c = set.project_function(cubic).unwrap();
            let pts = array![[0.1, -0.7], [0.9, 0.3], [-0.4, 0.0]];
            let back = set.evaluate_batch(&c, &pts).unwrap();
            for (i, row) in pts.rows().into_iter().enumerate() {
                assert!((back[i] - cubic(row)).abs() < 1e-10, "{fam} point {i}");
            }
        }
    }

    #[test]
    fn test_projection_needs_quadrature() {
        let set = PcSet::new(BasisFamily::legendre(), 2, 1).unwrap();
        match set.galerkin_projection(&array![1.0]) {
            Err(UqError::ConfigError(msg)) => assert!(msg.contains("quadrature")),
            other => panic!("Expected ConfigError without quadrature, got {other:?}"),
        }
    }

    #[test]
    fn test_projection_rejects_wrong_sample_count() {
        let mut set = PcSet::new(BasisFamily::legendre(), 2, 1).unwrap();
        set.bind_quadrature(QuadRule::full(&[BasisFamily::legendre()], 4).unwrap())
            .unwrap();
        assert!(matches!(
            set.galerkin_projection(&Array1::ones(3)),
            Err(UqError::DimensionMismatch { expected: 4, found: 3, .. })
        ));
        let mut bad = Array1::ones(4);
        bad[2] = f64::NAN;
        assert!(set.galerkin_projection(&bad).is_err());
    }

    #[test]
    fn test_least_squares_recovers_polynomial() {
        let set = PcSet::new(BasisFamily::legendre(), 3, 2).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let pts = set.draw_germ_samples_with_rng(60, &mut rng);
        let y = Array1::from_iter(pts.rows().into_iter().map(cubic));
        let c_ls = set.least_squares(&pts, &y).unwrap();

        let mut quad_set = set.clone();
        quad_set
            .bind_default_quadrature(GridType::Full, 4)
            .unwrap();
        let c_q = quad_set.project_function(cubic).unwrap();
        for (a, b) in c_ls.iter().zip(c_q.iter()) {
            assert!((a - b).abs() < 1e-8, "{a} vs {b}");
        }
    }

    #[test]
    fn test_mc_projection_mean() {
        let mut set = PcSet::new(BasisFamily::hermite(), 2, 1).unwrap();
        set.seed_basis_rngs(7);
        let pts = set.draw_germ_samples(40_000);
        // f = 2 + He_2
        let y = Array1::from_iter(pts.column(0).iter().map(|x| 2.0 + x * x - 1.0));
        let c = set.galerkin_projection_mc(&pts, &y).unwrap();
        assert!((c[0] - 2.0).abs() < 0.05);
        assert!((c[2] - 1.0).abs() < 0.1);
        assert!(set
            .galerkin_projection_mc(&Array2::zeros((0, 1)), &Array1::zeros(0))
            .is_err());
    }

    #[test]
    fn test_quadrature_norms_match_exact() {
        let mut set = PcSet::new(BasisFamily::jacobi(0.5, 1.5).unwrap(), 3, 2).unwrap();
        set.bind_default_quadrature(GridType::Full, 4).unwrap();
        let num = set.norms_squared_quadrature().unwrap();
        for (a, b) in num.iter().zip(set.norms_squared().iter()) {
            assert!((a - b).abs() < 1e-10 * b);
        }
    }
}
