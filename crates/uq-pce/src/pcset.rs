// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — PC Set
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Multivariate PC basis `Ψ_k(x) = Π_d P^{(d)}_{α_kd}(x_d)` and the
//! operations on coefficient vectors over it.
//!
//! Projection, Galerkin arithmetic and sensitivities live in their own
//! modules as further `impl PcSet` blocks.

use crate::basis::PcBasis;
use crate::multiindex::MultiIndex;
use crate::products::{ProductCache, QuadProduct, TripleProduct};
use ndarray::{Array1, Array2, Array3, ArrayView1};
use rand::Rng;
use uq_math::quad::QuadRule;
use uq_types::config::{ArithmeticConfig, PcSetConfig, QuadConfig};
use uq_types::error::{ensure_terms, UqError, UqResult};
use uq_types::family::{BasisFamily, GridType, RuleKind};

/// Per-dimension values and derivatives at one point, indexed `[d][degree]`.
struct Tabulation {
    values: Vec<Vec<f64>>,
    first: Vec<Vec<f64>>,
    second: Vec<Vec<f64>>,
}

/// Multivariate PC basis with its multi-index, norms, optional bound
/// quadrature and arithmetic strategy.
#[derive(Debug, Clone)]
pub struct PcSet {
    pub(crate) multi_index: MultiIndex,
    pub(crate) bases: Vec<PcBasis>,
    pub(crate) norms: Array1<f64>,
    pub(crate) arithmetic: ArithmeticConfig,
    pub(crate) quadrature: Option<QuadRule>,
    /// Basis values at the bound quadrature points, `n_points × n_terms`.
    pub(crate) quad_psi: Option<Array2<f64>>,
    pub(crate) products: ProductCache,
}

impl PcSet {
    /// Total-order set of the given order over `dim` copies of `family`.
    pub fn new(family: BasisFamily, order: usize, dim: usize) -> UqResult<Self> {
        if dim == 0 {
            return Err(UqError::InvalidDimension(
                "PC set needs at least one stochastic dimension".to_string(),
            ));
        }
        Self::with_multi_index(MultiIndex::total_order(dim, order)?, family)
    }

    pub fn with_multi_index(multi_index: MultiIndex, family: BasisFamily) -> UqResult<Self> {
        let families = vec![family; multi_index.dim()];
        Self::with_families(multi_index, families)
    }

    /// One family per dimension.
    pub fn with_families(multi_index: MultiIndex, families: Vec<BasisFamily>) -> UqResult<Self> {
        if families.len() != multi_index.dim() {
            return Err(UqError::dimension_mismatch(
                "basis families",
                multi_index.dim(),
                families.len(),
            ));
        }
        let bases = families
            .into_iter()
            .zip(multi_index.max_degree_per_dim())
            .map(|(fam, p)| PcBasis::new(fam, p))
            .collect::<UqResult<Vec<_>>>()?;
        let norms = Array1::from_shape_fn(multi_index.len(), |k| {
            multi_index
                .term(k)
                .iter()
                .zip(&bases)
                .map(|(&a, b)| b.norm_squared(a))
                .product()
        });
        let products = ProductCache::new(&bases)?;
        log::debug!(
            "PC set: {} terms, dim {}, order {}",
            multi_index.len(),
            multi_index.dim(),
            multi_index.order()
        );
        Ok(Self {
            multi_index,
            bases,
            norms,
            arithmetic: ArithmeticConfig::default(),
            quadrature: None,
            quad_psi: None,
            products,
        })
    }

    /// Total-order set with arithmetic, optional quadrature and seed from
    /// `config`.
    pub fn from_config(config: &PcSetConfig) -> UqResult<Self> {
        config.validate()?;
        let mut set = Self::new(config.family(), config.order, config.dim)?
            .with_arithmetic(config.arithmetic)?;
        if let Some(quad) = &config.quadrature {
            set.bind_quadrature_config(quad)?;
        }
        set.seed_basis_rngs(config.seed);
        Ok(set)
    }

    pub fn with_arithmetic(mut self, arithmetic: ArithmeticConfig) -> UqResult<Self> {
        arithmetic.validate()?;
        self.arithmetic = arithmetic;
        Ok(self)
    }

    /// Binds `rule` for projection and tabulates the basis on its points.
    pub fn bind_quadrature(&mut self, rule: QuadRule) -> UqResult<()> {
        if rule.dim() != self.dim() {
            return Err(UqError::dimension_mismatch(
                "quadrature points",
                self.dim(),
                rule.dim(),
            ));
        }
        let psi = self.evaluate_basis_at_points(rule.points())?;
        log::debug!("PC set: bound {}-point quadrature", rule.len());
        self.quad_psi = Some(psi);
        self.quadrature = Some(rule);
        Ok(())
    }

    pub fn bind_quadrature_config(&mut self, config: &QuadConfig) -> UqResult<()> {
        let rule = QuadRule::from_config(&self.families(), config)?;
        self.bind_quadrature(rule)
    }

    /// Gauss-based full or sparse grid over the set's own families.
    pub fn bind_default_quadrature(&mut self, grid: GridType, param: usize) -> UqResult<()> {
        self.bind_quadrature_config(&QuadConfig {
            grid,
            param,
            rule: RuleKind::Gauss,
        })
    }

    pub fn dim(&self) -> usize {
        self.multi_index.dim()
    }

    pub fn order(&self) -> usize {
        self.multi_index.order()
    }

    /// Number of PC terms.
    pub fn len(&self) -> usize {
        self.multi_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.multi_index.is_empty()
    }

    pub fn multi_index(&self) -> &MultiIndex {
        &self.multi_index
    }

    pub fn bases(&self) -> &[PcBasis] {
        &self.bases
    }

    pub fn families(&self) -> Vec<BasisFamily> {
        self.bases.iter().map(|b| *b.family()).collect()
    }

    /// `E[Ψ_k²]` from the exact 1D norms.
    pub fn norms_squared(&self) -> &Array1<f64> {
        &self.norms
    }

    pub fn quadrature(&self) -> Option<&QuadRule> {
        self.quadrature.as_ref()
    }

    /// Basis values at the bound quadrature points.
    pub fn basis_at_quadrature(&self) -> Option<&Array2<f64>> {
        self.quad_psi.as_ref()
    }

    pub fn arithmetic(&self) -> &ArithmeticConfig {
        &self.arithmetic
    }

    pub fn triple_product(&self) -> &TripleProduct {
        self.products.triple(&self.multi_index, &self.norms)
    }

    pub fn quad_product(&self) -> &QuadProduct {
        self.products.quad(&self.multi_index, &self.norms)
    }

    pub(crate) fn bound_quadrature(&self) -> UqResult<(&QuadRule, &Array2<f64>)> {
        match (&self.quadrature, &self.quad_psi) {
            (Some(rule), Some(psi)) => Ok((rule, psi)),
            _ => Err(UqError::ConfigError(
                "PC set has no quadrature bound".to_string(),
            )),
        }
    }

    pub(crate) fn check_coeffs(&self, coeffs: &Array1<f64>) -> UqResult<()> {
        ensure_terms(self.len(), coeffs.len())
    }

    fn check_point(&self, point: &ArrayView1<'_, f64>) -> UqResult<()> {
        if point.len() != self.dim() {
            return Err(UqError::dimension_mismatch(
                "PC evaluation point",
                self.dim(),
                point.len(),
            ));
        }
        Ok(())
    }

    fn check_points(&self, points: &Array2<f64>) -> UqResult<()> {
        if points.ncols() != self.dim() {
            return Err(UqError::dimension_mismatch(
                "PC evaluation points",
                self.dim(),
                points.ncols(),
            ));
        }
        Ok(())
    }

    fn tabulate(&self, point: &ArrayView1<'_, f64>) -> Vec<Vec<f64>> {
        self.bases
            .iter()
            .zip(point.iter())
            .map(|(b, &x)| {
                let mut v = vec![0.0; b.order() + 1];
                b.evaluate_into(x, &mut v);
                v
            })
            .collect()
    }

    fn tabulate_derivatives(&self, point: &ArrayView1<'_, f64>) -> Tabulation {
        let mut tab = Tabulation {
            values: Vec::with_capacity(self.dim()),
            first: Vec::with_capacity(self.dim()),
            second: Vec::with_capacity(self.dim()),
        };
        for (b, &x) in self.bases.iter().zip(point.iter()) {
            let m = b.order() + 1;
            let (mut v, mut d1, mut d2) = (vec![0.0; m], vec![0.0; m], vec![0.0; m]);
            b.evaluate_with_derivatives(x, &mut v, &mut d1, &mut d2);
            tab.values.push(v);
            tab.first.push(d1);
            tab.second.push(d2);
        }
        tab
    }

    fn basis_row(&self, tab: &[Vec<f64>]) -> Array1<f64> {
        Array1::from_iter(self.multi_index.iter().map(|alpha| {
            alpha
                .iter()
                .enumerate()
                .map(|(d, &a)| tab[d][a])
                .product::<f64>()
        }))
    }

    /// `Ψ_k(point)` for every term.
    pub fn evaluate_basis(&self, point: ArrayView1<'_, f64>) -> UqResult<Array1<f64>> {
        self.check_point(&point)?;
        Ok(self.basis_row(&self.tabulate(&point)))
    }

    /// `n_points × n_terms` basis matrix.
    pub fn evaluate_basis_at_points(&self, points: &Array2<f64>) -> UqResult<Array2<f64>> {
        self.check_points(points)?;
        let mut out = Array2::zeros((points.nrows(), self.len()));
        for (i, x) in points.rows().into_iter().enumerate() {
            out.row_mut(i).assign(&self.basis_row(&self.tabulate(&x)));
        }
        Ok(out)
    }

    /// `Σ_k c_k Ψ_k(point)`.
    pub fn evaluate(&self, coeffs: &Array1<f64>, point: ArrayView1<'_, f64>) -> UqResult<f64> {
        self.check_coeffs(coeffs)?;
        Ok(self.evaluate_basis(point)?.dot(coeffs))
    }

    pub fn evaluate_batch(&self, coeffs: &Array1<f64>, points: &Array2<f64>) -> UqResult<Array1<f64>> {
        self.check_coeffs(coeffs)?;
        Ok(self.evaluate_basis_at_points(points)?.dot(coeffs))
    }

    /// `∂Ψ_k/∂x_d` at `point`, `n_terms × dim`.
    pub fn basis_gradient(&self, point: ArrayView1<'_, f64>) -> UqResult<Array2<f64>> {
        self.check_point(&point)?;
        let tab = self.tabulate_derivatives(&point);
        let dim = self.dim();
        let mut out = Array2::zeros((self.len(), dim));
        for (k, alpha) in self.multi_index.iter().enumerate() {
            for d in 0..dim {
                out[[k, d]] = (0..dim)
                    .map(|m| {
                        if m == d {
                            tab.first[m][alpha[m]]
                        } else {
                            tab.values[m][alpha[m]]
                        }
                    })
                    .product();
            }
        }
        Ok(out)
    }

    /// `∂²Ψ_k/∂x_d∂x_e` at `point`, `n_terms × dim × dim`.
    pub fn basis_hessian(&self, point: ArrayView1<'_, f64>) -> UqResult<Array3<f64>> {
        self.check_point(&point)?;
        let tab = self.tabulate_derivatives(&point);
        let dim = self.dim();
        let mut out = Array3::zeros((self.len(), dim, dim));
        for (k, alpha) in self.multi_index.iter().enumerate() {
            for d in 0..dim {
                for e in d..dim {
                    let v: f64 = (0..dim)
                        .map(|m| {
                            let a = alpha[m];
                            match (m == d, m == e) {
                                (true, true) => tab.second[m][a],
                                (true, false) | (false, true) => tab.first[m][a],
                                (false, false) => tab.values[m][a],
                            }
                        })
                        .product();
                    out[[k, d, e]] = v;
                    out[[k, e, d]] = v;
                }
            }
        }
        Ok(out)
    }

    /// Gradient of the expansion at `point`.
    pub fn gradient(&self, coeffs: &Array1<f64>, point: ArrayView1<'_, f64>) -> UqResult<Array1<f64>> {
        self.check_coeffs(coeffs)?;
        Ok(self.basis_gradient(point)?.t().dot(coeffs))
    }

    /// One gradient row per point, `n_points × dim`.
    pub fn gradient_batch(&self, coeffs: &Array1<f64>, points: &Array2<f64>) -> UqResult<Array2<f64>> {
        self.check_coeffs(coeffs)?;
        self.check_points(points)?;
        let mut out = Array2::zeros((points.nrows(), self.dim()));
        for (i, x) in points.rows().into_iter().enumerate() {
            out.row_mut(i).assign(&self.gradient(coeffs, x)?);
        }
        Ok(out)
    }

    /// Hessian of the expansion at `point`, `dim × dim`.
    pub fn hessian(&self, coeffs: &Array1<f64>, point: ArrayView1<'_, f64>) -> UqResult<Array2<f64>> {
        self.check_coeffs(coeffs)?;
        let h = self.basis_hessian(point)?;
        let dim = self.dim();
        let mut out = Array2::zeros((dim, dim));
        for (k, &c) in coeffs.iter().enumerate() {
            if c == 0.0 {
                continue;
            }
            out.scaled_add(c, &h.index_axis(ndarray::Axis(0), k));
        }
        Ok(out)
    }

    /// Whether `point` lies in the support of every germ density.
    pub fn is_in_domain(&self, point: ArrayView1<'_, f64>) -> UqResult<bool> {
        self.check_point(&point)?;
        Ok(self
            .bases
            .iter()
            .zip(point.iter())
            .all(|(b, &x)| b.contains(x)))
    }

    /// Reseeds every dimension's stream; dimension `d` gets `seed + d`.
    pub fn seed_basis_rngs(&mut self, seed: u64) {
        for (d, b) in self.bases.iter_mut().enumerate() {
            b.seed_rng(seed.wrapping_add(d as u64));
        }
    }

    /// `n × dim` germ samples from the per-dimension streams.
    pub fn draw_germ_samples(&mut self, n: usize) -> Array2<f64> {
        let dim = self.dim();
        let mut out = Array2::zeros((n, dim));
        for (d, b) in self.bases.iter_mut().enumerate() {
            for i in 0..n {
                out[[i, d]] = b.sample();
            }
        }
        out
    }

    pub fn draw_germ_samples_with_rng<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Array2<f64> {
        let dim = self.dim();
        let mut out = Array2::zeros((n, dim));
        for i in 0..n {
            for (d, b) in self.bases.iter().enumerate() {
                out[[i, d]] = b.sample_with_rng(rng);
            }
        }
        out
    }

    /// Evaluates the expansion at `n` fresh germ samples.
    pub fn draw_samples(&mut self, coeffs: &Array1<f64>, n: usize) -> UqResult<Array1<f64>> {
        self.check_coeffs(coeffs)?;
        let germ = self.draw_germ_samples(n);
        self.evaluate_batch(coeffs, &germ)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_construction_shapes() {
        let set = PcSet::new(BasisFamily::legendre(), 3, 2).unwrap();
        assert_eq!(set.len(), 10);
        assert_eq!(set.dim(), 2);
        assert_eq!(set.order(), 3);
        // ‖P_1(x) P_2(y)‖² = 1/3 · 1/5
        let k = set.multi_index().encode(&[1, 2]).unwrap();
        assert!((set.norms_squared()[k] - 1.0 / 15.0).abs() < 1e-15);
        assert!(PcSet::new(BasisFamily::legendre(), 3, 0).is_err());
    }

    #[test]
    fn test_mixed_families() {
        let mi = MultiIndex::total_order(2, 2).unwrap();
        let set = PcSet::with_families(
            mi.clone(),
            vec![BasisFamily::legendre(), BasisFamily::hermite()],
        )
        .unwrap();
        let psi = set.evaluate_basis(array![0.5, 2.0].view()).unwrap();
        // term (1,1): P_1(0.5) He_1(2) ; term (0,2): He_2(2) = 3
        assert!((psi[mi.encode(&[1, 1]).unwrap()] - 1.0).abs() < 1e-15);
        assert!((psi[mi.encode(&[0, 2]).unwrap()] - 3.0).abs() < 1e-15);
        assert!(set.is_in_domain(array![0.5, 40.0].view()).unwrap());
        assert!(!set.is_in_domain(array![1.5, 0.0].view()).unwrap());

        assert!(matches!(
            PcSet::with_families(mi, vec![BasisFamily::legendre()]),
            Err(UqError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_evaluate_checks_shapes() {
        let set = PcSet::new(BasisFamily::hermite(), 2, 2).unwrap();
        let c = Array1::ones(set.len());
        match set.evaluate(&Array1::ones(3), array![0.0, 0.0].view()) {
            Err(UqError::TermCountMismatch { expected, found }) => {
                assert_eq!((expected, found), (6, 3));
            }
            other => panic!("Expected TermCountMismatch, got {other:?}"),
        }
        assert!(matches!(
            set.evaluate(&c, array![0.0].view()),
            Err(UqError::DimensionMismatch { .. })
        ));
        assert!(set.evaluate_batch(&c, &Array2::zeros((4, 3))).is_err());
    }

    #[test]
    fn test_gradient_and_hessian_of_known_polynomial() {
        // f = 1 + 2 x + 3 xy + (3x² - 1)/2  in Legendre terms
        let set = PcSet::new(BasisFamily::legendre(), 2, 2).unwrap();
        let mi = set.multi_index().clone();
        let mut c = Array1::zeros(set.len());
        c[mi.encode(&[0, 0]).unwrap()] = 1.0;
        c[mi.encode(&[1, 0]).unwrap()] = 2.0;
        c[mi.encode(&[1, 1]).unwrap()] = 3.0;
        c[mi.encode(&[2, 0]).unwrap()] = 1.0;
        let (x, y) = (0.25, -0.5);
        let p = array![x, y];
        let g = set.gradient(&c, p.view()).unwrap();
        assert!((g[0] - (2.0 + 3.0 * y + 3.0 * x)).abs() < 1e-14);
        assert!((g[1] - 3.0 * x).abs() < 1e-14);
        let h = set.hessian(&c, p.view()).unwrap();
        assert!((h[[0, 0]] - 3.0).abs() < 1e-14);
        assert!((h[[0, 1]] - 3.0).abs() < 1e-14);
        assert!((h[[1, 0]] - 3.0).abs() < 1e-14);
        assert!(h[[1, 1]].abs() < 1e-14);

        let pts = array![[x, y], [0.0, 0.0]];
        let gb = set.gradient_batch(&c, &pts).unwrap();
        assert_eq!(gb.row(0), g);
        assert!((gb[[1, 0]] - 2.0).abs() < 1e-14);
    }

    #[test]
    fn test_from_config_binds_quadrature() {
        let config = PcSetConfig::from_json_str(
            r#"{ "pc_type": "HG", "dim": 2, "order": 2,
                 "quadrature": { "grid": "full", "param": 3 }, "seed": 5 }"#,
        )
        .unwrap();
        let set = PcSet::from_config(&config).unwrap();
        assert_eq!(set.quadrature().map(QuadRule::len), Some(9));
        assert_eq!(set.basis_at_quadrature().map(|p| p.dim()), Some((9, 6)));
        assert_eq!(set.bases()[1].seed(), 6);
    }

    #[test]
    fn test_draw_samples_reproducible() {
        let mut a = PcSet::new(BasisFamily::hermite(), 1, 2).unwrap();
        let mut b = a.clone();
        a.seed_basis_rngs(17);
        b.seed_basis_rngs(17);
        let c = array![1.0, 2.0, 0.0];
        assert_eq!(a.draw_samples(&c, 8).unwrap(), b.draw_samples(&c, 8).unwrap());

        let mut rng = StdRng::seed_from_u64(3);
        let germ = a.draw_germ_samples_with_rng(1000, &mut rng);
        let mean = germ.column(0).sum() / 1000.0;
        assert!(mean.abs() < 0.15);
    }
}
