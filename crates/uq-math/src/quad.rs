// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Quadrature Rules
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! d-dimensional quadrature rules.

use crate::gauss::gauss_rule;
use crate::rules::{Rule1d, RuleFamily};
use crate::sparse::{tensor_product, SparseGrid};
use ndarray::{Array1, Array2, ArrayView1};
use std::cmp::Ordering;
use uq_types::config::QuadConfig;
use uq_types::error::{UqError, UqResult};
use uq_types::family::{BasisFamily, GridType, RuleKind};

/// Points (`n × d`, one row per point) and weights (`n`).
#[derive(Debug, Clone, PartialEq)]
pub struct QuadRule {
    points: Array2<f64>,
    weights: Array1<f64>,
}

impl QuadRule {
    pub fn from_parts(points: Array2<f64>, weights: Array1<f64>) -> UqResult<Self> {
        if points.ncols() == 0 {
            return Err(UqError::InvalidDimension(
                "quadrature points need at least one column".to_string(),
            ));
        }
        if points.nrows() != weights.len() {
            return Err(UqError::dimension_mismatch(
                "quadrature weights",
                points.nrows(),
                weights.len(),
            ));
        }
        if weights.is_empty() {
            return Err(UqError::InvalidRuleTable(
                "quadrature rule has no points".to_string(),
            ));
        }
        if !points.iter().chain(weights.iter()).all(|v| v.is_finite()) {
            return Err(UqError::InvalidRuleTable(
                "quadrature rule contains non-finite values".to_string(),
            ));
        }
        Ok(Self { points, weights })
    }

    /// Full tensor Gauss grid with `points_per_dim` points in every dimension.
    pub fn full(families: &[BasisFamily], points_per_dim: usize) -> UqResult<Self> {
        if families.is_empty() {
            return Err(UqError::InvalidDimension(
                "quadrature needs at least one dimension".to_string(),
            ));
        }
        let rules = families
            .iter()
            .map(|f| gauss_rule(f, points_per_dim))
            .collect::<UqResult<Vec<Rule1d>>>()?;
        let refs: Vec<&Rule1d> = rules.iter().collect();
        tensor_product(&refs, 1.0)
    }

    /// Isotropic Smolyak grid of Gauss rules at `level`.
    pub fn sparse(families: &[BasisFamily], level: usize) -> UqResult<Self> {
        Self::from_config(families, &QuadConfig::sparse(level))
    }

    pub fn from_config(families: &[BasisFamily], config: &QuadConfig) -> UqResult<Self> {
        config.validate()?;
        if config.grid == GridType::Full && config.rule == RuleKind::Gauss {
            return Self::full(families, config.param);
        }
        let rule_families = families
            .iter()
            .map(|f| RuleFamily::for_basis(config.rule, f, config.param))
            .collect::<UqResult<Vec<_>>>()?;
        let grid = SparseGrid::new(rule_families)?;
        match config.grid {
            GridType::Full => grid.tensor(&vec![config.param; families.len()]),
            GridType::Sparse => grid.isotropic(config.param),
        }
    }

    pub fn points(&self) -> &Array2<f64> {
        &self.points
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    pub fn point(&self, i: usize) -> ArrayView1<'_, f64> {
        self.points.row(i)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.points.ncols()
    }

    pub fn total_mass(&self) -> f64 {
        self.weights.sum()
    }

    pub fn integrate<F: Fn(ArrayView1<'_, f64>) -> f64>(&self, f: F) -> f64 {
        self.points
            .rows()
            .into_iter()
            .zip(self.weights.iter())
            .map(|(x, &w)| w * f(x))
            .sum()
    }

    /// Reorders points lexicographically by coordinates.
    pub fn sort_lexicographic(&mut self) {
        let n = self.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            let (ra, rb) = (self.points.row(a), self.points.row(b));
            ra.iter()
                .zip(rb.iter())
                .map(|(x, y)| x.total_cmp(y))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
        let points = Array2::from_shape_fn((n, self.dim()), |(i, j)| self.points[[order[i], j]]);
        let weights = Array1::from_shape_fn(n, |i| self.weights[order[i]]);
        self.points = points;
        self.weights = weights;
    }

    pub fn into_parts(self) -> (Array2<f64>, Array1<f64>) {
        (self.points, self.weights)
    }
}
