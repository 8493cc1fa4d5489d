// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — 1D Rule Library
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Level-indexed families of 1D quadrature rules.
//!
//! | family          | orders by level              | max level | nested |
//! |-----------------|------------------------------|-----------|--------|
//! | Clenshaw–Curtis | 1, 3, 5, 9, ..., 2^l + 1     | 10        | yes    |
//! | GKP uniform     | 1, 3, 7, 15, 31, 63          | 5         | yes    |
//! | GKP normal      | 1, 3, 9, 19, 35              | 4         | yes    |
//! | Gauss           | 1, 3, 5, 9, ..., 2^l + 1     | chosen    | no     |
//!
//! The nested tables are built once per process on first use and shared
//! read-only afterwards.

use crate::gauss::{gauss_rule, symmetrize_nodes};
use crate::patterson::nested_sequence;
use std::sync::OnceLock;
use uq_types::constants::{MAX_CC_LEVEL, MAX_GAUSS_LEVEL, MAX_GKP_NORMAL_LEVEL, MAX_GKP_UNIFORM_LEVEL};
use uq_types::error::{UqError, UqResult};
use uq_types::family::{BasisFamily, PcType, RuleKind};

/// Ascending abscissae with weights summing to the probability mass 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule1d {
    pub points: Vec<f64>,
    pub weights: Vec<f64>,
}

impl Rule1d {
    pub fn new(points: Vec<f64>, weights: Vec<f64>) -> UqResult<Self> {
        if points.is_empty() {
            return Err(UqError::InvalidRuleTable("rule has no points".to_string()));
        }
        if points.len() != weights.len() {
            return Err(UqError::dimension_mismatch(
                "rule weights",
                points.len(),
                weights.len(),
            ));
        }
        if points.windows(2).any(|w| !(w[0] < w[1])) {
            return Err(UqError::InvalidRuleTable(
                "rule abscissae must be strictly ascending".to_string(),
            ));
        }
        if !weights.iter().all(|w| w.is_finite()) {
            return Err(UqError::InvalidRuleTable(
                "rule weights must be finite".to_string(),
            ));
        }
        Ok(Self { points, weights })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn integrate<F: Fn(f64) -> f64>(&self, f: F) -> f64 {
        self.points
            .iter()
            .zip(&self.weights)
            .map(|(&x, &w)| w * f(x))
            .sum()
    }

    pub fn total_mass(&self) -> f64 {
        self.weights.iter().sum()
    }
}

/// A level-indexed family of 1D rules.
pub trait QuadratureFamily {
    fn name(&self) -> &str;

    /// Deepest level this family can produce.
    fn max_level(&self) -> usize;

    /// Number of points at `level`; fails above `max_level`.
    fn order_for_level(&self, level: usize) -> UqResult<usize>;

    fn rule(&self, level: usize) -> UqResult<&Rule1d>;

    /// Whether each level's abscissae contain the previous level's.
    fn is_nested(&self) -> bool;

    /// Copies the rule at `level` into caller buffers, which must each hold
    /// exactly `order_for_level(level)` values.
    fn rule_into(&self, level: usize, points: &mut [f64], weights: &mut [f64]) -> UqResult<()> {
        let rule = self.rule(level)?;
        if points.len() != rule.len() {
            return Err(UqError::dimension_mismatch(
                "rule point buffer",
                rule.len(),
                points.len(),
            ));
        }
        if weights.len() != rule.len() {
            return Err(UqError::dimension_mismatch(
                "rule weight buffer",
                rule.len(),
                weights.len(),
            ));
        }
        points.copy_from_slice(&rule.points);
        weights.copy_from_slice(&rule.weights);
        Ok(())
    }
}

fn check_level(name: &str, level: usize, max: usize) -> UqResult<()> {
    if level > max {
        return Err(UqError::UnsupportedLevel {
            family: name.to_string(),
            level,
            max,
        });
    }
    Ok(())
}

/// `1` at level 0, `2^l + 1` above.
pub fn doubling_order(level: usize) -> usize {
    if level == 0 {
        1
    } else {
        (1usize << level) + 1
    }
}

fn clenshaw_curtis(n: usize) -> UqResult<Rule1d> {
    if n == 1 {
        return Rule1d::new(vec![0.0], vec![1.0]);
    }
    let pi = std::f64::consts::PI;
    let nm1 = (n - 1) as f64;
    let mut points: Vec<f64> = (0..n).map(|i| -(pi * i as f64 / nm1).cos()).collect();
    symmetrize_nodes(&mut points);

    let half = (n - 1) / 2;
    let weights: Vec<f64> = (0..n)
        .map(|i| {
            let theta = pi * i as f64 / nm1;
            let mut w = 1.0;
            for j in 1..=half {
                let b = if 2 * j == n - 1 { 1.0 } else { 2.0 };
                let jf = j as f64;
                w -= b * (2.0 * jf * theta).cos() / (4.0 * jf * jf - 1.0);
            }
            let edge = if i == 0 || i == n - 1 { 1.0 } else { 2.0 };
            // Lebesgue weights sum to 2 on [-1, 1]
            0.5 * edge * w / nm1
        })
        .collect();
    Rule1d::new(points, weights)
}

fn cc_table() -> Result<&'static [Rule1d], UqError> {
    static TABLE: OnceLock<Result<Vec<Rule1d>, String>> = OnceLock::new();
    let table = TABLE.get_or_init(|| {
        (0..=MAX_CC_LEVEL)
            .map(|l| clenshaw_curtis(doubling_order(l)))
            .collect::<UqResult<Vec<_>>>()
            .map_err(|e| e.to_string())
    });
    table
        .as_deref()
        .map_err(|msg| UqError::InvalidRuleTable(msg.clone()))
}

fn gkp_uniform_table() -> Result<&'static [Rule1d], UqError> {
    static TABLE: OnceLock<Result<Vec<Rule1d>, String>> = OnceLock::new();
    let table = TABLE.get_or_init(|| {
        log::debug!("building Gauss-Kronrod-Patterson tables for the uniform density");
        nested_sequence(&BasisFamily::legendre(), &[2, 4, 8, 16, 32]).map_err(|e| e.to_string())
    });
    table
        .as_deref()
        .map_err(|msg| UqError::InvalidRuleTable(msg.clone()))
}

fn gkp_normal_table() -> Result<&'static [Rule1d], UqError> {
    static TABLE: OnceLock<Result<Vec<Rule1d>, String>> = OnceLock::new();
    let table = TABLE.get_or_init(|| {
        log::debug!("building Genz-Keister tables for the normal density");
        nested_sequence(&BasisFamily::hermite(), &[2, 6, 10, 16]).map_err(|e| e.to_string())
    });
    table
        .as_deref()
        .map_err(|msg| UqError::InvalidRuleTable(msg.clone()))
}

/// Non-nested Gauss rules of one germ density at the doubling orders,
/// tabulated up to `max_level` at construction.
#[derive(Debug, Clone)]
pub struct GaussFamily {
    family: BasisFamily,
    name: String,
    rules: Vec<Rule1d>,
}

impl GaussFamily {
    pub fn new(family: BasisFamily, max_level: usize) -> UqResult<Self> {
        let name = format!("Gauss {family}");
        check_level(&name, max_level, MAX_GAUSS_LEVEL)?;
        let rules = (0..=max_level)
            .map(|l| gauss_rule(&family, doubling_order(l)))
            .collect::<UqResult<Vec<_>>>()?;
        Ok(Self {
            family,
            name,
            rules,
        })
    }

    pub fn family(&self) -> &BasisFamily {
        &self.family
    }
}

impl QuadratureFamily for GaussFamily {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_level(&self) -> usize {
        self.rules.len() - 1
    }

    fn order_for_level(&self, level: usize) -> UqResult<usize> {
        check_level(&self.name, level, self.max_level())?;
        Ok(doubling_order(level))
    }

    fn rule(&self, level: usize) -> UqResult<&Rule1d> {
        check_level(&self.name, level, self.max_level())?;
        Ok(&self.rules[level])
    }

    fn is_nested(&self) -> bool {
        false
    }
}

/// Closed set of rule families the sparse engine can be instantiated with.
#[derive(Debug, Clone)]
pub enum RuleFamily {
    ClenshawCurtis,
    GkpUniform,
    GkpNormal,
    Gauss(GaussFamily),
}

impl RuleFamily {
    /// Family of `kind` integrating against the germ density of `basis`.
    ///
    /// Clenshaw–Curtis and GKP uniform require the uniform (`LU`) density,
    /// GKP normal the standard normal (`HG`). `max_level` only matters for
    /// Gauss families.
    pub fn for_basis(kind: RuleKind, basis: &BasisFamily, max_level: usize) -> UqResult<Self> {
        let needs = |pc: PcType, fam: RuleFamily| {
            if basis.pc_type == pc {
                Ok(fam)
            } else {
                Err(UqError::ConfigError(format!(
                    "{kind:?} rules integrate the {pc} density, not {basis}"
                )))
            }
        };
        match kind {
            RuleKind::Gauss => Ok(RuleFamily::Gauss(GaussFamily::new(*basis, max_level)?)),
            RuleKind::ClenshawCurtis => needs(PcType::Legendre, RuleFamily::ClenshawCurtis),
            RuleKind::GkpUniform => needs(PcType::Legendre, RuleFamily::GkpUniform),
            RuleKind::GkpNormal => needs(PcType::Hermite, RuleFamily::GkpNormal),
        }
    }

    fn table(&self) -> UqResult<&[Rule1d]> {
        match self {
            RuleFamily::ClenshawCurtis => cc_table(),
            RuleFamily::GkpUniform => gkp_uniform_table(),
            RuleFamily::GkpNormal => gkp_normal_table(),
            RuleFamily::Gauss(g) => Ok(&g.rules),
        }
    }
}

impl QuadratureFamily for RuleFamily {
    fn name(&self) -> &str {
        match self {
            RuleFamily::ClenshawCurtis => "Clenshaw-Curtis",
            RuleFamily::GkpUniform => "GKP uniform",
            RuleFamily::GkpNormal => "GKP normal",
            RuleFamily::Gauss(g) => g.name(),
        }
    }

    fn max_level(&self) -> usize {
        match self {
            RuleFamily::ClenshawCurtis => MAX_CC_LEVEL,
            RuleFamily::GkpUniform => MAX_GKP_UNIFORM_LEVEL,
            RuleFamily::GkpNormal => MAX_GKP_NORMAL_LEVEL,
            RuleFamily::Gauss(g) => g.max_level(),
        }
    }

    fn order_for_level(&self, level: usize) -> UqResult<usize> {
        check_level(self.name(), level, self.max_level())?;
        Ok(match self {
            RuleFamily::ClenshawCurtis | RuleFamily::Gauss(_) => doubling_order(level),
            RuleFamily::GkpUniform => (1usize << (level + 1)) - 1,
            RuleFamily::GkpNormal => [1, 3, 9, 19, 35][level],
        })
    }

    fn rule(&self, level: usize) -> UqResult<&Rule1d> {
        check_level(self.name(), level, self.max_level())?;
        Ok(&self.table()?[level])
    }

    fn is_nested(&self) -> bool {
        !matches!(self, RuleFamily::Gauss(_))
    }
}
