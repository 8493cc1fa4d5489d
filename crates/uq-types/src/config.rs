// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::{
    DEFAULT_INTEGRATION_POINTS, DEFAULT_SEED, DEFAULT_TAYLOR_MAX_TERMS, DEFAULT_TAYLOR_TOL,
};
use crate::error::{UqError, UqResult};
use crate::family::{BasisFamily, GridType, LogCompMethod, PcType, RuleKind};
use serde::{Deserialize, Serialize};

/// Top-level PC set configuration.
///
/// ```json
/// {
///   "pc_type": "LU",
///   "dim": 2,
///   "order": 3,
///   "quadrature": { "grid": "sparse", "param": 5 },
///   "arithmetic": { "method": "TaylorSeries", "taylor_tolerance": 1e-12 }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PcSetConfig {
    pub pc_type: PcType,
    #[serde(default)]
    pub alpha: f64,
    #[serde(default)]
    pub beta: f64,
    pub dim: usize,
    pub order: usize,
    /// Quadrature bound at construction; projection needs one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quadrature: Option<QuadConfig>,
    #[serde(default)]
    pub arithmetic: ArithmeticConfig,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

/// Quadrature grid request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadConfig {
    pub grid: GridType,
    /// Points per dimension for `full` Gauss grids, level otherwise.
    pub param: usize,
    #[serde(default)]
    pub rule: RuleKind,
}

/// Strategy and convergence control for Galerkin arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArithmeticConfig {
    #[serde(default)]
    pub method: LogCompMethod,
    #[serde(default = "default_taylor_tolerance")]
    pub taylor_tolerance: f64,
    #[serde(default = "default_taylor_max_terms")]
    pub taylor_max_terms: usize,
    /// RK4 steps for exp, Gauss–Legendre nodes for log (integration method).
    #[serde(default = "default_integration_points")]
    pub integration_points: usize,
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}
fn default_taylor_tolerance() -> f64 {
    DEFAULT_TAYLOR_TOL
}
fn default_taylor_max_terms() -> usize {
    DEFAULT_TAYLOR_MAX_TERMS
}
fn default_integration_points() -> usize {
    DEFAULT_INTEGRATION_POINTS
}

impl Default for ArithmeticConfig {
    fn default() -> Self {
        ArithmeticConfig {
            method: LogCompMethod::default(),
            taylor_tolerance: default_taylor_tolerance(),
            taylor_max_terms: default_taylor_max_terms(),
            integration_points: default_integration_points(),
        }
    }
}

impl ArithmeticConfig {
    pub fn taylor(tolerance: f64, max_terms: usize) -> Self {
        ArithmeticConfig {
            method: LogCompMethod::TaylorSeries,
            taylor_tolerance: tolerance,
            taylor_max_terms: max_terms,
            ..Default::default()
        }
    }

    pub fn integration(points: usize) -> Self {
        ArithmeticConfig {
            method: LogCompMethod::Integration,
            integration_points: points,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> UqResult<()> {
        if !(self.taylor_tolerance > 0.0 && self.taylor_tolerance.is_finite()) {
            return Err(UqError::ConfigError(format!(
                "taylor_tolerance must be positive and finite, got {}",
                self.taylor_tolerance
            )));
        }
        if self.taylor_max_terms == 0 {
            return Err(UqError::ConfigError(
                "taylor_max_terms must be at least 1".to_string(),
            ));
        }
        if self.integration_points == 0 {
            return Err(UqError::ConfigError(
                "integration_points must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl QuadConfig {
    pub fn sparse(level: usize) -> Self {
        QuadConfig {
            grid: GridType::Sparse,
            param: level,
            rule: RuleKind::Gauss,
        }
    }

    pub fn full(points_per_dim: usize) -> Self {
        QuadConfig {
            grid: GridType::Full,
            param: points_per_dim,
            rule: RuleKind::Gauss,
        }
    }

    pub fn validate(&self) -> UqResult<()> {
        if self.grid == GridType::Full && self.rule == RuleKind::Gauss && self.param == 0 {
            return Err(UqError::ConfigError(
                "full Gauss grids need at least one point per dimension".to_string(),
            ));
        }
        Ok(())
    }
}

impl PcSetConfig {
    /// Load from a JSON file.
    pub fn from_file(path: &str) -> UqResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> UqResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn family(&self) -> BasisFamily {
        BasisFamily {
            pc_type: self.pc_type,
            alpha: self.alpha,
            beta: self.beta,
        }
    }

    pub fn validate(&self) -> UqResult<()> {
        if self.dim == 0 {
            return Err(UqError::InvalidDimension(
                "PC set needs at least one stochastic dimension".to_string(),
            ));
        }
        self.family().validate()?;
        if let Some(quad) = &self.quadrature {
            quad.validate()?;
        }
        self.arithmetic.validate()
    }
}
