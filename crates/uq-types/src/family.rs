// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Basis Families
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Orthogonal polynomial family descriptors.
//!
//! Every family is paired with a probability density (its germ distribution):
//!
//! | tag | polynomials              | density                                   | support    |
//! |-----|--------------------------|-------------------------------------------|------------|
//! | LU  | Legendre `P_n`           | `1/2`                                     | `[-1, 1]`  |
//! | HG  | probabilists' Hermite `He_n` | standard normal                       | ℝ          |
//! | LG  | Laguerre `L_n^(α)`       | `x^α e^-x / Γ(α+1)`                       | `[0, ∞)`   |
//! | JB  | Jacobi `P_n^(α,β)`       | `∝ (1-x)^α (1+x)^β`                       | `[-1, 1]`  |

use crate::error::{UqError, UqResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PcType {
    #[serde(rename = "LU")]
    Legendre,
    #[serde(rename = "HG")]
    Hermite,
    #[serde(rename = "LG")]
    Laguerre,
    #[serde(rename = "JB")]
    Jacobi,
}

impl PcType {
    pub fn tag(self) -> &'static str {
        match self {
            PcType::Legendre => "LU",
            PcType::Hermite => "HG",
            PcType::Laguerre => "LG",
            PcType::Jacobi => "JB",
        }
    }
}

impl fmt::Display for PcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for PcType {
    type Err = UqError;

    fn from_str(s: &str) -> UqResult<Self> {
        match s.trim() {
            "LU" => Ok(PcType::Legendre),
            "HG" => Ok(PcType::Hermite),
            "LG" => Ok(PcType::Laguerre),
            "JB" => Ok(PcType::Jacobi),
            other => Err(UqError::ConfigError(format!(
                "unknown PC type '{other}' (expected LU, HG, LG or JB)"
            ))),
        }
    }
}

/// Family tag plus shape parameters. `alpha` is used by LG and JB, `beta` by JB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BasisFamily {
    pub pc_type: PcType,
    #[serde(default)]
    pub alpha: f64,
    #[serde(default)]
    pub beta: f64,
}

impl BasisFamily {
    pub fn new(pc_type: PcType, alpha: f64, beta: f64) -> UqResult<Self> {
        let family = Self {
            pc_type,
            alpha,
            beta,
        };
        family.validate()?;
        Ok(family)
    }

    pub fn legendre() -> Self {
        Self {
            pc_type: PcType::Legendre,
            alpha: 0.0,
            beta: 0.0,
        }
    }

    pub fn hermite() -> Self {
        Self {
            pc_type: PcType::Hermite,
            alpha: 0.0,
            beta: 0.0,
        }
    }

    pub fn laguerre(alpha: f64) -> UqResult<Self> {
        Self::new(PcType::Laguerre, alpha, 0.0)
    }

    pub fn jacobi(alpha: f64, beta: f64) -> UqResult<Self> {
        Self::new(PcType::Jacobi, alpha, beta)
    }

    pub fn validate(&self) -> UqResult<()> {
        if !self.alpha.is_finite() || !self.beta.is_finite() {
            return Err(UqError::ConfigError(format!(
                "{} shape parameters must be finite",
                self.pc_type
            )));
        }
        match self.pc_type {
            PcType::Laguerre if self.alpha <= -1.0 => Err(UqError::ConfigError(format!(
                "LG requires alpha > -1, got {}",
                self.alpha
            ))),
            PcType::Jacobi if self.alpha <= -1.0 || self.beta <= -1.0 => {
                Err(UqError::ConfigError(format!(
                    "JB requires alpha, beta > -1, got ({}, {})",
                    self.alpha, self.beta
                )))
            }
            _ => Ok(()),
        }
    }

    /// Closed support of the germ density.
    pub fn support(&self) -> (f64, f64) {
        match self.pc_type {
            PcType::Legendre | PcType::Jacobi => (-1.0, 1.0),
            PcType::Hermite => (f64::NEG_INFINITY, f64::INFINITY),
            PcType::Laguerre => (0.0, f64::INFINITY),
        }
    }

    pub fn contains(&self, x: f64) -> bool {
        let (lo, hi) = self.support();
        x.is_finite() && x >= lo && x <= hi
    }

    pub fn is_bounded(&self) -> bool {
        let (lo, hi) = self.support();
        lo.is_finite() && hi.is_finite()
    }

    /// Density symmetric about the origin.
    pub fn is_symmetric(&self) -> bool {
        match self.pc_type {
            PcType::Legendre | PcType::Hermite => true,
            PcType::Jacobi => self.alpha == self.beta,
            PcType::Laguerre => false,
        }
    }
}

impl Default for BasisFamily {
    fn default() -> Self {
        Self::legendre()
    }
}

impl fmt::Display for BasisFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pc_type {
            PcType::Laguerre => write!(f, "LG(alpha={})", self.alpha),
            PcType::Jacobi => write!(f, "JB(alpha={}, beta={})", self.alpha, self.beta),
            other => write!(f, "{other}"),
        }
    }
}

/// Full tensor grid or Smolyak sparse grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridType {
    Full,
    Sparse,
}

/// Which 1D rule family feeds a quadrature grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Gauss rule of the basis family itself.
    #[default]
    Gauss,
    ClenshawCurtis,
    GkpUniform,
    GkpNormal,
}

/// Strategy for transcendental Galerkin operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogCompMethod {
    #[default]
    TaylorSeries,
    Integration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_roundtrip() {
        for t in [
            PcType::Legendre,
            PcType::Hermite,
            PcType::Laguerre,
            PcType::Jacobi,
        ] {
            assert_eq!(t.tag().parse::<PcType>().unwrap(), t);
        }
        assert!("XX".parse::<PcType>().is_err());
    }

    #[test]
    fn test_shape_validation() {
        assert!(BasisFamily::laguerre(-0.5).is_ok());
        assert!(BasisFamily::laguerre(-1.0).is_err());
        assert!(BasisFamily::jacobi(0.5, -2.0).is_err());
        assert!(BasisFamily::new(PcType::Hermite, f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_support_and_symmetry() {
        let lu = BasisFamily::legendre();
        assert!(lu.contains(-1.0) && lu.contains(1.0) && !lu.contains(1.0 + 1e-12));
        assert!(lu.is_bounded());
        let lg = BasisFamily::laguerre(1.0).unwrap();
        assert!(!lg.contains(-0.1) && lg.contains(1e6));
        assert!(!lg.is_symmetric());
        assert!(BasisFamily::jacobi(0.3, 0.3).unwrap().is_symmetric());
        assert!(!BasisFamily::jacobi(0.3, 0.4).unwrap().is_symmetric());
        assert!(!BasisFamily::hermite().contains(f64::INFINITY));
    }
}
