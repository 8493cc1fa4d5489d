// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Germ Maps
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Isoprobabilistic maps between germ distributions,
//! `y = F_to⁻¹(F_from(x))`.

use ndarray::{Array1, Array2};
use statrs::distribution::{Beta, Continuous, ContinuousCDF, Gamma, Normal};
use statrs::function::erf::erfc;
use std::f64::consts::SQRT_2;
use uq_types::error::{UqError, UqResult};
use uq_types::family::{BasisFamily, PcType};

/// Relative step at which inverse-CDF refinement stops.
const INVERSE_CDF_TOL: f64 = 1e-14;
const INVERSE_CDF_MAX_ITER: usize = 200;
/// `Φ(±40)` is 0 or 1 in double precision.
const NORMAL_BRACKET: f64 = 40.0;

/// Germ law of a basis family.
#[derive(Debug, Clone)]
enum GermLaw {
    /// Uniform on `[-1, 1]`.
    Uniform,
    Normal(Normal),
    Gamma(Gamma),
    /// `(x + 1) / 2` is Beta distributed.
    Beta(Beta),
}

impl GermLaw {
    fn new(family: &BasisFamily) -> UqResult<Self> {
        family.validate()?;
        let invalid = |e: String| UqError::ConfigError(format!("{family} germ law: {e}"));
        Ok(match family.pc_type {
            PcType::Legendre => GermLaw::Uniform,
            PcType::Hermite => {
                GermLaw::Normal(Normal::new(0.0, 1.0).map_err(|e| invalid(e.to_string()))?)
            }
            PcType::Laguerre => GermLaw::Gamma(
                Gamma::new(family.alpha + 1.0, 1.0).map_err(|e| invalid(e.to_string()))?,
            ),
            PcType::Jacobi => GermLaw::Beta(
                Beta::new(family.beta + 1.0, family.alpha + 1.0)
                    .map_err(|e| invalid(e.to_string()))?,
            ),
        })
    }

    fn cdf(&self, x: f64) -> f64 {
        let p = match self {
            GermLaw::Uniform => 0.5 * (x + 1.0),
            GermLaw::Normal(_) => 0.5 * erfc(-x / SQRT_2),
            GermLaw::Gamma(d) => d.cdf(x),
            GermLaw::Beta(d) => d.cdf(0.5 * (x + 1.0)),
        };
        p.clamp(0.0, 1.0)
    }

    fn pdf(&self, x: f64) -> f64 {
        match self {
            GermLaw::Uniform => 0.5,
            GermLaw::Normal(d) => d.pdf(x),
            GermLaw::Gamma(d) => d.pdf(x),
            GermLaw::Beta(d) => 0.5 * d.pdf(0.5 * (x + 1.0)),
        }
    }

    fn support(&self) -> (f64, f64) {
        match self {
            GermLaw::Uniform | GermLaw::Beta(_) => (-1.0, 1.0),
            GermLaw::Normal(_) => (f64::NEG_INFINITY, f64::INFINITY),
            GermLaw::Gamma(_) => (0.0, f64::INFINITY),
        }
    }

    fn inverse_cdf(&self, p: f64) -> f64 {
        let (lo, hi) = self.support();
        if p <= 0.0 {
            return lo;
        }
        if p >= 1.0 {
            return hi;
        }
        let guess = match self {
            GermLaw::Uniform => return 2.0 * p - 1.0,
            GermLaw::Normal(d) => d.inverse_cdf(p),
            GermLaw::Gamma(d) => d.inverse_cdf(p),
            GermLaw::Beta(d) => 2.0 * d.inverse_cdf(p) - 1.0,
        };
        self.refine(p, guess)
    }

    /// Finite interval with `cdf(lo) <= p <= cdf(hi)`.
    fn bracket(&self, p: f64, guess: f64) -> (f64, f64) {
        match self {
            GermLaw::Uniform | GermLaw::Beta(_) => (-1.0, 1.0),
            GermLaw::Normal(_) => (-NORMAL_BRACKET, NORMAL_BRACKET),
            GermLaw::Gamma(_) => {
                let mut hi = if guess.is_finite() { guess.max(1.0) } else { 1.0 };
                for _ in 0..INVERSE_CDF_MAX_ITER {
                    if self.cdf(hi) >= p {
                        break;
                    }
                    hi *= 2.0;
                }
                (0.0, hi)
            }
        }
    }

    /// Newton on `cdf(x) = p`, falling back to bisection whenever a step
    /// leaves the current bracket.
    fn refine(&self, p: f64, guess: f64) -> f64 {
        let (mut lo, mut hi) = self.bracket(p, guess);
        let mut x = if guess > lo && guess < hi {
            guess
        } else {
            0.5 * (lo + hi)
        };
        for _ in 0..INVERSE_CDF_MAX_ITER {
            let f = self.cdf(x) - p;
            if f == 0.0 {
                break;
            }
            if f < 0.0 {
                lo = x;
            } else {
                hi = x;
            }
            let newton = x - f / self.pdf(x);
            let next = if newton > lo && newton < hi {
                newton
            } else {
                0.5 * (lo + hi)
            };
            let done = (next - x).abs() <= INVERSE_CDF_TOL * x.abs().max(1.0);
            x = next;
            if done || hi - lo <= INVERSE_CDF_TOL * x.abs().max(1.0) {
                break;
            }
        }
        x
    }
}

fn outside_support(x: f64, from: &BasisFamily) -> UqError {
    UqError::ConfigError(format!("{x} is outside the support of the {from} germ"))
}

/// Support endpoints of a bounded germ have no finite image on an
/// unbounded one; those are rejected.
fn map_value(
    x: f64,
    src: &GermLaw,
    dst: &GermLaw,
    from: &BasisFamily,
    to: &BasisFamily,
) -> UqResult<f64> {
    if !from.contains(x) {
        return Err(outside_support(x, from));
    }
    let y = dst.inverse_cdf(src.cdf(x));
    if y.is_finite() {
        Ok(y)
    } else {
        Err(UqError::ConfigError(format!(
            "{x} on the {from} germ maps to {y} on the {to} germ"
        )))
    }
}

/// Maps one germ value of `from` onto the germ of `to` with equal
/// cumulative probability.
pub fn pc_to_pc(x: f64, from: &BasisFamily, to: &BasisFamily) -> UqResult<f64> {
    if from == to {
        return if from.contains(x) {
            Ok(x)
        } else {
            Err(outside_support(x, from))
        };
    }
    let src = GermLaw::new(from)?;
    let dst = GermLaw::new(to)?;
    map_value(x, &src, &dst, from, to)
}

/// Column-wise [`pc_to_pc`] on an `n × 1` array of germ values.
pub fn pc_map(points: &Array2<f64>, from: &BasisFamily, to: &BasisFamily) -> UqResult<Array1<f64>> {
    if points.ncols() != 1 {
        return Err(UqError::UnsupportedOperation(format!(
            "PC maps are one-dimensional, input has {} columns",
            points.ncols()
        )));
    }
    if from == to {
        if let Some(&x) = points.iter().find(|&&x| !from.contains(x)) {
            return Err(outside_support(x, from));
        }
        return Ok(points.column(0).to_owned());
    }
    let src = GermLaw::new(from)?;
    let dst = GermLaw::new(to)?;
    points
        .column(0)
        .iter()
        .map(|&x| map_value(x, &src, &dst, from, to))
        .collect::<UqResult<Vec<f64>>>()
        .map(Array1::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_normal_to_uniform() {
        let hg = BasisFamily::hermite();
        let lu = BasisFamily::legendre();
        assert!(pc_to_pc(0.0, &hg, &lu).unwrap().abs() < 1e-15);
        // 2Φ(1) - 1
        assert!((pc_to_pc(1.0, &hg, &lu).unwrap() - 0.682_689_492_137_086).abs() < 1e-12);
        let back = pc_to_pc(pc_to_pc(0.37, &lu, &hg).unwrap(), &hg, &lu).unwrap();
        assert!((back - 0.37).abs() < 1e-12);
    }

    #[test]
    fn test_exponential_to_uniform() {
        let lg = BasisFamily::laguerre(0.0).unwrap();
        let y = pc_to_pc(1.0, &lg, &BasisFamily::legendre()).unwrap();
        assert!((y - (1.0 - 2.0 * (-1.0f64).exp())).abs() < 1e-12);
    }

    #[test]
    fn test_jacobi_uniform_special_case() {
        let jb = BasisFamily::jacobi(0.0, 0.0).unwrap();
        let lu = BasisFamily::legendre();
        for x in [-0.9, -0.2, 0.0, 0.55] {
            assert!((pc_to_pc(x, &jb, &lu).unwrap() - x).abs() < 1e-12);
        }
        for x in [-0.95, -0.3, 0.3, 0.8] {
            assert!((pc_to_pc(x, &lu, &jb).unwrap() - x).abs() < 1e-12);
        }
    }

    #[test]
    fn test_beta_and_gamma_inverses_are_sharp() {
        let hg = BasisFamily::hermite();
        let jb = BasisFamily::jacobi(1.0, 2.5).unwrap();
        let lg = BasisFamily::laguerre(1.5).unwrap();
        for x in [-2.5, -0.7, 0.0, 0.4, 1.9] {
            let y = pc_to_pc(x, &hg, &jb).unwrap();
            assert!(y > -1.0 && y < 1.0);
            assert!((pc_to_pc(y, &jb, &hg).unwrap() - x).abs() < 1e-10);
            let z = pc_to_pc(x, &hg, &lg).unwrap();
            assert!((pc_to_pc(z, &lg, &hg).unwrap() - x).abs() < 1e-10);
        }
        // JB(1, 0): (x + 1) / 2 ~ Beta(1, 2), CDF 1 - (1 - u)²
        let jb10 = BasisFamily::jacobi(1.0, 0.0).unwrap();
        let y = pc_to_pc(0.0, &BasisFamily::legendre(), &jb10).unwrap();
        let u = 1.0 - 0.5f64.sqrt();
        assert!((y - (2.0 * u - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_endpoints_without_finite_image() {
        let lu = BasisFamily::legendre();
        let hg = BasisFamily::hermite();
        let lg = BasisFamily::laguerre(0.0).unwrap();
        assert!(matches!(pc_to_pc(1.0, &lu, &hg), Err(UqError::ConfigError(_))));
        assert!(matches!(pc_to_pc(-1.0, &lu, &hg), Err(UqError::ConfigError(_))));
        assert!(matches!(
            pc_map(&array![[0.0], [1.0]], &lu, &lg),
            Err(UqError::ConfigError(_))
        ));
        // the lower endpoint lands on the Laguerre origin
        assert_eq!(pc_to_pc(-1.0, &lu, &lg).unwrap(), 0.0);
        let jb = BasisFamily::jacobi(0.5, 0.5).unwrap();
        assert!((pc_to_pc(1.0, &lu, &jb).unwrap() - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_map_checks_shape_and_support() {
        let lu = BasisFamily::legendre();
        let hg = BasisFamily::hermite();
        let y = pc_map(&array![[-0.5], [0.0], [0.5]], &lu, &hg).unwrap();
        assert!((y[0] + y[2]).abs() < 1e-12);
        assert!(y[1].abs() < 1e-12);
        assert!(matches!(
            pc_map(&array![[0.1, 0.2]], &lu, &hg),
            Err(UqError::UnsupportedOperation(_))
        ));
        assert!(pc_map(&array![[1.5]], &lu, &hg).is_err());
        assert!(pc_map(&array![[1.5]], &lu, &lu).is_err());
        assert!(pc_to_pc(-0.1, &BasisFamily::laguerre(1.0).unwrap(), &lu).is_err());
    }
}
