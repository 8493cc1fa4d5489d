// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Abscissae from different tensor components closer than this (scaled by
/// `max(1, |x|)`) are treated as the same sparse-grid node.
/// The nested tables reuse the coarser level's nodes bit-for-bit, so the
/// tolerance only matters for non-nested Gauss rules sharing the origin.
pub const DEFAULT_MERGE_TOL: f64 = 1e-13;

/// A consolidated sparse-grid weight is dropped when its magnitude falls below
/// this fraction of the summed magnitudes of the contributions it came from.
pub const DEFAULT_CANCEL_RTOL: f64 = 1e-13;

/// Triple/quadruple product entries below this fraction of
/// `sqrt(Π normSq)` are treated as structural zeros.
pub const PRODUCT_SPARSITY_TOL: f64 = 1e-12;

/// Default relative tolerance for the Taylor-series arithmetic path.
pub const DEFAULT_TAYLOR_TOL: f64 = 1e-12;

/// Default hard cap on Taylor terms.
pub const DEFAULT_TAYLOR_MAX_TERMS: usize = 500;

/// Default number of RK4 steps / Gauss–Legendre nodes for the integration path.
pub const DEFAULT_INTEGRATION_POINTS: usize = 32;

/// Deepest tabulated Clenshaw–Curtis level (1025 points).
pub const MAX_CC_LEVEL: usize = 10;

/// Deepest Gauss–Kronrod–Patterson level for the uniform weight (63 points).
pub const MAX_GKP_UNIFORM_LEVEL: usize = 5;

/// Deepest Genz–Keister level for the normal weight (35 points).
pub const MAX_GKP_NORMAL_LEVEL: usize = 4;

/// Deepest Gauss level accepted by sparse-grid families (4097 points).
pub const MAX_GAUSS_LEVEL: usize = 12;

/// Default seed for basis random number generators.
pub const DEFAULT_SEED: u64 = 1;
