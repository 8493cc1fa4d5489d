// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — PCE
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Polynomial chaos expansions.
//!
//! Univariate bases, multivariate PC sets with projection, Galerkin
//! arithmetic and sensitivity indices, germ maps and batch evaluators.

pub mod basis;
pub mod eval;
pub mod galerkin;
pub mod multiindex;
pub mod pcmap;
pub mod pcset;
pub mod products;
pub mod projection;
pub mod sensitivity;

pub use basis::{PcBasis, QuadInit};
pub use multiindex::MultiIndex;
pub use pcset::PcSet;
