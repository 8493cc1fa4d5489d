// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — UQ Math
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Mathematical primitives for SCPN UQ Core.

pub mod arrayio;
pub mod combinatorics;
pub mod gauss;
pub mod linalg;
pub mod patterson;
pub mod quad;
pub mod rules;
pub mod sparse;
