// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Property-Based Tests (proptest) for uq-pce
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for uq-pce using proptest.
//!
//! Covers: multi-index lookup, projection round trip, Galerkin product
//! symmetry and division, sensitivity bookkeeping.

use ndarray::Array1;
use proptest::prelude::*;
use uq_pce::{MultiIndex, PcSet};
use uq_types::family::{BasisFamily, GridType};

fn family_strategy() -> impl Strategy<Value = BasisFamily> {
    prop_oneof![
        Just(BasisFamily::legendre()),
        Just(BasisFamily::hermite()),
        (0.0f64..2.0).prop_map(|a| BasisFamily::laguerre(a).unwrap()),
        (0.0f64..2.0, 0.0f64..2.0).prop_map(|(a, b)| BasisFamily::jacobi(a, b).unwrap()),
    ]
}

/// Coefficients that are non-zero only on terms of total degree `<= max_degree`.
fn low_degree(set: &PcSet, raw: &[f64], max_degree: usize) -> Array1<f64> {
    let mi = set.multi_index();
    Array1::from_shape_fn(set.len(), |k| {
        if mi.term(k).iter().sum::<usize>() <= max_degree {
            raw[k % raw.len()]
        } else {
            0.0
        }
    })
}

// ── Multi-Index ──────────────────────────────────────────────────────

proptest! {
    /// encode(term(k)) == k for every term.
    #[test]
    fn encode_decode_bijection(dim in 1usize..5, order in 0usize..6) {
        let mi = MultiIndex::total_order(dim, order).unwrap();
        for k in 0..mi.len() {
            prop_assert_eq!(mi.encode(mi.term(k)), Some(k));
            prop_assert_eq!(mi.decode(k), Some(mi.term(k)));
        }
        prop_assert_eq!(mi.zero_term(), Some(0));
    }
}

// ── Projection ───────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Projecting an expansion sampled at the quadrature points gives it back.
    #[test]
    fn projection_round_trip(
        family in family_strategy(),
        raw in prop::collection::vec(-2.0f64..2.0, 10),
    ) {
        let mut set = PcSet::new(family, 3, 2).unwrap();
        set.bind_default_quadrature(GridType::Full, 4).unwrap();
        let c = Array1::from_vec(raw);
        let rule = set.quadrature().unwrap().clone();
        let samples = set.evaluate_batch(&c, rule.points()).unwrap();
        let back = set.galerkin_projection(&samples).unwrap();
        let scale = c.iter().fold(1.0f64, |m, v| m.max(v.abs()));
        for (a, b) in back.iter().zip(c.iter()) {
            prop_assert!((a - b).abs() < 1e-9 * scale, "{} vs {}", a, b);
        }
    }
}

// ── Galerkin Arithmetic ──────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Products commute and division undoes an exact product.
    #[test]
    fn product_then_divide(
        a_raw in prop::collection::vec(-1.0f64..1.0, 6),
        b_raw in prop::collection::vec(-0.3f64..0.3, 6),
    ) {
        let set = PcSet::new(BasisFamily::legendre(), 4, 2).unwrap();
        let a = low_degree(&set, &a_raw, 2);
        let mut b = low_degree(&set, &b_raw, 2);
        b[0] = 2.0;
        let ab = set.product(&a, &b).unwrap();
        let ba = set.product(&b, &a).unwrap();
        for (x, y) in ab.iter().zip(ba.iter()) {
            prop_assert!((x - y).abs() < 1e-13);
        }
        let back = set.divide(&ab, &b).unwrap();
        for (x, y) in back.iter().zip(a.iter()) {
            prop_assert!((x - y).abs() < 1e-10, "{} vs {}", x, y);
        }
    }
}

// ── Sensitivities ────────────────────────────────────────────────────

proptest! {
    /// Main indices never exceed total indices; fractions sum to one.
    #[test]
    fn sensitivity_bounds(raw in prop::collection::vec(-1.0f64..1.0, 20)) {
        let set = PcSet::new(BasisFamily::hermite(), 3, 3).unwrap();
        let c = Array1::from_vec(raw);
        let var = set.variance(&c).unwrap();
        prop_assume!(var > 1e-8);
        let frac = set.variance_fractions(&c).unwrap();
        prop_assert!((frac.sum() - 1.0).abs() < 1e-12);
        let main = set.main_sensitivity(&c).unwrap();
        let total = set.total_sensitivity(&c).unwrap();
        let joint = set.joint_sensitivity(&c).unwrap();
        for d in 0..3 {
            prop_assert!(main[d] <= total[d] + 1e-15);
            prop_assert!(total[d] <= 1.0 + 1e-12);
            prop_assert_eq!(joint[[d, d]], 0.0);
        }
        prop_assert!(main.sum() <= 1.0 + 1e-12);
    }
}
