// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Sparse Legendre Grid Regression Tests
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use uq_math::quad::QuadRule;
use uq_types::family::BasisFamily;

fn lu2() -> [BasisFamily; 2] {
    [BasisFamily::legendre(); 2]
}

#[test]
fn test_level5_moments() {
    let rule = QuadRule::sparse(&lu2(), 5).unwrap();
    let (mut s0, mut s2, mut s22) = (0.0, 0.0, 0.0);
    for (p, &w) in rule.points().rows().into_iter().zip(rule.weights()) {
        s0 += w;
        s2 += w * p[0] * p[0];
        s22 += w * p[0] * p[0] * p[1] * p[1];
    }
    assert!((s0 - 1.0).abs() < 1e-12);
    assert!((s2 - 1.0 / 3.0).abs() < 1e-12);
    assert!((s22 - 1.0 / 9.0).abs() < 1e-12);
}

/// Level-3 nodes: Gauss–Legendre rules of 1, 3, 5 and 9 points combined.
const LEVEL3_NODES: [[f64; 2]; 49] = [
    [-9.681602395076263e-01, 0.0],
    [-9.061798459386639e-01, -7.745966692414834e-01],
    [-9.061798459386639e-01, 0.0],
    [-9.061798459386639e-01, 7.745966692414834e-01],
    [-8.360311073266358e-01, 0.0],
    [-7.745966692414834e-01, -9.061798459386639e-01],
    [-7.745966692414834e-01, -7.745966692414834e-01],
    [-7.745966692414834e-01, -5.384693101056831e-01],
    [-7.745966692414834e-01, 0.0],
    [-7.745966692414834e-01, 5.384693101056831e-01],
    [-7.745966692414834e-01, 7.745966692414834e-01],
    [-7.745966692414834e-01, 9.061798459386639e-01],
    [-6.133714327005904e-01, 0.0],
    [-5.384693101056831e-01, -7.745966692414834e-01],
    [-5.384693101056831e-01, 0.0],
    [-5.384693101056831e-01, 7.745966692414834e-01],
    [-3.242534234038089e-01, 0.0],
    [0.0, -9.681602395076263e-01],
    [0.0, -9.061798459386639e-01],
    [0.0, -8.360311073266358e-01],
    [0.0, -7.745966692414834e-01],
    [0.0, -6.133714327005904e-01],
    [0.0, -5.384693101056831e-01],
    [0.0, -3.242534234038089e-01],
    [0.0, 0.0],
    [0.0, 3.242534234038089e-01],
    [0.0, 5.384693101056831e-01],
    [0.0, 6.133714327005904e-01],
    [0.0, 7.745966692414834e-01],
    [0.0, 8.360311073266358e-01],
    [0.0, 9.061798459386639e-01],
    [0.0, 9.681602395076263e-01],
    [3.242534234038089e-01, 0.0],
    [5.384693101056831e-01, -7.745966692414834e-01],
    [5.384693101056831e-01, 0.0],
    [5.384693101056831e-01, 7.745966692414834e-01],
    [6.133714327005904e-01, 0.0],
    [7.745966692414834e-01, -9.061798459386639e-01],
    [7.745966692414834e-01, -7.745966692414834e-01],
    [7.745966692414834e-01, -5.384693101056831e-01],
    [7.745966692414834e-01, 0.0],
    [7.745966692414834e-01, 5.384693101056831e-01],
    [7.745966692414834e-01, 7.745966692414834e-01],
    [7.745966692414834e-01, 9.061798459386639e-01],
    [8.360311073266358e-01, 0.0],
    [9.061798459386639e-01, -7.745966692414834e-01],
    [9.061798459386639e-01, 0.0],
    [9.061798459386639e-01, 7.745966692414834e-01],
    [9.681602395076263e-01, 0.0],
];

#[test]
fn test_level3_nodes() {
    let rule = QuadRule::sparse(&lu2(), 3).unwrap();
    assert_eq!(rule.len(), LEVEL3_NODES.len());
    let mut matched = vec![false; rule.len()];
    for reference in LEVEL3_NODES.iter() {
        let hit = (0..rule.len()).find(|&i| {
            let p = rule.point(i);
            !matched[i]
                && (p[0] - reference[0]).abs() < 1e-14
                && (p[1] - reference[1]).abs() < 1e-14
        });
        match hit {
            Some(i) => matched[i] = true,
            None => panic!("no grid node at {reference:?}"),
        }
    }
    assert!((rule.total_mass() - 1.0).abs() < 1e-13);
}

#[test]
fn test_level3_sorted_order() {
    let mut rule = QuadRule::sparse(&lu2(), 3).unwrap();
    rule.sort_lexicographic();
    let first = rule.point(0);
    assert!((first[0] + 9.681602395076263e-01).abs() < 1e-14);
    assert!(first[1].abs() < 1e-14);
    let last = rule.point(rule.len() - 1);
    assert!((last[0] - 9.681602395076263e-01).abs() < 1e-14);
}
