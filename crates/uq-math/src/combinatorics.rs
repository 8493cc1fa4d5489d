// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Combinatorics
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Compositions and graded multi-index enumeration.
//!
//! All multi-index generators share one ordering: by total degree (grade)
//! first, then decreasing lexicographic within a grade. For two dimensions
//! and order 2 this gives `(0,0) (1,0) (0,1) (2,0) (1,1) (0,2)`, so the
//! zero tuple is always first.

use uq_types::error::{UqError, UqResult};

/// Binomial coefficient `C(n, k)`, zero when `k > n`.
pub fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc * (n - i) as u128 / (i + 1) as u128;
    }
    acc as usize
}

/// All compositions of `n` into `dim` non-negative parts.
///
/// Enumerated in Nijenhuis–Wilf order: `(n,0,..,0)` first, `(0,..,0,n)` last.
/// There are `C(n + dim - 1, dim - 1)` of them.
pub fn compositions(n: usize, dim: usize) -> UqResult<Vec<Vec<usize>>> {
    if dim == 0 {
        return Err(UqError::InvalidDimension(
            "compositions need at least one part".to_string(),
        ));
    }
    let mut out = Vec::with_capacity(binomial(n + dim - 1, dim - 1));
    let mut parts = vec![0usize; dim];
    parts[0] = n;
    out.push(parts.clone());

    let mut t = n;
    let mut h = 0usize;
    while parts[dim - 1] != n {
        if t > 1 {
            h = 0;
        }
        h += 1;
        t = parts[h - 1];
        parts[h - 1] = 0;
        parts[0] = t - 1;
        parts[h] += 1;
        out.push(parts.clone());
    }
    Ok(out)
}

/// Total-order set `{ t : Σ t_i ≤ order }` in graded order.
pub fn total_order(dim: usize, order: usize) -> UqResult<Vec<Vec<usize>>> {
    if dim == 0 {
        return Err(UqError::InvalidDimension(
            "total-order set needs dim >= 1".to_string(),
        ));
    }
    Ok(graded_enumerate(dim, order, None))
}

/// Full tensor set `{ t : t_i ≤ orders_i }` in graded order.
pub fn tensor_order(orders: &[usize]) -> UqResult<Vec<Vec<usize>>> {
    if orders.is_empty() {
        return Err(UqError::InvalidDimension(
            "tensor set needs at least one order".to_string(),
        ));
    }
    let max_grade = orders.iter().sum();
    Ok(graded_enumerate(orders.len(), max_grade, Some(orders)))
}

/// Per-dimension capped total-order set: `t_i ≤ orders_i` and
/// `Σ t_i ≤ max(orders)`.
pub fn capped_total_order(orders: &[usize]) -> UqResult<Vec<Vec<usize>>> {
    let Some(&max_grade) = orders.iter().max() else {
        return Err(UqError::InvalidDimension(
            "capped total-order set needs at least one order".to_string(),
        ));
    };
    Ok(graded_enumerate(orders.len(), max_grade, Some(orders)))
}

fn graded_enumerate(dim: usize, max_grade: usize, caps: Option<&[usize]>) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut current = vec![0usize; dim];
    for grade in 0..=max_grade {
        enumerate_grade(0, grade, caps, &mut current, &mut out);
    }
    out
}

fn enumerate_grade(
    pos: usize,
    remaining: usize,
    caps: Option<&[usize]>,
    current: &mut [usize],
    out: &mut Vec<Vec<usize>>,
) {
    let cap = caps.map_or(usize::MAX, |c| c[pos]);
    if pos + 1 == current.len() {
        if remaining <= cap {
            current[pos] = remaining;
            out.push(current.to_vec());
        }
        return;
    }
    for v in (0..=remaining.min(cap)).rev() {
        current[pos] = v;
        enumerate_grade(pos + 1, remaining - v, caps, current, out);
    }
}

/// Position of `tuple` in the infinite graded order over `ℕ^dim`.
pub fn graded_rank(tuple: &[usize]) -> UqResult<usize> {
    let dim = tuple.len();
    if dim == 0 {
        return Err(UqError::InvalidDimension(
            "cannot rank an empty tuple".to_string(),
        ));
    }
    let grade: usize = tuple.iter().sum();
    // tuples of lower grade
    let mut rank = if grade == 0 {
        0
    } else {
        binomial(grade - 1 + dim, dim)
    };
    let mut remaining = grade;
    for (i, &v) in tuple.iter().enumerate().take(dim - 1) {
        let tail = dim - i - 2;
        for w in (v + 1)..=remaining {
            rank += binomial(remaining - w + tail, tail);
        }
        remaining -= v;
    }
    Ok(rank)
}

/// Inverse of [`graded_rank`].
pub fn graded_unrank(rank: usize, dim: usize) -> UqResult<Vec<usize>> {
    if dim == 0 {
        return Err(UqError::InvalidDimension(
            "cannot unrank into zero dimensions".to_string(),
        ));
    }
    let mut grade = 0usize;
    while binomial(grade + dim, dim) <= rank {
        grade += 1;
    }
    let mut pos = if grade == 0 {
        rank
    } else {
        rank - binomial(grade - 1 + dim, dim)
    };

    let mut tuple = vec![0usize; dim];
    let mut remaining = grade;
    for i in 0..dim - 1 {
        let tail = dim - i - 2;
        let mut chosen = 0;
        for w in (0..=remaining).rev() {
            let count = binomial(remaining - w + tail, tail);
            if pos < count {
                chosen = w;
                break;
            }
            pos -= count;
        }
        tuple[i] = chosen;
        remaining -= chosen;
    }
    tuple[dim - 1] = remaining;
    Ok(tuple)
}
