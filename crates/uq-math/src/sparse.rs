// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Sparse Quadrature
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Smolyak sparse grids by the combination technique.
//!
//! A grid is a signed sum of full tensor products of 1D rules. Component
//! points are snapped per dimension to canonical abscissae, duplicates are
//! summed, and points whose weights cancel are dropped. The result is sorted
//! lexicographically and does not depend on assembly order.
//!
//! Levels are zero-based: level 0 is the one-point rule in every dimension.

use crate::combinatorics::{binomial, compositions};
use crate::quad::QuadRule;
use crate::rules::{QuadratureFamily, Rule1d, RuleFamily};
use ndarray::{Array1, Array2};
use std::collections::BTreeMap;
use uq_types::constants::{DEFAULT_CANCEL_RTOL, DEFAULT_MERGE_TOL};
use uq_types::error::{UqError, UqResult};

/// Consolidation tolerances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridOptions {
    /// Abscissae closer than `merge_tol * max(1, |x|)` are one node.
    pub merge_tol: f64,
    /// A summed weight is dropped when `|w| <= cancel_rtol * Σ|contributions|`.
    pub cancel_rtol: f64,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            merge_tol: DEFAULT_MERGE_TOL,
            cancel_rtol: DEFAULT_CANCEL_RTOL,
        }
    }
}

/// Full tensor product of 1D rules with weights multiplied by `scale`.
/// Points come out in lexicographic order, last dimension fastest.
pub fn tensor_product(rules: &[&Rule1d], scale: f64) -> UqResult<QuadRule> {
    if rules.is_empty() {
        return Err(UqError::InvalidDimension(
            "tensor product needs at least one rule".to_string(),
        ));
    }
    let d = rules.len();
    let n: usize = rules.iter().map(|r| r.len()).product();
    let mut points = Array2::zeros((n, d));
    let mut weights = Array1::zeros(n);
    let mut idx = vec![0usize; d];
    for row in 0..n {
        let mut w = scale;
        for (k, rule) in rules.iter().enumerate() {
            points[[row, k]] = rule.points[idx[k]];
            w *= rule.weights[idx[k]];
        }
        weights[row] = w;
        advance(&mut idx, |k| rules[k].len());
    }
    QuadRule::from_parts(points, weights)
}

/// Odometer increment, last position fastest.
fn advance<L: Fn(usize) -> usize>(idx: &mut [usize], len: L) {
    for k in (0..idx.len()).rev() {
        idx[k] += 1;
        if idx[k] < len(k) {
            return;
        }
        idx[k] = 0;
    }
}

/// Sparse-grid builder over one rule family per dimension.
#[derive(Debug, Clone)]
pub struct SparseGrid<F: QuadratureFamily = RuleFamily> {
    families: Vec<F>,
    options: GridOptions,
}

type Combination = Vec<(Vec<usize>, f64)>;

impl<F: QuadratureFamily> SparseGrid<F> {
    pub fn new(families: Vec<F>) -> UqResult<Self> {
        if families.is_empty() {
            return Err(UqError::InvalidDimension(
                "sparse grid needs at least one dimension".to_string(),
            ));
        }
        Ok(Self {
            families,
            options: GridOptions::default(),
        })
    }

    pub fn with_options(mut self, options: GridOptions) -> Self {
        self.options = options;
        self
    }

    pub fn dim(&self) -> usize {
        self.families.len()
    }

    pub fn families(&self) -> &[F] {
        &self.families
    }

    pub fn options(&self) -> GridOptions {
        self.options
    }

    /// Full tensor grid at per-dimension `levels`.
    pub fn tensor(&self, levels: &[usize]) -> UqResult<QuadRule> {
        self.check_levels(levels)?;
        self.assemble(&vec![(levels.to_vec(), 1.0)])
    }

    /// Isotropic Smolyak grid at `level`.
    pub fn isotropic(&self, level: usize) -> UqResult<QuadRule> {
        let combination = self.isotropic_combination(level)?;
        self.assemble(&combination)
    }

    /// Anisotropic grid on `{ l : Σ l_i / L_i <= 1 }`; a dimension with
    /// `L_i = 0` stays at level 0. Equal `L_i` reproduce [`Self::isotropic`].
    pub fn anisotropic(&self, levels: &[usize]) -> UqResult<QuadRule> {
        self.check_levels(levels)?;
        let combination = anisotropic_combination(levels)?;
        self.assemble(&combination)
    }

    /// Upper bound on the isotropic grid size: the summed sizes of its
    /// tensor components before consolidation.
    pub fn estimate_size_isotropic(&self, level: usize) -> UqResult<usize> {
        let combination = self.isotropic_combination(level)?;
        self.estimate(&combination)
    }

    pub fn estimate_size_anisotropic(&self, levels: &[usize]) -> UqResult<usize> {
        self.check_levels(levels)?;
        self.estimate(&anisotropic_combination(levels)?)
    }

    fn check_levels(&self, levels: &[usize]) -> UqResult<()> {
        if levels.len() != self.dim() {
            return Err(UqError::dimension_mismatch(
                "sparse grid levels",
                self.dim(),
                levels.len(),
            ));
        }
        Ok(())
    }

    fn isotropic_combination(&self, level: usize) -> UqResult<Combination> {
        let d = self.dim();
        let mut combination = Vec::new();
        for s in level.saturating_sub(d - 1)..=level {
            let gap = level - s;
            let sign = if gap % 2 == 0 { 1.0 } else { -1.0 };
            let coef = sign * binomial(d - 1, gap) as f64;
            for levels in compositions(s, d)? {
                combination.push((levels, coef));
            }
        }
        Ok(combination)
    }

    fn estimate(&self, combination: &Combination) -> UqResult<usize> {
        let mut total = 0usize;
        for (levels, _) in combination {
            let mut size = 1usize;
            for (fam, &l) in self.families.iter().zip(levels) {
                size = size.saturating_mul(fam.order_for_level(l)?);
            }
            total = total.saturating_add(size);
        }
        Ok(total)
    }

    /// Orders must grow strictly with level and each rule must have the
    /// declared number of points.
    fn check_tables(&self, max_levels: &[usize]) -> UqResult<()> {
        for (fam, &max_level) in self.families.iter().zip(max_levels) {
            let mut prev = 0usize;
            for l in 0..=max_level {
                let order = fam.order_for_level(l)?;
                if order <= prev {
                    return Err(UqError::InvalidRuleTable(format!(
                        "{}: order {order} at level {l} does not exceed {prev}",
                        fam.name()
                    )));
                }
                let rule = fam.rule(l)?;
                if rule.len() != order || rule.weights.len() != order {
                    return Err(UqError::InvalidRuleTable(format!(
                        "{}: level {l} declares {order} points but holds {}",
                        fam.name(),
                        rule.len()
                    )));
                }
                prev = order;
            }
        }
        Ok(())
    }

    fn assemble(&self, combination: &Combination) -> UqResult<QuadRule> {
        let d = self.dim();
        let mut max_levels = vec![0usize; d];
        for (levels, _) in combination {
            for (m, &l) in max_levels.iter_mut().zip(levels) {
                *m = (*m).max(l);
            }
        }
        self.check_tables(&max_levels)?;

        // canonical abscissae and per-level node → canonical index maps
        let mut canon: Vec<Vec<f64>> = Vec::with_capacity(d);
        let mut index_maps: Vec<Vec<Vec<u32>>> = Vec::with_capacity(d);
        for (fam, &max_level) in self.families.iter().zip(&max_levels) {
            let mut values = Vec::new();
            for l in 0..=max_level {
                values.extend_from_slice(&fam.rule(l)?.points);
            }
            let nodes = merge_abscissae(values, self.options.merge_tol);
            let maps = (0..=max_level)
                .map(|l| {
                    fam.rule(l).map(|r| {
                        r.points
                            .iter()
                            .map(|&x| snap(&nodes, x, self.options.merge_tol))
                            .collect()
                    })
                })
                .collect::<UqResult<Vec<Vec<u32>>>>()?;
            canon.push(nodes);
            index_maps.push(maps);
        }

        let mut acc: BTreeMap<Vec<u32>, (f64, f64)> = BTreeMap::new();
        let mut raw = 0usize;
        for (levels, coef) in combination {
            let rules = self
                .families
                .iter()
                .zip(levels)
                .map(|(fam, &l)| fam.rule(l))
                .collect::<UqResult<Vec<&Rule1d>>>()?;
            let n: usize = rules.iter().map(|r| r.len()).product();
            raw += n;
            let mut idx = vec![0usize; d];
            for _ in 0..n {
                let mut w = *coef;
                let mut key = Vec::with_capacity(d);
                for k in 0..d {
                    w *= rules[k].weights[idx[k]];
                    key.push(index_maps[k][levels[k]][idx[k]]);
                }
                let entry = acc.entry(key).or_insert((0.0, 0.0));
                entry.0 += w;
                entry.1 += w.abs();
                advance(&mut idx, |k| rules[k].len());
            }
        }

        let cancel = self.options.cancel_rtol;
        let kept: Vec<(&Vec<u32>, f64)> = acc
            .iter()
            .filter(|(_, v)| v.0.abs() > cancel * v.1)
            .map(|(key, v)| (key, v.0))
            .collect();
        log::debug!(
            "sparse grid d={d}: {} components, {raw} raw points, {} distinct, {} kept",
            combination.len(),
            acc.len(),
            kept.len()
        );

        let mut points = Array2::zeros((kept.len(), d));
        let mut weights = Array1::zeros(kept.len());
        for (row, (key, w)) in kept.into_iter().enumerate() {
            for k in 0..d {
                points[[row, k]] = canon[k][key[k] as usize];
            }
            weights[row] = w;
        }
        QuadRule::from_parts(points, weights)
    }
}

/// Sorted canonical abscissae: each cluster is represented by its smallest
/// member and absorbs values within `tol * max(1, |rep|)` of it.
fn merge_abscissae(mut values: Vec<f64>, tol: f64) -> Vec<f64> {
    values.sort_by(|a, b| a.total_cmp(b));
    let mut nodes: Vec<f64> = Vec::with_capacity(values.len());
    for v in values {
        match nodes.last() {
            Some(&rep) if v - rep <= tol * rep.abs().max(1.0) => {}
            _ => nodes.push(v),
        }
    }
    nodes
}

fn snap(nodes: &[f64], x: f64, tol: f64) -> u32 {
    let i = nodes.partition_point(|&c| c < x);
    if i < nodes.len() && (nodes[i] - x).abs() <= tol * nodes[i].abs().max(1.0) {
        return i as u32;
    }
    // `x` sits above its cluster representative
    i.saturating_sub(1) as u32
}

/// Downward-closed set `{ l : Σ l_i / L_i <= 1 }` with inclusion–exclusion
/// coefficients; zero-coefficient members are omitted.
fn anisotropic_combination(levels: &[usize]) -> UqResult<Combination> {
    let d = levels.len();
    let active: Vec<usize> = (0..d).filter(|&k| levels[k] > 0).collect();
    let corners = u32::try_from(active.len())
        .ok()
        .and_then(|n| 1u64.checked_shl(n))
        .ok_or_else(|| {
            UqError::ConfigError(format!(
                "anisotropic grid with {} refined dimensions exceeds the 63 supported",
                active.len()
            ))
        })?;
    let period = levels
        .iter()
        .filter(|&&l| l > 0)
        .fold(1u64, |acc, &l| lcm(acc, l as u64));
    // integer costs so membership is exact: Σ l_i * (period / L_i) <= period
    let unit: Vec<u64> = levels
        .iter()
        .map(|&l| if l > 0 { period / l as u64 } else { 0 })
        .collect();
    let inside = |l: &[usize]| -> bool {
        let mut cost = 0u64;
        for k in 0..d {
            if levels[k] == 0 {
                if l[k] > 0 {
                    return false;
                }
            } else {
                cost += l[k] as u64 * unit[k];
            }
        }
        cost <= period
    };

    let mut members = Vec::new();
    let mut current = vec![0usize; d];
    collect_members(0, levels, &inside, &mut current, &mut members);

    let mut combination = Vec::new();
    for l in members {
        let mut coef = 0i64;
        let mut probe = l.clone();
        for mask in 0..corners {
            for (bit, &k) in active.iter().enumerate() {
                probe[k] = l[k] + ((mask >> bit) & 1) as usize;
            }
            if inside(&probe) {
                coef += if mask.count_ones() % 2 == 0 { 1 } else { -1 };
            }
        }
        if coef != 0 {
            combination.push((l, coef as f64));
        }
    }
    Ok(combination)
}

fn collect_members<P: Fn(&[usize]) -> bool>(
    pos: usize,
    levels: &[usize],
    inside: &P,
    current: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    if pos == levels.len() {
        out.push(current.clone());
        return;
    }
    for v in 0..=levels[pos] {
        current[pos] = v;
        if !inside(current) {
            break;
        }
        collect_members(pos + 1, levels, inside, current, out);
    }
    current[pos] = 0;
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

fn lcm(a: u64, b: u64) -> u64 {
    a / gcd(a, b) * b
}
