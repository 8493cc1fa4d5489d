// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Multi-Index Sets
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Immutable multi-index sets indexing the terms of a PC expansion.

use ndarray::Array2;
use std::collections::HashMap;
use std::path::Path;
use uq_math::arrayio::{read_index_array, write_index_array};
use uq_math::combinatorics::{capped_total_order, graded_rank, tensor_order, total_order};
use uq_types::error::{UqError, UqResult};

/// Ordered set of degree tuples, one per PC term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiIndex {
    dim: usize,
    terms: Vec<Vec<usize>>,
    lookup: HashMap<Vec<usize>, usize>,
}

impl MultiIndex {
    /// All tuples of total degree `<= order`, graded order.
    pub fn total_order(dim: usize, order: usize) -> UqResult<Self> {
        Self::from_terms(total_order(dim, order)?)
    }

    /// Full tensor set with a separate maximum degree per dimension.
    pub fn tensor(orders: &[usize]) -> UqResult<Self> {
        Self::from_terms(tensor_order(orders)?)
    }

    /// Per-dimension caps with the total degree capped by the largest one.
    pub fn capped(orders: &[usize]) -> UqResult<Self> {
        Self::from_terms(capped_total_order(orders)?)
    }

    /// From an integer matrix, one term per row (the `mindex.dat` layout).
    pub fn custom(mindex: &Array2<i64>) -> UqResult<Self> {
        if mindex.ncols() == 0 {
            return Err(UqError::InvalidDimension(
                "multi-index matrix has no columns".to_string(),
            ));
        }
        let mut terms = Vec::with_capacity(mindex.nrows());
        for (row_idx, row) in mindex.rows().into_iter().enumerate() {
            let term = row
                .iter()
                .map(|&v| {
                    usize::try_from(v).map_err(|_| {
                        UqError::ConfigError(format!(
                            "multi-index row {row_idx} has negative entry {v}"
                        ))
                    })
                })
                .collect::<UqResult<Vec<usize>>>()?;
            terms.push(term);
        }
        Self::from_terms(terms)
    }

    pub fn from_terms(terms: Vec<Vec<usize>>) -> UqResult<Self> {
        let Some(first) = terms.first() else {
            return Err(UqError::ConfigError(
                "multi-index set has no terms".to_string(),
            ));
        };
        let dim = first.len();
        if dim == 0 {
            return Err(UqError::InvalidDimension(
                "multi-index terms need at least one dimension".to_string(),
            ));
        }
        let mut lookup = HashMap::with_capacity(terms.len());
        for (k, term) in terms.iter().enumerate() {
            if term.len() != dim {
                return Err(UqError::dimension_mismatch(
                    format!("multi-index term {k}"),
                    dim,
                    term.len(),
                ));
            }
            if let Some(prev) = lookup.insert(term.clone(), k) {
                return Err(UqError::ConfigError(format!(
                    "multi-index terms {prev} and {k} are both {term:?}"
                )));
            }
        }
        Ok(Self { dim, terms, lookup })
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Degree tuple of term `k`; panics when `k >= len()`.
    pub fn term(&self, k: usize) -> &[usize] {
        &self.terms[k]
    }

    pub fn terms(&self) -> &[Vec<usize>] {
        &self.terms
    }

    pub fn iter(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.terms.iter().map(Vec::as_slice)
    }

    pub fn to_array(&self) -> Array2<i64> {
        Array2::from_shape_fn((self.len(), self.dim), |(k, d)| self.terms[k][d] as i64)
    }

    /// Total degree of every term.
    pub fn orders(&self) -> Vec<usize> {
        self.terms.iter().map(|t| t.iter().sum()).collect()
    }

    /// Largest total degree in the set.
    pub fn order(&self) -> usize {
        self.orders().into_iter().max().unwrap_or(0)
    }

    /// Number of active (non-zero degree) dimensions per term, and its maximum.
    pub fn effective_dims(&self) -> (Vec<usize>, usize) {
        let counts: Vec<usize> = self
            .terms
            .iter()
            .map(|t| t.iter().filter(|&&a| a > 0).count())
            .collect();
        let max = counts.iter().copied().max().unwrap_or(0);
        (counts, max)
    }

    pub fn max_degree_per_dim(&self) -> Vec<usize> {
        let mut out = vec![0usize; self.dim];
        for term in &self.terms {
            for (m, &a) in out.iter_mut().zip(term) {
                *m = (*m).max(a);
            }
        }
        out
    }

    /// Position of the all-zero (mean) term, if present.
    pub fn zero_term(&self) -> Option<usize> {
        self.lookup.get(&vec![0usize; self.dim]).copied()
    }

    /// Position of `tuple` within this set.
    pub fn encode(&self, tuple: &[usize]) -> Option<usize> {
        self.lookup.get(tuple).copied()
    }

    pub fn decode(&self, k: usize) -> Option<&[usize]> {
        self.terms.get(k).map(Vec::as_slice)
    }

    /// Dimensions with non-zero degree in term `k`.
    pub fn active_dims(&self, k: usize) -> Vec<usize> {
        self.terms[k]
            .iter()
            .enumerate()
            .filter(|&(_, &a)| a > 0)
            .map(|(d, _)| d)
            .collect()
    }

    /// Reads a whitespace integer file, one term per row.
    pub fn from_file<P: AsRef<Path>>(path: P) -> UqResult<Self> {
        Self::custom(&read_index_array(path)?)
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> UqResult<()> {
        write_index_array(path, &self.to_array())
    }

    /// Scalar code of every term in the global graded order over `ℕ^dim`.
    pub fn graded_codes(&self) -> UqResult<Vec<usize>> {
        self.terms.iter().map(|t| graded_rank(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_total_order_layout() {
        let mi = MultiIndex::total_order(2, 2).unwrap();
        assert_eq!(mi.len(), 6);
        assert_eq!(mi.term(0), &[0, 0]);
        assert_eq!(mi.term(1), &[1, 0]);
        assert_eq!(mi.term(2), &[0, 1]);
        assert_eq!(mi.term(4), &[1, 1]);
        assert_eq!(mi.zero_term(), Some(0));
        assert_eq!(mi.orders(), vec![0, 1, 1, 2, 2, 2]);
        assert_eq!(mi.order(), 2);
    }

    #[test]
    fn test_custom_validation() {
        let mi = MultiIndex::custom(&array![[0, 0], [2, 0], [1, 3]]).unwrap();
        assert_eq!(mi.max_degree_per_dim(), vec![2, 3]);
        assert_eq!(mi.effective_dims(), (vec![0, 1, 2], 2));

        match MultiIndex::custom(&array![[0, 0], [-1, 0]]) {
            Err(UqError::ConfigError(msg)) => assert!(msg.contains("negative")),
            other => panic!("Expected ConfigError for negative degree, got {other:?}"),
        }
        assert!(MultiIndex::custom(&array![[0, 1], [0, 1]]).is_err());
        assert!(MultiIndex::custom(&Array2::<i64>::zeros((0, 2))).is_err());
    }

    #[test]
    fn test_ragged_terms_rejected() {
        let err = MultiIndex::from_terms(vec![vec![0, 0], vec![1]]).unwrap_err();
        assert!(matches!(err, UqError::DimensionMismatch { expected: 2, found: 1, .. }));
    }

    #[test]
    fn test_encode_decode_and_codes() {
        let mi = MultiIndex::tensor(&[2, 1, 1]).unwrap();
        assert_eq!(mi.len(), 12);
        for (k, term) in mi.iter().enumerate() {
            assert_eq!(mi.encode(term), Some(k));
            assert_eq!(mi.decode(k), Some(term));
        }
        assert_eq!(mi.encode(&[3, 0, 0]), None);
        assert_eq!(mi.decode(12), None);

        let total = MultiIndex::total_order(3, 3).unwrap();
        let codes = total.graded_codes().unwrap();
        assert_eq!(codes, (0..total.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("uq_mi_{}.dat", std::process::id()));
        let mi = MultiIndex::capped(&[3, 1]).unwrap();
        mi.write(&path).unwrap();
        assert_eq!(MultiIndex::from_file(&path).unwrap(), mi);
        std::fs::write(&path, "0 0\n-1 2\n").unwrap();
        assert!(matches!(
            MultiIndex::from_file(&path),
            Err(UqError::ConfigError(_))
        ));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_to_array_round_trip() {
        let mi = MultiIndex::capped(&[3, 1]).unwrap();
        let back = MultiIndex::custom(&mi.to_array()).unwrap();
        assert_eq!(back, mi);
        assert_eq!(mi.active_dims(mi.encode(&[2, 1]).unwrap()), vec![0, 1]);
    }
}
