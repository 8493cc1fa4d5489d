// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Function Evaluators
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Batch evaluation of PC expansions and germ maps on `n × dim` input
//! arrays, the library side of the evaluation tools.

use crate::multiindex::MultiIndex;
use crate::pcmap::pc_map;
use crate::pcset::PcSet;
use ndarray::{Array1, Array2};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use uq_math::arrayio::{write_array, write_array_1d};
use uq_types::error::{UqError, UqResult};
use uq_types::family::{BasisFamily, PcType};

/// Output file names written by [`EvalOutput::write`].
pub const VALUES_FILE: &str = "ydata.dat";
pub const GRADIENT_FILE: &str = "gdata.dat";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionType {
    /// Total-order expansion.
    Pc,
    /// Expansion over an explicit multi-index.
    PcMultiIndex,
    /// Germ-to-germ map.
    PcMap,
}

impl FunctionType {
    pub fn tag(self) -> &'static str {
        match self {
            FunctionType::Pc => "PC",
            FunctionType::PcMultiIndex => "PC_mi",
            FunctionType::PcMap => "PCmap",
        }
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for FunctionType {
    type Err = UqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PC" => Ok(FunctionType::Pc),
            "PC_mi" => Ok(FunctionType::PcMultiIndex),
            "PCmap" => Ok(FunctionType::PcMap),
            other => Err(UqError::UnrecognizedFunctionType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub enum EvalRequest {
    Pc {
        family: BasisFamily,
        order: usize,
        coefficients: Array1<f64>,
    },
    PcMultiIndex {
        family: BasisFamily,
        multi_index: Array2<i64>,
        coefficients: Array1<f64>,
    },
    PcMap {
        from: BasisFamily,
        to: BasisFamily,
    },
}

impl EvalRequest {
    pub fn function_type(&self) -> FunctionType {
        match self {
            EvalRequest::Pc { .. } => FunctionType::Pc,
            EvalRequest::PcMultiIndex { .. } => FunctionType::PcMultiIndex,
            EvalRequest::PcMap { .. } => FunctionType::PcMap,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvalOutput {
    pub values: Array1<f64>,
    /// `n × dim`, only for [`FunctionType::Pc`] on the uniform germ.
    pub gradient: Option<Array2<f64>>,
}

impl EvalOutput {
    /// Writes the values (and gradient, when present) into `dir`.
    pub fn write<P: AsRef<Path>>(&self, dir: P) -> UqResult<()> {
        let dir = dir.as_ref();
        write_array_1d(dir.join(VALUES_FILE), &self.values)?;
        if let Some(g) = &self.gradient {
            write_array(dir.join(GRADIENT_FILE), g)?;
        }
        Ok(())
    }
}

fn total_order_set(xdata: &Array2<f64>, order: usize, family: BasisFamily) -> UqResult<PcSet> {
    PcSet::new(family, order, xdata.ncols())
}

/// Total-order expansion of dimension `xdata.ncols()` evaluated row-wise.
pub fn evaluate_pc(
    xdata: &Array2<f64>,
    order: usize,
    coeffs: &Array1<f64>,
    family: BasisFamily,
) -> UqResult<Array1<f64>> {
    total_order_set(xdata, order, family)?.evaluate_batch(coeffs, xdata)
}

pub fn gradient_pc(
    xdata: &Array2<f64>,
    order: usize,
    coeffs: &Array1<f64>,
    family: BasisFamily,
) -> UqResult<Array2<f64>> {
    total_order_set(xdata, order, family)?.gradient_batch(coeffs, xdata)
}

pub fn evaluate_pc_mi(
    xdata: &Array2<f64>,
    mindex: &Array2<i64>,
    coeffs: &Array1<f64>,
    family: BasisFamily,
) -> UqResult<Array1<f64>> {
    if mindex.ncols() != xdata.ncols() {
        return Err(UqError::dimension_mismatch(
            "input columns for multi-index",
            mindex.ncols(),
            xdata.ncols(),
        ));
    }
    let set = PcSet::with_multi_index(MultiIndex::custom(mindex)?, family)?;
    set.evaluate_batch(coeffs, xdata)
}

pub fn evaluate_pc_map(
    xdata: &Array2<f64>,
    from: &BasisFamily,
    to: &BasisFamily,
) -> UqResult<Array1<f64>> {
    pc_map(xdata, from, to)
}

/// Runs one request over `xdata`. Gradients are produced only for
/// total-order expansions of the uniform (`LU`) germ.
pub fn evaluate(request: &EvalRequest, xdata: &Array2<f64>) -> UqResult<EvalOutput> {
    log::debug!(
        "evaluating {} on {} x {} inputs",
        request.function_type(),
        xdata.nrows(),
        xdata.ncols()
    );
    match request {
        EvalRequest::Pc {
            family,
            order,
            coefficients,
        } => {
            let set = total_order_set(xdata, *order, *family)?;
            let gradient = if family.pc_type == PcType::Legendre {
                Some(set.gradient_batch(coefficients, xdata)?)
            } else {
                None
            };
            Ok(EvalOutput {
                values: set.evaluate_batch(coefficients, xdata)?,
                gradient,
            })
        }
        EvalRequest::PcMultiIndex {
            family,
            multi_index,
            coefficients,
        } => Ok(EvalOutput {
            values: evaluate_pc_mi(xdata, multi_index, coefficients, *family)?,
            gradient: None,
        }),
        EvalRequest::PcMap { from, to } => Ok(EvalOutput {
            values: evaluate_pc_map(xdata, from, to)?,
            gradient: None,
        }),
    }
}
