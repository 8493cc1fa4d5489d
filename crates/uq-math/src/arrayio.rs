// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Array IO
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Whitespace-delimited ASCII arrays, one row per line.
//!
//! Blank lines are skipped; every other line must have the same number of
//! columns.

use ndarray::{Array1, Array2};
use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;
use uq_types::error::{UqError, UqResult};

fn parse_rows<T: FromStr>(text: &str) -> UqResult<Array2<T>> {
    let mut values = Vec::new();
    let mut ncols: Option<usize> = None;
    let mut nrows = 0usize;
    for (lineno, line) in text.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        match ncols {
            None => ncols = Some(fields.len()),
            Some(c) if c != fields.len() => {
                return Err(UqError::Parse(format!(
                    "line {}: expected {c} columns, found {}",
                    lineno + 1,
                    fields.len()
                )));
            }
            _ => {}
        }
        for f in fields {
            let v = f.parse::<T>().map_err(|_| {
                UqError::Parse(format!("line {}: cannot parse '{f}'", lineno + 1))
            })?;
            values.push(v);
        }
        nrows += 1;
    }
    let ncols = ncols.unwrap_or(0);
    Array2::from_shape_vec((nrows, ncols), values)
        .map_err(|e| UqError::Parse(format!("array shape: {e}")))
}

pub fn parse_array(text: &str) -> UqResult<Array2<f64>> {
    parse_rows(text)
}

pub fn parse_index_array(text: &str) -> UqResult<Array2<i64>> {
    parse_rows(text)
}

pub fn read_array<P: AsRef<Path>>(path: P) -> UqResult<Array2<f64>> {
    parse_array(&std::fs::read_to_string(path)?)
}

/// Reads a single column or a single row as a vector.
pub fn read_array_1d<P: AsRef<Path>>(path: P) -> UqResult<Array1<f64>> {
    let arr = read_array(path)?;
    if arr.ncols() == 1 || arr.nrows() == 1 || arr.is_empty() {
        Ok(Array1::from_iter(arr.iter().copied()))
    } else {
        Err(UqError::Parse(format!(
            "expected a vector, found a {}x{} array",
            arr.nrows(),
            arr.ncols()
        )))
    }
}

pub fn read_index_array<P: AsRef<Path>>(path: P) -> UqResult<Array2<i64>> {
    parse_index_array(&std::fs::read_to_string(path)?)
}

pub fn format_array(arr: &Array2<f64>) -> String {
    let mut out = String::new();
    for row in arr.rows() {
        let line: Vec<String> = row.iter().map(|v| format!("{v:.16e}")).collect();
        let _ = writeln!(out, "{}", line.join(" "));
    }
    out
}

pub fn write_array<P: AsRef<Path>>(path: P, arr: &Array2<f64>) -> UqResult<()> {
    std::fs::write(path, format_array(arr))?;
    Ok(())
}

/// Integer rows, e.g. a multi-index in the `mindex.dat` layout.
pub fn write_index_array<P: AsRef<Path>>(path: P, arr: &Array2<i64>) -> UqResult<()> {
    let mut out = String::new();
    for row in arr.rows() {
        let line: Vec<String> = row.iter().map(i64::to_string).collect();
        let _ = writeln!(out, "{}", line.join(" "));
    }
    std::fs::write(path, out)?;
    Ok(())
}

pub fn write_array_1d<P: AsRef<Path>>(path: P, v: &Array1<f64>) -> UqResult<()> {
    let mut out = String::new();
    for x in v {
        let _ = writeln!(out, "{x:.16e}");
    }
    std::fs::write(path, out)?;
    Ok(())
}
