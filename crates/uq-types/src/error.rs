// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Error Taxonomy
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UqError {
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    #[error("Dimension mismatch in {context}: expected {expected}, got {found}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    #[error("Unsupported level {level} for {family} rule (maximum level {max})")]
    UnsupportedLevel {
        family: String,
        level: usize,
        max: usize,
    },

    #[error("Invalid quadrature rule table: {0}")]
    InvalidRuleTable(String),

    #[error("Unrecognized function type: {0}")]
    UnrecognizedFunctionType(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Series did not converge after {iterations} terms (relative change {residual:e})")]
    ConvergenceFailure { iterations: usize, residual: f64 },

    #[error("Term count mismatch: expected {expected} PC terms, got {found}")]
    TermCountMismatch { expected: usize, found: usize },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Linear algebra error: {0}")]
    LinAlg(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UqError {
    pub fn dimension_mismatch(context: impl Into<String>, expected: usize, found: usize) -> Self {
        UqError::DimensionMismatch {
            context: context.into(),
            expected,
            found,
        }
    }
}

pub type UqResult<T> = Result<T, UqError>;

/// Fails with `TermCountMismatch` unless `found == expected`.
pub fn ensure_terms(expected: usize, found: usize) -> UqResult<()> {
    if expected != found {
        return Err(UqError::TermCountMismatch { expected, found });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_context() {
        let err = UqError::dimension_mismatch("xdata columns", 2, 3);
        let msg = err.to_string();
        assert!(msg.contains("xdata columns"));
        assert!(msg.contains("expected 2"));
        assert!(msg.contains("got 3"));
    }

    #[test]
    fn test_ensure_terms() {
        assert!(ensure_terms(10, 10).is_ok());
        match ensure_terms(10, 6) {
            Err(UqError::TermCountMismatch { expected, found }) => {
                assert_eq!(expected, 10);
                assert_eq!(found, 6);
            }
            other => panic!("Expected TermCountMismatch, got {other:?}"),
        }
    }
}
