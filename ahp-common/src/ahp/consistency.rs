//! Consistency Scorer
//!
//! Consistency Index (CI), Random Index (RI) and Consistency Ratio (CR) for a
//! comparison matrix of order `n` with dominant eigenvalue `λmax`:
//!
//! - `CI = (λmax - n) / (n - 1)`, and 0 for `n = 1`
//! - `RI` from Saaty's random index table, 1.49 beyond `n = 10`
//! - `CR = CI / RI`, and 0 when `RI = 0`
//!
//! A respondent takes part in aggregation iff `CR <= 0.10`.

use serde::Serialize;

/// Acceptability threshold on CR (inclusive)
pub const CR_THRESHOLD: f64 = 0.10;

/// Random index by matrix order, index 0 = order 1
const RANDOM_INDEX: [f64; 10] = [0.00, 0.00, 0.58, 0.90, 1.12, 1.24, 1.32, 1.41, 1.45, 1.49];

/// RI used beyond the end of the table
const RANDOM_INDEX_EXTRAPOLATED: f64 = 1.49;

/// Random index for a matrix of order `n`
///
/// # Examples
/// ```
/// use ahp_common::ahp::random_index;
///
/// assert_eq!(random_index(2), 0.0);
/// assert_eq!(random_index(3), 0.58);
/// assert_eq!(random_index(15), 1.49);
/// ```
pub fn random_index(n: usize) -> f64 {
    n.checked_sub(1)
        .and_then(|idx| RANDOM_INDEX.get(idx))
        .copied()
        .unwrap_or(if n == 0 { 0.0 } else { RANDOM_INDEX_EXTRAPOLATED })
}

/// Consistency metrics of one matrix
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConsistencyRecord {
    pub max_eigenvalue: f64,
    pub ci: f64,
    pub cr: f64,
    pub ri: f64,
}

impl ConsistencyRecord {
    /// Whether this matrix may be aggregated (`CR <= 0.10`)
    pub fn is_consistent(&self) -> bool {
        is_acceptable(self.cr)
    }
}

/// Threshold test on a consistency ratio
pub fn is_acceptable(cr: f64) -> bool {
    cr <= CR_THRESHOLD
}

/// Score a matrix of order `n` given its dominant eigenvalue
pub fn score_consistency(n: usize, max_eigenvalue: f64) -> ConsistencyRecord {
    let ci = if n > 1 {
        (max_eigenvalue - n as f64) / (n as f64 - 1.0)
    } else {
        0.0
    };
    let ri = random_index(n);
    let cr = if ri != 0.0 { ci / ri } else { 0.0 };

    ConsistencyRecord {
        max_eigenvalue,
        ci,
        cr,
        ri,
    }
}
