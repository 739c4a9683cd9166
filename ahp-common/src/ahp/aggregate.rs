//! Aggregator
//!
//! Element-wise geometric mean of the consistent respondents' matrices. The
//! geometric mean keeps the reciprocal property, so the consensus is itself a
//! comparison matrix and goes back through the eigen solver and scorer.

use super::matrix::ComparisonMatrix;
use crate::{Error, Result};
use nalgebra::DMatrix;

/// Consensus matrix `exp(Σ ln M_r[i][j] / R)` over `matrices`
///
/// Equal to `(∏ M_r[i][j])^(1/R)`, but accumulated in log space so large
/// respondent counts cannot overflow the product.
///
/// Returns `Ok(None)` for an empty input.
///
/// # Errors
/// [`Error::MatrixShapeMismatch`] if the matrices do not share one order.
pub fn geometric_mean<'a, I>(matrices: I) -> Result<Option<ComparisonMatrix>>
where
    I: IntoIterator<Item = &'a ComparisonMatrix>,
{
    let mut iter = matrices.into_iter();
    let Some(first) = iter.next() else {
        return Ok(None);
    };

    let n = first.order();
    let mut log_sum: DMatrix<f64> = first.as_matrix().map(f64::ln);
    let mut count = 1usize;

    for matrix in iter {
        if matrix.order() != n {
            return Err(Error::MatrixShapeMismatch {
                expected: n,
                found: matrix.order(),
            });
        }
        log_sum += matrix.as_matrix().map(f64::ln);
        count += 1;
    }

    let mut consensus = (log_sum / count as f64).map(f64::exp);
    consensus.fill_diagonal(1.0);

    Ok(Some(ComparisonMatrix::from_reciprocal(consensus)))
}
