//! Eigen Solver
//!
//! Dominant eigenvalue and normalized priority weights of a comparison matrix.
//!
//! nalgebra has no general (non-symmetric) eigenvector routine, so the solve
//! runs in two steps:
//! 1. All eigenvalues from the real Schur form; the one with the largest real
//!    part is the dominant (Perron) eigenvalue `λ`.
//! 2. The eigenvector is the null vector of `A - λI`: the right singular
//!    vector belonging to its smallest singular value.
//!
//! The vector is then scaled so its entries sum to 1, which also fixes the
//! arbitrary sign returned by the SVD.

use crate::{Error, Result};
use nalgebra::linalg::{Schur, SVD};
use nalgebra::DMatrix;

const SCHUR_MAX_ITERATIONS: usize = 10_000;
const SVD_MAX_ITERATIONS: usize = 10_000;

/// Dominant eigenvalue with its normalized eigenvector
#[derive(Debug, Clone, PartialEq)]
pub struct DominantEigen {
    /// Real part of the largest-real-part eigenvalue (λmax)
    pub max_eigenvalue: f64,
    /// Eigenvector scaled to sum to 1, one weight per criterion
    pub weights: Vec<f64>,
}

/// Compute λmax and the priority weight vector of a square matrix
///
/// # Errors
/// - [`Error::InvalidInput`] if the matrix is empty or not square
/// - [`Error::NumericDegeneracy`] if the matrix holds non-finite entries, the
///   decomposition does not converge, or the eigenvector sums to zero
pub fn dominant_eigen(matrix: &DMatrix<f64>) -> Result<DominantEigen> {
    let n = matrix.nrows();
    if n == 0 || !matrix.is_square() {
        return Err(Error::InvalidInput(format!(
            "Eigen solver needs a non-empty square matrix, got {}x{}",
            matrix.nrows(),
            matrix.ncols()
        )));
    }

    if matrix.iter().any(|v| !v.is_finite()) {
        return Err(Error::NumericDegeneracy(
            "matrix contains non-finite entries (zero or non-numeric judgment?)".to_string(),
        ));
    }

    if n == 1 {
        return Ok(DominantEigen {
            max_eigenvalue: matrix[(0, 0)],
            weights: vec![1.0],
        });
    }

    let schur = Schur::try_new(matrix.clone(), f64::EPSILON, SCHUR_MAX_ITERATIONS)
        .ok_or_else(|| {
            Error::NumericDegeneracy("Schur decomposition did not converge".to_string())
        })?;

    let max_eigenvalue = schur
        .complex_eigenvalues()
        .iter()
        .map(|c| c.re)
        .fold(f64::NEG_INFINITY, f64::max);

    if !max_eigenvalue.is_finite() {
        return Err(Error::NumericDegeneracy(format!(
            "dominant eigenvalue is not finite ({})",
            max_eigenvalue
        )));
    }

    let shifted = matrix - DMatrix::<f64>::identity(n, n) * max_eigenvalue;
    let svd = SVD::try_new(shifted, false, true, f64::EPSILON, SVD_MAX_ITERATIONS)
        .ok_or_else(|| Error::NumericDegeneracy("SVD did not converge".to_string()))?;

    let v_t = svd
        .v_t
        .ok_or_else(|| Error::NumericDegeneracy("SVD returned no right vectors".to_string()))?;

    let null_index = svd
        .singular_values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(idx, _)| idx)
        .ok_or_else(|| Error::NumericDegeneracy("SVD returned no singular values".to_string()))?;

    let eigenvector: Vec<f64> = v_t.row(null_index).iter().copied().collect();
    let weights = normalize_weights(&eigenvector)?;

    Ok(DominantEigen {
        max_eigenvalue,
        weights,
    })
}

/// Scale `vector` so its entries sum to 1
///
/// # Errors
/// [`Error::NumericDegeneracy`] when the sum is zero or not finite.
pub fn normalize_weights(vector: &[f64]) -> Result<Vec<f64>> {
    let sum: f64 = vector.iter().sum();
    if !sum.is_finite() || sum.abs() < f64::EPSILON {
        return Err(Error::NumericDegeneracy(format!(
            "eigenvector sums to {} and cannot be normalized",
            sum
        )));
    }

    let weights: Vec<f64> = vector.iter().map(|v| v / sum).collect();
    if weights.iter().any(|w| !w.is_finite()) {
        return Err(Error::NumericDegeneracy(
            "normalized weights are not finite".to_string(),
        ));
    }
    Ok(weights)
}
