//! Symmetric eigenvalue helpers for validating covariance matrices.

use super::Matrix;
use crate::error::{CovarianzaError, Result};

/// Computes the eigenvalues of a symmetric matrix.
///
/// The input is assumed symmetric; only its lower triangle is used by
/// the underlying decomposition. Eigenvalues are returned in no
/// particular order.
///
/// # Errors
///
/// Returns an error if the matrix is not square.
///
/// # Examples
///
/// ```
/// use covarianza::primitives::{linalg, Matrix};
///
/// let m = Matrix::eye(3);
/// let eigenvalues = linalg::symmetric_eigenvalues(&m).expect("square matrix");
/// assert!(eigenvalues.iter().all(|&v| (v - 1.0).abs() < 1e-12));
/// ```
pub fn symmetric_eigenvalues(m: &Matrix<f64>) -> Result<Vec<f64>> {
    use nalgebra::{DMatrix, SymmetricEigen};

    let (rows, cols) = m.shape();
    if rows != cols {
        return Err(CovarianzaError::ShapeMismatch {
            expected: format!("square matrix ({rows}x{rows})"),
            actual: format!("{rows}x{cols}"),
        });
    }
    if rows == 0 {
        return Ok(Vec::new());
    }

    let dm = DMatrix::from_row_slice(rows, cols, m.as_slice());
    let eigen = SymmetricEigen::new(dm);
    Ok(eigen.eigenvalues.iter().copied().collect())
}

/// Checks that a symmetric matrix is positive semi-definite.
///
/// All eigenvalues must be at least `-tol`, where `tol` absorbs the
/// rounding noise of floating-point eigendecomposition.
///
/// # Errors
///
/// Returns an error if the matrix is not square.
pub fn is_positive_semi_definite(m: &Matrix<f64>, tol: f64) -> Result<bool> {
    let eigenvalues = symmetric_eigenvalues(m)?;
    Ok(eigenvalues.iter().all(|&v| v >= -tol))
}
