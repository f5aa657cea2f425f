//! Dense symmetric eigen helpers shared by the oracle and preprocessor.
//!
//! All routines operate on `nalgebra` dynamic matrices. Inputs are
//! symmetrized before decomposition so accumulated floating-point
//! asymmetry never reaches the eigensolver.

use nalgebra::linalg::SymmetricEigen;
use nalgebra::{DMatrix, DVector};

use crate::error::{SamplerError, SamplerResult};

/// Symmetrize: 0.5 * (M + Mᵀ).
pub fn symmetrize(m: &DMatrix<f64>) -> DMatrix<f64> {
    0.5 * (m + m.transpose())
}

/// Smallest eigenvalue of a symmetric matrix.
pub fn min_eigenvalue(a: &DMatrix<f64>) -> f64 {
    let eig = SymmetricEigen::new(a.clone());
    eig.eigenvalues.iter().copied().fold(f64::INFINITY, f64::min)
}

/// Largest eigenvalue of a symmetric matrix.
pub fn max_eigenvalue(a: &DMatrix<f64>) -> f64 {
    let eig = SymmetricEigen::new(a.clone());
    eig.eigenvalues
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Smallest eigenvalue with a unit eigenvector.
pub fn min_eigenpair(a: &DMatrix<f64>) -> (f64, DVector<f64>) {
    let eig = SymmetricEigen::new(a.clone());
    let mut min_val = f64::INFINITY;
    let mut min_idx = 0;
    for (i, &v) in eig.eigenvalues.iter().enumerate() {
        if v < min_val {
            min_val = v;
            min_idx = i;
        }
    }
    (min_val, eig.eigenvectors.column(min_idx).into_owned())
}

/// A^{-1/2} for a symmetric positive definite matrix.
///
/// Fails with `Numerical` when any eigenvalue is non-positive or the
/// decomposition produced non-finite values.
pub fn inv_sqrt(a: &DMatrix<f64>) -> SamplerResult<DMatrix<f64>> {
    let eig = SymmetricEigen::new(a.clone());
    let min_eig = eig.eigenvalues.iter().copied().fold(f64::INFINITY, f64::min);
    if !min_eig.is_finite() {
        return Err(SamplerError::Numerical(
            "eigendecomposition produced non-finite values".to_string(),
        ));
    }
    if min_eig <= 0.0 {
        return Err(SamplerError::Numerical(format!(
            "matrix is not positive definite (min eigenvalue {:.3e})",
            min_eig
        )));
    }
    let inv_sqrt_vals = eig.eigenvalues.map(|v| 1.0 / v.sqrt());
    Ok(&eig.eigenvectors
        * DMatrix::from_diagonal(&inv_sqrt_vals)
        * eig.eigenvectors.transpose())
}
