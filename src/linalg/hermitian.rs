// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Eigenvalues of Hermitian matrices.

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{Error, Result, ValidationError};

/// Iteration cap handed to the symmetric eigensolver.
const MAX_EIGEN_ITERATIONS: usize = 10_000;

/// Eigenvalues of a Hermitian matrix, sorted ascending.
///
/// Only the Hermitian part `(A + Aᴴ)/2` is used.
///
/// # Errors
/// `Validation` if `a` is not square; `Numerical` if the eigensolver fails
/// to converge.
pub fn eigvalsh(a: &Array2<Complex64>) -> Result<Vec<f64>> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(ValidationError::Precondition(format!(
            "eigvalsh requires a square matrix, got {} × {}",
            n,
            a.ncols()
        ))
        .into());
    }
    if n == 0 {
        return Ok(Vec::new());
    }

    let hermitian = DMatrix::from_fn(n, n, |i, j| (a[[i, j]] + a[[j, i]].conj()) * 0.5);
    let eigen = SymmetricEigen::try_new(hermitian, f64::EPSILON, MAX_EIGEN_ITERATIONS)
        .ok_or_else(|| {
            Error::Numerical(format!(
                "Hermitian eigensolver did not converge for a {} × {} matrix",
                n, n
            ))
        })?;

    let mut values: Vec<f64> = eigen.eigenvalues.iter().copied().collect();
    values.sort_by(f64::total_cmp);
    Ok(values)
}

/// Number of eigenvalues of a Hermitian positive semidefinite matrix that
/// exceed `rel_tol` times the largest one.
pub fn numerical_rank(a: &Array2<Complex64>, rel_tol: f64) -> Result<usize> {
    let values = eigvalsh(a)?;
    let largest = values.last().copied().unwrap_or(0.0);
    if largest <= 0.0 {
        return Ok(0);
    }
    Ok(values.iter().filter(|&&v| v > rel_tol * largest).count())
}
