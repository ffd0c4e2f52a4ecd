// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Linear solves and inverses through `nalgebra`'s LU decomposition.

use ndarray::Array2;
use num_complex::Complex64;

use super::{from_dmatrix, to_dmatrix};
use crate::error::{Error, Result, ValidationError};

fn require_square(a: &Array2<Complex64>, op: &str) -> Result<()> {
    if a.nrows() != a.ncols() {
        return Err(ValidationError::Precondition(format!(
            "{} requires a square matrix, got {} × {}",
            op,
            a.nrows(),
            a.ncols()
        ))
        .into());
    }
    Ok(())
}

/// Solve `A · X = B` for `X`.
///
/// # Errors
/// `Validation` if the shapes are incompatible, `Numerical` if `A` is
/// singular.
pub fn solve_linear(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Result<Array2<Complex64>> {
    require_square(a, "solve_linear")?;
    let n = a.nrows();
    if b.nrows() != n {
        return Err(ValidationError::LengthMismatch {
            what: "right-hand side rows".into(),
            expected: n,
            actual: b.nrows(),
        }
        .into());
    }

    let x = to_dmatrix(a)
        .lu()
        .solve(&to_dmatrix(b))
        .ok_or_else(|| Error::Numerical(format!("{} × {} system is singular", n, n)))?;
    Ok(from_dmatrix(&x))
}

/// Matrix inverse.
pub fn inverse(a: &Array2<Complex64>) -> Result<Array2<Complex64>> {
    require_square(a, "inverse")?;
    let inv = to_dmatrix(a)
        .lu()
        .try_inverse()
        .ok_or_else(|| Error::Numerical("matrix is singular".into()))?;
    Ok(from_dmatrix(&inv))
}
