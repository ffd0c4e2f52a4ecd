// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Dense complex linear algebra used by germ selection.
//!
//! The crate stores matrices as `ndarray` arrays. Factorizations go through
//! `nalgebra` and are converted at the boundary with [`to_dmatrix`] and
//! [`from_dmatrix`].
//!
//! - [`solve_linear`] / [`inverse`]: LU with partial pivoting
//! - [`matrix_exp`]: scaling-and-squaring with Padé(13)
//! - [`eig`]: eigendecomposition of a general complex matrix via complex Schur
//! - [`eigvalsh`]: eigenvalues of a Hermitian matrix
//!
//! Vectorization throughout the crate is row-major, i.e.
//! `vec(A·X·B) = (A ⊗ Bᵀ)·vec(X)`.

pub mod eig;
pub mod expm;
pub mod hermitian;
pub mod solve;

pub use eig::{eig, Eigen};
pub use expm::matrix_exp;
pub use hermitian::{eigvalsh, numerical_rank};
pub use solve::{inverse, solve_linear};

use nalgebra::DMatrix;
use ndarray::Array2;
use num_complex::Complex64;

/// Complex number with zero imaginary part.
#[inline]
pub fn c(x: f64) -> Complex64 {
    Complex64::new(x, 0.0)
}

/// `n × n` complex identity.
pub fn identity(n: usize) -> Array2<Complex64> {
    Array2::from_diag_elem(n, c(1.0))
}

/// Conjugate transpose.
pub fn dagger(m: &Array2<Complex64>) -> Array2<Complex64> {
    m.t().mapv(|z| z.conj())
}

/// Kronecker product `a ⊗ b`.
pub fn kron(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Array2<Complex64> {
    let (m, n) = a.dim();
    let (p, q) = b.dim();
    let mut out = Array2::zeros((m * p, n * q));
    for ((i, j), &aij) in a.indexed_iter() {
        if aij == Complex64::new(0.0, 0.0) {
            continue;
        }
        for ((k, l), &bkl) in b.indexed_iter() {
            out[[i * p + k, j * q + l]] = aij * bkl;
        }
    }
    out
}

/// Copy an `ndarray` matrix into a column-major `nalgebra` matrix.
pub fn to_dmatrix(a: &Array2<Complex64>) -> DMatrix<Complex64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

/// Copy a `nalgebra` matrix back into an `ndarray` matrix.
pub fn from_dmatrix(m: &DMatrix<Complex64>) -> Array2<Complex64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

/// Frobenius norm of a complex array of any shape.
pub fn frobenius_norm<'a, I>(values: I) -> f64
where
    I: IntoIterator<Item = &'a Complex64>,
{
    values
        .into_iter()
        .map(|z| z.norm_sqr())
        .sum::<f64>()
        .sqrt()
}
