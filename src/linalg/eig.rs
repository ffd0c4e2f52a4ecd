// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Eigendecomposition of a general complex square matrix.
//!
//! `nalgebra` reduces the matrix to complex Schur form `A = Q·T·Qᴴ`.
//! Eigenvectors of the triangular factor are found by back substitution and
//! mapped back through `Q`.

use nalgebra::linalg::Schur;
use ndarray::{Array1, Array2};
use num_complex::Complex64;

use super::{c, from_dmatrix, to_dmatrix};
use crate::error::{Error, Result, ValidationError};

/// Schur iteration cap.
const MAX_SCHUR_ITERATIONS: usize = 10_000;

/// Eigenvalues and (unit-norm, column) eigenvectors of a matrix.
#[derive(Debug, Clone)]
pub struct Eigen {
    /// Eigenvalues, in Schur order.
    pub values: Array1<Complex64>,
    /// Column `k` is the eigenvector for `values[k]`.
    pub vectors: Array2<Complex64>,
}

/// Eigendecompose `a` so that `a · vectors = vectors · diag(values)`.
///
/// The eigenvector matrix is always invertible: it is `Q` times a unit
/// upper-triangular matrix. For exactly degenerate eigenvalues of a
/// diagonalizable matrix the columns span the eigenspace.
///
/// # Errors
/// `Validation` if `a` is not square; `Numerical` if the Schur iteration fails
/// to converge.
pub fn eig(a: &Array2<Complex64>) -> Result<Eigen> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(ValidationError::Precondition(format!(
            "eig requires a square matrix, got {} × {}",
            n,
            a.ncols()
        ))
        .into());
    }
    if n == 0 {
        return Ok(Eigen {
            values: Array1::zeros(0),
            vectors: Array2::zeros((0, 0)),
        });
    }

    let (q, t) = complex_schur(a)?;

    let values = t.diag().to_owned();
    let v = triangular_eigenvectors(&t);
    let mut vectors = q.dot(&v);

    for mut col in vectors.columns_mut() {
        let norm = col.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt();
        if norm > 0.0 {
            col.mapv_inplace(|z| z / norm);
        }
    }

    Ok(Eigen { values, vectors })
}

/// Complex Schur factorization: returns `(Q, T)` with `A = Q·T·Qᴴ` and `T`
/// upper triangular.
fn complex_schur(a: &Array2<Complex64>) -> Result<(Array2<Complex64>, Array2<Complex64>)> {
    let schur = Schur::try_new(to_dmatrix(a), f64::EPSILON, MAX_SCHUR_ITERATIONS)
        .ok_or_else(|| {
            Error::Numerical(format!(
                "Schur iteration did not converge for a {} × {} matrix",
                a.nrows(),
                a.ncols()
            ))
        })?;
    let (q, t) = schur.unpack();
    Ok((from_dmatrix(&q), from_dmatrix(&t)))
}

/// Eigenvectors of an upper-triangular matrix by back substitution.
/// Column `k` has `v[k] = 1` and zeros below.
fn triangular_eigenvectors(t: &Array2<Complex64>) -> Array2<Complex64> {
    let n = t.nrows();
    let t_norm = t.iter().map(|z| z.norm()).fold(0.0_f64, f64::max);
    let small = (f64::EPSILON * t_norm).max(f64::MIN_POSITIVE);

    let mut v = Array2::zeros((n, n));
    for k in 0..n {
        v[[k, k]] = c(1.0);
        let lambda = t[[k, k]];
        for i in (0..k).rev() {
            let mut sum = c(0.0);
            for j in (i + 1)..=k {
                sum += t[[i, j]] * v[[j, k]];
            }
            let mut denom = t[[i, i]] - lambda;
            if denom.norm() < small {
                denom = c(small);
            }
            v[[i, k]] = -sum / denom;
        }
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::{dagger, identity, inverse};

    fn assert_eigenpairs(a: &Array2<Complex64>, e: &Eigen, tol: f64) {
        let av = a.dot(&e.vectors);
        for k in 0..a.nrows() {
            for i in 0..a.nrows() {
                let diff = (av[[i, k]] - e.vectors[[i, k]] * e.values[k]).norm();
                assert!(diff < tol, "pair {k}, row {i}: residual {diff}");
            }
        }
    }

    #[test]
    fn test_eig_diagonal() {
        let mut a = Array2::zeros((3, 3));
        a[[0, 0]] = c(3.0);
        a[[1, 1]] = c(-1.0);
        a[[2, 2]] = Complex64::new(0.0, 2.0);
        let e = eig(&a).unwrap();
        assert_eigenpairs(&a, &e, 1e-12);
        let mut found: Vec<Complex64> = e.values.to_vec();
        found.sort_by(|x, y| x.re.total_cmp(&y.re));
        assert!((found[0] - c(-1.0)).norm() < 1e-12);
        assert!((found[2] - c(3.0)).norm() < 1e-12);
    }

    #[test]
    fn test_eig_rotation_has_complex_pair() {
        // 2D rotation by φ has eigenvalues e^{±iφ}
        let phi: f64 = 0.7;
        let mut a = Array2::zeros((2, 2));
        a[[0, 0]] = c(phi.cos());
        a[[0, 1]] = c(-phi.sin());
        a[[1, 0]] = c(phi.sin());
        a[[1, 1]] = c(phi.cos());
        let e = eig(&a).unwrap();
        assert_eigenpairs(&a, &e, 1e-12);
        for lambda in e.values.iter() {
            assert!((lambda.norm() - 1.0).abs() < 1e-12);
            assert!((lambda.im.abs() - phi.sin()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_eig_non_normal() {
        let a = Array2::from_shape_fn((4, 4), |(i, j)| {
            if j >= i {
                Complex64::new((i + 1) as f64, 0.3 * j as f64)
            } else if i == j + 1 {
                c(0.5)
            } else {
                c(0.0)
            }
        });
        let e = eig(&a).unwrap();
        assert_eigenpairs(&a, &e, 1e-9);
    }

    #[test]
    fn test_eig_degenerate_vectors_invertible() {
        // Orthogonal 1 ⊕ R(φ) ⊕ 1 has a doubly degenerate eigenvalue 1
        let phi: f64 = 1.1;
        let mut a = identity(4);
        a[[1, 1]] = c(phi.cos());
        a[[1, 2]] = c(-phi.sin());
        a[[2, 1]] = c(phi.sin());
        a[[2, 2]] = c(phi.cos());
        let e = eig(&a).unwrap();
        assert_eigenpairs(&a, &e, 1e-10);
        let inv = inverse(&e.vectors).unwrap();
        let round_trip = e.vectors.dot(&inv);
        for ((i, j), val) in round_trip.indexed_iter() {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert!((val - c(expected)).norm() < 1e-9);
        }
    }

    #[test]
    fn test_eig_unitary_similarity_of_schur() {
        let a = Array2::from_shape_fn((5, 5), |(i, j)| {
            Complex64::new(((i * 7 + j * 3) % 5) as f64 - 2.0, ((i + 2 * j) % 3) as f64)
        });
        let (q, t) = complex_schur(&a).unwrap();
        let reconstructed = q.dot(&t).dot(&dagger(&q));
        for ((i, j), val) in reconstructed.indexed_iter() {
            assert!((val - a[[i, j]]).norm() < 1e-10);
        }
        for i in 1..5 {
            for j in 0..i {
                assert!(t[[i, j]].norm() < 1e-10, "T[{i},{j}] not reduced");
            }
        }
    }

    #[test]
    fn test_eig_non_square_rejected() {
        let a = Array2::<Complex64>::zeros((3, 2));
        assert!(eig(&a).is_err());
    }
}
