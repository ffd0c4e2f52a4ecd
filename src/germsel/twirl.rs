// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Perfect-twirl superoperator.
//!
//! Twirling an operator `X` w.r.t. `W = M·diag(λ)·M⁻¹` keeps only the part
//! of `X` that is block-diagonal in `W`'s eigenspaces:
//! `X → Σᵢ Aᵢ·X·Aᵢ / tr(Pᵢ)` with `Aᵢ = M·Pᵢ·M⁻¹`, where `Pᵢ` selects the
//! eigenvalues within `eps` of `λᵢ`. Under row-major vectorization this is
//! the superoperator `Σᵢ (Aᵢ ⊗ Aᵢᵀ) / tr(Pᵢ)`.

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{Result, ValidationError};
use crate::linalg::{c, eig, inverse, kron};

/// Build the `d² × d²` superoperator twirling w.r.t. the eigenspaces of `wrt`.
///
/// Eigenvalues closer than `eps` are treated as degenerate. The result is
/// complex and in general not Hermitian.
///
/// # Errors
/// `Validation` if `wrt` is not square; `Numerical` if its eigenvector
/// matrix cannot be inverted.
pub fn perfect_twirl_superop(wrt: &Array2<Complex64>, eps: f64) -> Result<Array2<Complex64>> {
    let dim = wrt.nrows();
    if dim != wrt.ncols() {
        return Err(ValidationError::Precondition(format!(
            "twirl reference must be square, got {} × {}",
            dim,
            wrt.ncols()
        ))
        .into());
    }

    let decomposition = eig(wrt)?;
    let values = &decomposition.values;
    let m = &decomposition.vectors;
    let m_inv = inverse(m)?;

    let mut superop = Array2::zeros((dim * dim, dim * dim));
    for i in 0..dim {
        let cluster: Vec<usize> = (0..dim)
            .filter(|&j| (values[i] - values[j]).norm() <= eps)
            .collect();

        // A = M · P_i · M⁻¹ restricted to the cluster columns
        let mut a = Array2::<Complex64>::zeros((dim, dim));
        for &j in &cluster {
            for r in 0..dim {
                let m_rj = m[[r, j]];
                for col in 0..dim {
                    a[[r, col]] += m_rj * m_inv[[j, col]];
                }
            }
        }

        let weight = c(1.0 / cluster.len() as f64);
        superop = superop + kron(&a, &a.t().to_owned()) * weight;
    }
    Ok(superop)
}
