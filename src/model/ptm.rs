// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Pauli-transfer-matrix representation of unitary gates and states.
//!
//! Superoperators act on vectors of coefficients in the normalized Pauli
//! basis `Bᵢ = Pᵢ/√dh`, with multi-qubit Paulis ordered as Kronecker
//! products of `I, X, Y, Z`. For a unitary `U` the transfer matrix is
//! `R_ij = Tr(Bᵢ · U · Bⱼ · U†)`, which is real and orthogonal.

use std::f64::consts::FRAC_1_SQRT_2;

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::error::{Result, ValidationError};
use crate::linalg::{c, dagger, identity, kron, matrix_exp};

/// Single-qubit Pauli axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauliAxis {
    X,
    Y,
    Z,
}

impl PauliAxis {
    /// The (unnormalized) Pauli matrix for this axis.
    pub fn matrix(self) -> Array2<Complex64> {
        let mut m = Array2::zeros((2, 2));
        match self {
            PauliAxis::X => {
                m[[0, 1]] = c(1.0);
                m[[1, 0]] = c(1.0);
            }
            PauliAxis::Y => {
                m[[0, 1]] = Complex64::new(0.0, -1.0);
                m[[1, 0]] = Complex64::new(0.0, 1.0);
            }
            PauliAxis::Z => {
                m[[0, 0]] = c(1.0);
                m[[1, 1]] = c(-1.0);
            }
        }
        m
    }
}

/// Number of qubits for a Hilbert-space dimension, if it is a power of two.
pub fn qubit_count(hilbert_dim: usize) -> Result<usize> {
    if hilbert_dim == 0 || !hilbert_dim.is_power_of_two() {
        return Err(ValidationError::Precondition(format!(
            "Pauli basis requires a power-of-two Hilbert dimension, got {}",
            hilbert_dim
        ))
        .into());
    }
    Ok(hilbert_dim.trailing_zeros() as usize)
}

/// Normalized Pauli basis for `hilbert_dim` (a power of two).
pub fn pauli_basis(hilbert_dim: usize) -> Result<Vec<Array2<Complex64>>> {
    let n_qubits = qubit_count(hilbert_dim)?;
    let single = [
        identity(2),
        PauliAxis::X.matrix(),
        PauliAxis::Y.matrix(),
        PauliAxis::Z.matrix(),
    ];

    let mut basis = vec![identity(1)];
    for _ in 0..n_qubits {
        basis = basis
            .iter()
            .flat_map(|b| single.iter().map(move |p| kron(b, p)))
            .collect();
    }

    let norm = c(1.0 / (hilbert_dim as f64).sqrt());
    Ok(basis.into_iter().map(|b| b * norm).collect())
}

/// Transfer matrix of the channel `ρ → U ρ U†`.
pub fn unitary_to_ptm(u: &Array2<Complex64>) -> Result<Array2<Complex64>> {
    if u.nrows() != u.ncols() {
        return Err(ValidationError::Precondition(format!(
            "unitary must be square, got {} × {}",
            u.nrows(),
            u.ncols()
        ))
        .into());
    }
    let basis = pauli_basis(u.nrows())?;
    let u_dag = dagger(u);
    let conjugated: Vec<Array2<Complex64>> =
        basis.iter().map(|b| u.dot(b).dot(&u_dag)).collect();

    let d = basis.len();
    let mut ptm = Array2::zeros((d, d));
    for (i, bi) in basis.iter().enumerate() {
        for (j, cj) in conjugated.iter().enumerate() {
            // Tr(Bᵢ · U Bⱼ U†); basis elements are Hermitian
            let tr: Complex64 = bi.iter().zip(cj.t().iter()).map(|(x, y)| x * y).sum();
            ptm[[i, j]] = c(tr.re);
        }
    }
    Ok(ptm)
}

/// Rotation `exp(-iθσ/2)` about a Pauli axis.
pub fn rotation(axis: PauliAxis, theta: f64) -> Result<Array2<Complex64>> {
    let generator = axis.matrix() * Complex64::new(0.0, -theta / 2.0);
    matrix_exp(&generator)
}

/// Transfer matrix of a single-qubit rotation.
pub fn rotation_ptm(axis: PauliAxis, theta: f64) -> Result<Array2<Complex64>> {
    unitary_to_ptm(&rotation(axis, theta)?)
}

/// Pauli-basis coefficients `rᵢ = Tr(Bᵢ ρ)` of a density matrix.
pub fn density_to_vector(rho: &Array2<Complex64>) -> Result<Array1<Complex64>> {
    let basis = pauli_basis(rho.nrows())?;
    Ok(basis
        .iter()
        .map(|b| {
            let tr: Complex64 = b.iter().zip(rho.t().iter()).map(|(x, y)| x * y).sum();
            c(tr.re)
        })
        .collect())
}

/// Single-qubit `|0⟩⟨0|` in the Pauli basis: `(1, 0, 0, 1)/√2`.
pub fn zero_state_vector() -> Array1<Complex64> {
    Array1::from(vec![c(FRAC_1_SQRT_2), c(0.0), c(0.0), c(FRAC_1_SQRT_2)])
}
