// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Matrix exponential via scaling-and-squaring with Padé(13) approximation.
//!
//! Used to build gate unitaries `exp(-iθσ/2)` and the random unitaries that
//! perturb a model before germ selection.
//!
//! Ref: Higham (2005), "The Scaling and Squaring Method for the Matrix
//! Exponential Revisited", SIAM J. Matrix Anal. Appl. 26(4), 1179.

use ndarray::Array2;
use num_complex::Complex64;

use super::{c, identity, solve_linear};
use crate::error::{Result, ValidationError};

/// θ₁₃ from Higham Table 10.2.
const THETA_13: f64 = 5.37;

/// Padé(13,13) coefficients b₀..b₁₃, Higham (2005) eq. (10.33).
const PADE_COEFFS: [f64; 14] = [
    1.0,
    0.5,
    0.12,
    1.833_333_333_333_333_4e-2,
    1.992_753_623_188_405_8e-3,
    1.630_434_782_608_696e-4,
    1.035_196_687_370_600_3e-5,
    5.175_983_436_853_002e-7,
    2.043_151_356_652_500_8e-8,
    6.306_022_705_717_595e-10,
    1.483_770_048_404_14e-11,
    2.529_153_491_597_966e-13,
    2.810_170_546_219_962_4e-15,
    1.544_049_750_670_309e-17,
];

/// Compute `exp(A)` for a square complex matrix.
///
/// # Errors
/// `Validation` if `a` is not square; `Numerical` if the Padé denominator
/// is singular (only possible for non-finite input).
pub fn matrix_exp(a: &Array2<Complex64>) -> Result<Array2<Complex64>> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(ValidationError::Precondition(format!(
            "matrix_exp requires a square matrix, got {} × {}",
            n,
            a.ncols()
        ))
        .into());
    }

    match n {
        0 => return Ok(Array2::zeros((0, 0))),
        1 => return Ok(Array2::from_elem((1, 1), a[[0, 0]].exp())),
        _ => {}
    }

    let norm = one_norm(a);
    let squarings = if norm > THETA_13 {
        (norm / THETA_13).log2().ceil() as u32
    } else {
        0
    };

    let scaled = a * c(1.0 / 2f64.powi(squarings as i32));
    let mut result = pade13(&scaled)?;

    // exp(A) = exp(A / 2^s)^(2^s)
    for _ in 0..squarings {
        result = result.dot(&result);
    }
    Ok(result)
}

/// Padé(13,13) approximant `(V - U)⁻¹ (V + U)`.
fn pade13(a: &Array2<Complex64>) -> Result<Array2<Complex64>> {
    let b = |k: usize| c(PADE_COEFFS[k]);
    let eye = identity(a.nrows());

    let a2 = a.dot(a);
    let a4 = a2.dot(&a2);
    let a6 = a2.dot(&a4);

    let u_inner = &a6 * b(13) + &a4 * b(11) + &a2 * b(9);
    let u = a.dot(
        &(u_inner.dot(&a6) + &a6 * b(7) + &a4 * b(5) + &a2 * b(3) + &eye * b(1)),
    );

    let v_inner = &a6 * b(12) + &a4 * b(10) + &a2 * b(8);
    let v = v_inner.dot(&a6) + &a6 * b(6) + &a4 * b(4) + &a2 * b(2) + &eye * b(0);

    solve_linear(&(&v - &u), &(&v + &u))
}

/// Max column sum of absolute values.
fn one_norm(a: &Array2<Complex64>) -> f64 {
    a.columns()
        .into_iter()
        .map(|col| col.iter().map(|z| z.norm()).sum::<f64>())
        .fold(0.0, f64::max)
}
