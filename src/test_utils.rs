// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared test utilities.

use ndarray::Array2;
use num_complex::Complex64;

use crate::model::{ExplicitModel, GateSetModel, ModelPack};

/// Standard XYI model perturbed by a small seeded random unitary.
pub fn randomized_xyi(seed: u64) -> ExplicitModel {
    ModelPack::Std1qXYI
        .model()
        .and_then(|m| m.randomize_with_unitary(1e-3, seed))
        .expect("standard XYI model should randomize")
}

/// Assert element-wise closeness of two complex matrices.
pub fn assert_matrix_close(a: &Array2<Complex64>, b: &Array2<Complex64>, tol: f64) {
    assert_eq!(a.dim(), b.dim(), "shape mismatch");
    for ((idx, x), y) in a.indexed_iter().zip(b.iter()) {
        assert!(
            (x - y).norm() <= tol,
            "matrices differ at {:?}: {} vs {} (tol {:e})",
            idx,
            x,
            y,
            tol
        );
    }
}
