// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Gate-set models consumed by germ selection.
//!
//! Germ selection only needs a narrow view of a model: its superoperator
//! dimension, its gate labels, germ products and their derivatives w.r.t.
//! the gate parameters, and the number of gauge parameters. That view is
//! the [`GateSetModel`] trait. [`ExplicitModel`] is the fully parameterized
//! implementation, and [`packs`] builds the standard single-qubit models.

pub mod evaltree;
pub mod explicit;
pub mod germ;
pub mod packs;
pub mod ptm;

pub use evaltree::EvalTree;
pub use explicit::ExplicitModel;
pub use germ::{parse_germs, Germ};
pub use packs::ModelPack;

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::Result;

/// A parametric gate set.
///
/// Models are immutable inputs; transformations return new values.
pub trait GateSetModel: Clone + Send + Sync {
    /// Superoperator dimension `d` (`dh²` for Hilbert dimension `dh`).
    fn dim(&self) -> usize;

    /// Gate labels in parameter order.
    fn gate_labels(&self) -> &[String];

    fn num_gates(&self) -> usize {
        self.gate_labels().len()
    }

    /// Total parameter count, SPAM included.
    fn num_params(&self) -> usize;

    /// Parameters the products depend on: `n_gates · d²`.
    fn num_gate_params(&self) -> usize {
        self.num_gates() * self.dim() * self.dim()
    }

    /// Number of gauge directions in parameter space.
    fn num_gauge_params(&self) -> Result<usize>;

    /// Product of a germ's gates, first gate applied first.
    fn product(&self, germ: &Germ) -> Result<Array2<Complex64>>;

    /// Derivative of [`GateSetModel::product`] w.r.t. the gate parameters,
    /// shape `(d², num_gate_params)`.
    fn dproduct(&self, germ: &Germ) -> Result<Array2<Complex64>>;

    /// Plan a batched evaluation of `germs`.
    fn bulk_evaltree(&self, germs: &[Germ]) -> Result<EvalTree>;

    /// Products and derivatives of every germ in `tree`, in germ order.
    fn bulk_product_and_dproduct(
        &self,
        tree: &EvalTree,
    ) -> Result<(Vec<Array2<Complex64>>, Vec<Array2<Complex64>>)>;

    /// Copy with preparation and measurement vectors removed.
    fn without_spam(&self) -> Self;

    /// Copy with every gate composed with a small random unitary.
    ///
    /// The same `seed` always gives the same model.
    fn randomize_with_unitary(&self, strength: f64, seed: u64) -> Result<Self>;
}
