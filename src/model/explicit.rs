// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Fully parameterized gate set: every matrix element is a free parameter.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use rand::distributions::{Distribution, Uniform};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use super::evaltree::EvalTree;
use super::germ::Germ;
use super::ptm::{qubit_count, unitary_to_ptm};
use super::GateSetModel;
use crate::error::{Result, ValidationError};
use crate::linalg::{c, dagger, identity, matrix_exp, numerical_rank};

/// Relative eigenvalue cutoff when counting gauge directions.
const GAUGE_RANK_TOL: f64 = 1e-10;

/// Gate set with dense superoperators and SPAM vectors.
///
/// Parameter order: preps (`d` each), effects (`d` each), then gates
/// (`d²` each, row-major), all in insertion order.
#[derive(Debug, Clone)]
pub struct ExplicitModel {
    dim: usize,
    gate_labels: Vec<String>,
    gates: Vec<Array2<Complex64>>,
    preps: Vec<(String, Array1<Complex64>)>,
    effects: Vec<(String, Array1<Complex64>)>,
}

impl ExplicitModel {
    /// Empty model of superoperator dimension `dim`.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            gate_labels: Vec::new(),
            gates: Vec::new(),
            preps: Vec::new(),
            effects: Vec::new(),
        }
    }

    /// Add a gate superoperator.
    pub fn add_gate(&mut self, label: impl Into<String>, matrix: Array2<Complex64>) -> Result<()> {
        let label = label.into();
        if matrix.dim() != (self.dim, self.dim) {
            return Err(ValidationError::Field {
                field: format!("gate {}", label),
                message: format!(
                    "expected {0} × {0} superoperator, got {1} × {2}",
                    self.dim,
                    matrix.nrows(),
                    matrix.ncols()
                ),
            }
            .into());
        }
        if self.gate_labels.contains(&label) {
            return Err(ValidationError::Field {
                field: format!("gate {}", label),
                message: "duplicate gate label".into(),
            }
            .into());
        }
        self.gate_labels.push(label);
        self.gates.push(matrix);
        Ok(())
    }

    /// Add a state-preparation vector.
    pub fn add_prep(&mut self, label: impl Into<String>, vector: Array1<Complex64>) -> Result<()> {
        let label = label.into();
        self.check_vector(&label, &vector)?;
        self.preps.push((label, vector));
        Ok(())
    }

    /// Add a measurement effect vector.
    pub fn add_effect(&mut self, label: impl Into<String>, vector: Array1<Complex64>) -> Result<()> {
        let label = label.into();
        self.check_vector(&label, &vector)?;
        self.effects.push((label, vector));
        Ok(())
    }

    fn check_vector(&self, label: &str, vector: &Array1<Complex64>) -> Result<()> {
        if vector.len() != self.dim {
            return Err(ValidationError::LengthMismatch {
                what: format!("SPAM vector {}", label),
                expected: self.dim,
                actual: vector.len(),
            }
            .into());
        }
        Ok(())
    }

    pub fn gate(&self, label: &str) -> Option<&Array2<Complex64>> {
        self.gate_labels
            .iter()
            .position(|l| l == label)
            .map(|i| &self.gates[i])
    }

    pub fn num_spam_vectors(&self) -> usize {
        self.preps.len() + self.effects.len()
    }

    fn gate_index(&self, label: &str) -> Result<usize> {
        self.gate_labels
            .iter()
            .position(|l| l == label)
            .ok_or_else(|| ValidationError::UnknownGate(label.to_string()).into())
    }

    fn resolve(&self, germ: &Germ) -> Result<Vec<usize>> {
        germ.labels().iter().map(|l| self.gate_index(l)).collect()
    }

    /// Jacobian of the infinitesimal gauge action, shape
    /// `(num_params, d²)`: column `a·d + b` is generator `E_ab` acting as
    /// `ρ → Eρ`, `e → −Eᵀe`, `G → EG − GE`.
    fn gauge_jacobian(&self) -> Array2<Complex64> {
        let d = self.dim;
        let mut jac = Array2::zeros((self.num_params(), d * d));

        let mut row = 0;
        for (_, rho) in &self.preps {
            for a in 0..d {
                for b in 0..d {
                    jac[[row + a, a * d + b]] += rho[b];
                }
            }
            row += d;
        }
        for (_, effect) in &self.effects {
            for a in 0..d {
                for b in 0..d {
                    jac[[row + b, a * d + b]] -= effect[a];
                }
            }
            row += d;
        }
        for gate in &self.gates {
            for a in 0..d {
                for b in 0..d {
                    let col = a * d + b;
                    for k in 0..d {
                        jac[[row + a * d + k, col]] += gate[[b, k]];
                        jac[[row + k * d + b, col]] -= gate[[k, a]];
                    }
                }
            }
            row += d * d;
        }
        jac
    }
}

impl GateSetModel for ExplicitModel {
    fn dim(&self) -> usize {
        self.dim
    }

    fn gate_labels(&self) -> &[String] {
        &self.gate_labels
    }

    fn num_params(&self) -> usize {
        self.dim * self.num_spam_vectors() + self.gates.len() * self.dim * self.dim
    }

    fn num_gauge_params(&self) -> Result<usize> {
        let jac = self.gauge_jacobian();
        if jac.is_empty() {
            return Ok(0);
        }
        let gram = dagger(&jac).dot(&jac);
        let rank = numerical_rank(&gram, GAUGE_RANK_TOL)?;
        Ok(rank.min(self.num_params()))
    }

    fn product(&self, germ: &Germ) -> Result<Array2<Complex64>> {
        let mut prod = identity(self.dim);
        for idx in self.resolve(germ)? {
            prod = self.gates[idx].dot(&prod);
        }
        Ok(prod)
    }

    fn dproduct(&self, germ: &Germ) -> Result<Array2<Complex64>> {
        let d = self.dim;
        let dd = d * d;
        let indices = self.resolve(germ)?;
        let mut deriv = Array2::zeros((dd, self.num_gate_params()));

        // Right partial products R_i = G_{i-1} ⋯ G_1 and left L_i = G_n ⋯ G_{i+1}
        let mut right = Vec::with_capacity(indices.len());
        let mut acc = identity(d);
        for &idx in &indices {
            right.push(acc.clone());
            acc = self.gates[idx].dot(&acc);
        }
        let mut left = vec![identity(d); indices.len()];
        let mut acc = identity(d);
        for (pos, &idx) in indices.iter().enumerate().rev() {
            left[pos] = acc.clone();
            acc = acc.dot(&self.gates[idx]);
        }

        for (pos, &idx) in indices.iter().enumerate() {
            let (l, r) = (&left[pos], &right[pos]);
            let offset = idx * dd;
            for row in 0..d {
                for col in 0..d {
                    for a in 0..d {
                        let l_ra = l[[row, a]];
                        if l_ra == c(0.0) {
                            continue;
                        }
                        for b in 0..d {
                            deriv[[row * d + col, offset + a * d + b]] += l_ra * r[[b, col]];
                        }
                    }
                }
            }
        }
        Ok(deriv)
    }

    fn bulk_evaltree(&self, germs: &[Germ]) -> Result<EvalTree> {
        EvalTree::build(germs, |label| self.gate_index(label))
    }

    fn bulk_product_and_dproduct(
        &self,
        tree: &EvalTree,
    ) -> Result<(Vec<Array2<Complex64>>, Vec<Array2<Complex64>>)> {
        Ok(tree.evaluate(&self.gates))
    }

    fn without_spam(&self) -> Self {
        Self {
            dim: self.dim,
            gate_labels: self.gate_labels.clone(),
            gates: self.gates.clone(),
            preps: Vec::new(),
            effects: Vec::new(),
        }
    }

    fn randomize_with_unitary(&self, strength: f64, seed: u64) -> Result<Self> {
        let hilbert_dim = (self.dim as f64).sqrt().round() as usize;
        if hilbert_dim * hilbert_dim != self.dim {
            return Err(ValidationError::Precondition(format!(
                "superoperator dimension {} is not a square",
                self.dim
            ))
            .into());
        }
        qubit_count(hilbert_dim)?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let unit = Uniform::new(-1.0_f64, 1.0);
        let minus_i = Complex64::new(0.0, -1.0);

        let mut randomized = self.clone();
        for gate in randomized.gates.iter_mut() {
            let x = Array2::from_shape_simple_fn((hilbert_dim, hilbert_dim), || {
                Complex64::new(unit.sample(&mut rng), unit.sample(&mut rng)) * strength
            });
            let hermitian = &x + &dagger(&x);
            let u = matrix_exp(&(hermitian * minus_i))?;
            *gate = unitary_to_ptm(&u)?.dot(&*gate);
        }
        debug!(
            seed,
            strength,
            num_gates = randomized.gates.len(),
            "Randomized gate set with unitary perturbations"
        );
        Ok(randomized)
    }
}
