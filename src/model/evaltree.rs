// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Prefix-sharing evaluation tree for batched germ products.
//!
//! Each node is a prefix `g1 … gk` of some germ, stored as (parent prefix,
//! last gate). Germs that share a prefix share the work of computing its
//! product and derivative.

use std::collections::HashMap;

use ndarray::Array2;
use num_complex::Complex64;

use super::germ::Germ;
use crate::error::{Result, ValidationError};
use crate::linalg::{c, identity, kron};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Node {
    parent: Option<usize>,
    gate: usize,
}

/// Evaluation plan for a list of germs over a fixed gate ordering.
#[derive(Debug, Clone)]
pub struct EvalTree {
    nodes: Vec<Node>,
    outputs: Vec<usize>,
}

impl EvalTree {
    /// Build the tree, resolving labels to gate indices with `gate_index`.
    ///
    /// # Errors
    /// Empty germs are rejected; label resolution errors are propagated.
    pub fn build<F>(germs: &[Germ], gate_index: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<usize>,
    {
        let mut nodes = Vec::new();
        let mut index: HashMap<Node, usize> = HashMap::new();
        let mut outputs = Vec::with_capacity(germs.len());

        for germ in germs {
            if germ.is_empty() {
                return Err(ValidationError::Precondition(
                    "cannot evaluate an empty germ".into(),
                )
                .into());
            }
            let mut parent = None;
            for label in germ.labels() {
                let node = Node {
                    parent,
                    gate: gate_index(label)?,
                };
                let id = *index.entry(node).or_insert_with(|| {
                    nodes.push(node);
                    nodes.len() - 1
                });
                parent = Some(id);
            }
            if let Some(id) = parent {
                outputs.push(id);
            }
        }

        Ok(Self { nodes, outputs })
    }

    /// Number of germs the tree evaluates.
    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Number of distinct prefixes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Products and flattened derivatives of every germ, in input order.
    ///
    /// Derivatives are taken w.r.t. every element of every gate: the result
    /// for a germ has shape `(d², n_gates·d²)` with column `g·d² + a·d + b`
    /// holding `∂ vec(product) / ∂ G_g[a, b]`.
    pub fn evaluate(
        &self,
        gates: &[Array2<Complex64>],
    ) -> (Vec<Array2<Complex64>>, Vec<Array2<Complex64>>) {
        let d = gates.first().map_or(0, |g| g.nrows());
        let dd = d * d;
        let n_params = gates.len() * dd;
        let eye = identity(d);

        let mut products: Vec<Array2<Complex64>> = Vec::with_capacity(self.nodes.len());
        let mut derivs: Vec<Array2<Complex64>> = Vec::with_capacity(self.nodes.len());

        for node in &self.nodes {
            let gate = &gates[node.gate];
            let (product, mut deriv) = match node.parent {
                Some(p) => (
                    gate.dot(&products[p]),
                    kron(gate, &eye).dot(&derivs[p]),
                ),
                None => (gate.clone(), Array2::zeros((dd, n_params))),
            };

            // Contribution of this node's own gate: E_ab · P_parent
            let offset = node.gate * dd;
            for a in 0..d {
                for b in 0..d {
                    let col = offset + a * d + b;
                    match node.parent {
                        Some(p) => {
                            let prev = &products[p];
                            for cc in 0..d {
                                deriv[[a * d + cc, col]] += prev[[b, cc]];
                            }
                        }
                        None => deriv[[a * d + b, col]] += c(1.0),
                    }
                }
            }

            products.push(product);
            derivs.push(deriv);
        }

        let prods = self.outputs.iter().map(|&i| products[i].clone()).collect();
        let dprods = self.outputs.iter().map(|&i| derivs[i].clone()).collect();
        (prods, dprods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(label: &str) -> Result<usize> {
        match label {
            "Ga" => Ok(0),
            "Gb" => Ok(1),
            other => Err(ValidationError::UnknownGate(other.into()).into()),
        }
    }

    #[test]
    fn test_shared_prefixes_are_deduplicated() {
        let germs = vec![
            Germ::new(["Ga"]),
            Germ::new(["Ga", "Gb"]),
            Germ::new(["Ga", "Gb", "Ga"]),
            Germ::new(["Gb"]),
        ];
        let tree = EvalTree::build(&germs, lookup).unwrap();
        assert_eq!(tree.num_outputs(), 4);
        assert_eq!(tree.num_nodes(), 4);
    }

    #[test]
    fn test_duplicate_germs_share_output() {
        let germs = vec![Germ::new(["Ga", "Gb"]), Germ::new(["Ga", "Gb"])];
        let tree = EvalTree::build(&germs, lookup).unwrap();
        assert_eq!(tree.num_outputs(), 2);
        assert_eq!(tree.num_nodes(), 2);
    }

    #[test]
    fn test_empty_germ_rejected() {
        let germs = vec![Germ::new(Vec::<String>::new())];
        assert!(EvalTree::build(&germs, lookup).is_err());
    }

    #[test]
    fn test_unknown_label_propagates() {
        let germs = vec![Germ::new(["Ga", "Gz"])];
        assert!(EvalTree::build(&germs, lookup).is_err());
    }

    #[test]
    fn test_products_apply_first_gate_first() {
        let a = Array2::from_shape_fn((2, 2), |(i, j)| c((i * 2 + j) as f64));
        let b = Array2::from_shape_fn((2, 2), |(i, j)| c(if i == j { 2.0 } else { 1.0 }));
        let germs = vec![Germ::new(["Ga", "Gb"])];
        let tree = EvalTree::build(&germs, lookup).unwrap();
        let (prods, dprods) = tree.evaluate(&[a.clone(), b.clone()]);
        let expected = b.dot(&a);
        for ((i, j), val) in prods[0].indexed_iter() {
            assert!((val - expected[[i, j]]).norm() < 1e-14);
        }
        assert_eq!(dprods[0].dim(), (4, 8));
    }

    #[test]
    fn test_derivative_is_linear_in_single_occurrence() {
        // product = B·A is linear in A, so Σ A[a,b]·∂/∂A[a,b] = product
        let a = Array2::from_shape_fn((2, 2), |(i, j)| Complex64::new(i as f64 + 0.5, j as f64));
        let b = Array2::from_shape_fn((2, 2), |(i, j)| c((3 * i + j) as f64 - 1.0));
        let tree = EvalTree::build(&[Germ::new(["Ga", "Gb"])], lookup).unwrap();
        let (prods, dprods) = tree.evaluate(&[a.clone(), b]);
        for row in 0..4 {
            let mut acc = c(0.0);
            for ai in 0..2 {
                for bi in 0..2 {
                    acc += dprods[0][[row, ai * 2 + bi]] * a[[ai, bi]];
                }
            }
            assert!((acc - prods[0][[row / 2, row % 2]]).norm() < 1e-12);
        }
    }
}
