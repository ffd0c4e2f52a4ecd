// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Germ-set scoring.
//!
//! A germ set is scored from the eigenvalues of its combined Jacobian
//! outer product `Σᵢ wᵢ·Jᵢᴴ·Jᵢ`. The smallest `n_gauge` eigenvalues belong
//! to gauge directions and are dropped; the rest are reduced by a
//! [`ScoreFunction`]. Lower is better.

use std::collections::HashMap;

use ndarray::{Array2, Array3, Axis};
use num_complex::Complex64;

use super::types::ScoreFunction;
use super::weights::WeightVector;
use crate::error::{Result, ValidationError};
use crate::linalg::{c, eigvalsh};

/// Reduce observable eigenvalues to a score.
///
/// An empty spectrum scores 0.
pub fn list_score(values: &[f64], score_function: ScoreFunction) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    match score_function {
        ScoreFunction::All => values.iter().map(|v| 1.0 / v.abs()).sum(),
        ScoreFunction::Worst => {
            let smallest = values.iter().map(|v| v.abs()).fold(f64::INFINITY, f64::min);
            1.0 / smallest
        }
    }
}

/// `Σᵢ wᵢ · ddd[i]`.
pub fn combined_ddd(ddd: &Array3<Complex64>, weights: &[f64]) -> Result<Array2<Complex64>> {
    let (n, p, _) = ddd.dim();
    if weights.len() != n {
        return Err(ValidationError::LengthMismatch {
            what: "germ weights".into(),
            expected: n,
            actual: weights.len(),
        }
        .into());
    }
    let mut combined = Array2::zeros((p, p));
    for (i, &w) in weights.iter().enumerate() {
        if w != 0.0 {
            combined.scaled_add(c(w), &ddd.index_axis(Axis(0), i));
        }
    }
    Ok(combined)
}

/// Sorted eigenvalues with the smallest `n_gauge` removed.
pub fn observable_eigenvalues(combined: &Array2<Complex64>, n_gauge: usize) -> Result<Vec<f64>> {
    let sorted = eigvalsh(combined)?;
    Ok(sorted.into_iter().skip(n_gauge).collect())
}

/// Sorted eigenvalues of the weighted *average* of `Jᵢᴴ·Jᵢ` over germs.
///
/// `deriv` has shape `(n, d², p)`; weights default to uniform.
pub fn sq_sing_vals_from_deriv(
    deriv: &Array3<Complex64>,
    weights: Option<&[f64]>,
) -> Result<Vec<f64>> {
    let n = deriv.len_of(Axis(0));
    let uniform;
    let weights = match weights {
        Some(w) => w,
        None => {
            uniform = vec![1.0; n];
            uniform.as_slice()
        }
    };
    let total: f64 = weights.iter().sum();
    if total == 0.0 {
        return Err(ValidationError::Precondition("weights sum to zero".into()).into());
    }

    let ddd = super::deriv::ddd_from_deriv(deriv, |_| 1.0);
    let combined = combined_ddd(&ddd, weights)?.mapv(|z| z / total);
    eigvalsh(&combined)
}

/// Memoized scores keyed by (model index, weight vector).
#[derive(Debug, Clone, Default)]
pub struct ScoreCache {
    scores: HashMap<usize, HashMap<WeightVector, f64>>,
}

impl ScoreCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, model_index: usize, weights: &WeightVector) -> Option<f64> {
        self.scores
            .get(&model_index)
            .and_then(|m| m.get(weights))
            .copied()
    }

    pub fn insert(&mut self, model_index: usize, weights: WeightVector, score: f64) {
        self.scores
            .entry(model_index)
            .or_default()
            .insert(weights, score);
    }

    /// Total number of cached entries across models.
    pub fn len(&self) -> usize {
        self.scores.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Scores recorded for one model.
    pub fn for_model(&self, model_index: usize) -> Option<&HashMap<WeightVector, f64>> {
        self.scores.get(&model_index)
    }
}

/// Fixed inputs of the per-weight-vector score.
#[derive(Debug, Clone)]
pub struct ScoringOptions {
    pub score_function: ScoreFunction,
    pub l1_penalty: f64,
    pub gate_penalty: f64,
    /// Leading germs that must stay selected, when forced.
    pub forced_singletons: Option<usize>,
    pub force_singletons_score: f64,
    pub n_gauge: usize,
}

/// Scores weight vectors against precomputed per-model `Jᴴ·J` tensors,
/// caching every result.
#[derive(Debug)]
pub struct GermScorer {
    ddd_per_model: Vec<Array3<Complex64>>,
    germ_lengths: Vec<usize>,
    options: ScoringOptions,
    cache: ScoreCache,
    evaluations: usize,
}

impl GermScorer {
    pub fn new(
        ddd_per_model: Vec<Array3<Complex64>>,
        germ_lengths: Vec<usize>,
        options: ScoringOptions,
    ) -> Self {
        Self {
            ddd_per_model,
            germ_lengths,
            options,
            cache: ScoreCache::new(),
            evaluations: 0,
        }
    }

    pub fn num_models(&self) -> usize {
        self.ddd_per_model.len()
    }

    /// Score of `weights` on one model, from the cache when available.
    pub fn score(&mut self, weights: &WeightVector, model_index: usize) -> Result<f64> {
        if let Some(hit) = self.cache.get(model_index, weights) {
            return Ok(hit);
        }
        let score = self.compute(weights, model_index)?;
        self.cache.insert(model_index, weights.clone(), score);
        Ok(score)
    }

    /// Worst (largest) score over all models.
    pub fn worst_case(&mut self, weights: &WeightVector) -> Result<f64> {
        let mut worst = f64::NEG_INFINITY;
        for model_index in 0..self.num_models() {
            worst = worst.max(self.score(weights, model_index)?);
        }
        Ok(worst)
    }

    /// Cached worst-case score, without computing anything.
    pub fn cached_worst_case(&self, weights: &WeightVector) -> Option<f64> {
        (0..self.num_models())
            .map(|m| self.cache.get(m, weights))
            .try_fold(f64::NEG_INFINITY, |acc, s| s.map(|s| acc.max(s)))
    }

    /// Number of eigenvalue computations performed so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn cache(&self) -> &ScoreCache {
        &self.cache
    }

    pub fn into_cache(self) -> ScoreCache {
        self.cache
    }

    fn compute(&mut self, weights: &WeightVector, model_index: usize) -> Result<f64> {
        let opts = &self.options;
        if let Some(k) = opts.forced_singletons {
            if !weights.leading_ones(k) {
                return Ok(opts.force_singletons_score);
            }
        }

        let ddd = self.ddd_per_model.get(model_index).ok_or_else(|| {
            ValidationError::Precondition(format!("no model with index {}", model_index))
        })?;
        let w = weights.to_f64();
        let combined = combined_ddd(ddd, &w)?;
        let observable = observable_eigenvalues(&combined, opts.n_gauge)?;
        self.evaluations += 1;

        let gate_count: usize = weights
            .selected_indices()
            .into_iter()
            .map(|i| self.germ_lengths[i])
            .sum();
        Ok(list_score(&observable, opts.score_function)
            + opts.l1_penalty * weights.count_ones() as f64
            + opts.gate_penalty * gate_count as f64)
    }
}
