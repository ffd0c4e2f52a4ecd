// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Integer local search over germ subsets with slack relaxation.

use rayon::prelude::*;
use tracing::info;

use super::completeness::{check_germs_list_completeness, num_non_spam_gauge_params};
use super::deriv::calc_twirled_ddd;
use super::score::{GermScorer, ScoringOptions};
use super::types::{GermSelectionConfig, GermSelectionResult, SearchOutcome};
use super::weights::WeightVector;
use crate::diagnostics::Diagnostics;
use crate::error::{Result, ValidationError};
use crate::model::{GateSetModel, Germ};

/// Randomize a model list with seeded unitary perturbations.
///
/// With several models each is randomized once (model `i` with
/// `seed + i`); with a single model, `num_copies` (default 1) randomized
/// copies are made. Several models together with `num_copies` is an error.
pub fn randomize_model_list<M: GateSetModel>(
    models: &[M],
    strength: f64,
    num_copies: Option<usize>,
    seed: u64,
) -> Result<Vec<M>> {
    if models.len() > 1 && num_copies.is_some() {
        return Err(ValidationError::Precondition(
            "input multiple models or request multiple copies, not both".into(),
        )
        .into());
    }
    match models {
        [] => Err(ValidationError::Precondition("model list is empty".into()).into()),
        [single] => (0..num_copies.unwrap_or(1))
            .map(|i| single.randomize_with_unitary(strength, seed + i as u64))
            .collect(),
        many => many
            .iter()
            .enumerate()
            .map(|(i, m)| m.randomize_with_unitary(strength, seed + i as u64))
            .collect(),
    }
}

/// Germ-selection optimizer.
pub struct GermOptimizer {
    config: GermSelectionConfig,
}

impl GermOptimizer {
    /// Create a new optimizer with the given configuration.
    pub fn new(config: GermSelectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GermSelectionConfig {
        &self.config
    }

    /// Select a small germ subset that keeps every model amplificationally
    /// complete.
    ///
    /// # Arguments
    /// * `models` - Models to score against; the worst case over them is used
    /// * `germs` - Candidate germs; with force-singletons on, the first
    ///   `n_gates` must be the single-gate germs
    /// * `initial_weights` - Starting subset (defaults to all germs)
    /// * `diagnostics` - Receives progress, log messages and warnings
    ///
    /// # Returns
    /// A result with outcome `Incomplete` when the candidate list itself is
    /// incomplete for some model; otherwise the selected germs.
    pub fn optimize<M: GateSetModel>(
        &self,
        models: &[M],
        germs: &[Germ],
        initial_weights: Option<&[bool]>,
        diagnostics: &dyn Diagnostics,
    ) -> Result<GermSelectionResult> {
        let cfg = &self.config;

        if models.is_empty() {
            return Err(ValidationError::Precondition("model list is empty".into()).into());
        }
        if germs.is_empty() {
            return Err(ValidationError::Precondition("germ list is empty".into()).into());
        }
        if models.len() > 1 && cfg.num_copies.is_some() {
            return Err(ValidationError::Precondition(
                "input multiple models or request multiple copies, not both".into(),
            )
            .into());
        }

        let mut weights = match initial_weights {
            Some(w) if w.len() != germs.len() => {
                return Err(ValidationError::LengthMismatch {
                    what: "initial weights".into(),
                    expected: germs.len(),
                    actual: w.len(),
                }
                .into())
            }
            Some(w) => WeightVector::from_bools(w),
            None => WeightVector::ones(germs.len()),
        };

        let models = if cfg.randomize {
            randomize_model_list(models, cfg.randomization_strength, cfg.num_copies, cfg.seed)?
        } else {
            models.to_vec()
        };

        if let Some(index) = check_germs_list_completeness(
            &models,
            germs,
            cfg.score_function,
            cfg.threshold,
            diagnostics,
        )? {
            diagnostics.log(1, &format!("Complete initial germ set FAILS on model {}.", index));
            diagnostics.log(1, "Aborting search.");
            return Ok(GermSelectionResult::incomplete(index));
        }
        diagnostics.log(1, "Complete initial germ set succeeds on all input models.");
        diagnostics.log(1, "Now searching for best germ set.");

        let num_gates = models[0].num_gates();
        if cfg.force_singletons {
            let singletons_first = germs.len() >= num_gates
                && germs
                    .iter()
                    .zip(models[0].gate_labels())
                    .all(|(g, label)| g.len() == 1 && &g.labels()[0] == label);
            if !singletons_first {
                diagnostics.warn(
                    "force_singletons is set but the germ list does not start with the single-gate germs",
                );
            }
        }

        let n_gauge = num_non_spam_gauge_params(&models[0])?;
        let germ_lengths: Vec<usize> = germs.iter().map(Germ::len).collect();

        let ddd_per_model = models
            .par_iter()
            .map(|m| {
                calc_twirled_ddd(
                    m,
                    germs,
                    cfg.tol,
                    cfg.check,
                    Some(germ_lengths.as_slice()),
                    diagnostics,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        let mut scorer = GermScorer::new(
            ddd_per_model,
            germ_lengths,
            ScoringOptions {
                score_function: cfg.score_function,
                l1_penalty: cfg.l1_penalty,
                gate_penalty: cfg.gate_penalty,
                forced_singletons: cfg.force_singletons.then_some(num_gates),
                force_singletons_score: cfg.force_singletons_score,
                n_gauge,
            },
        );

        let mut score = scorer.worst_case(&weights)?;
        let mut l1 = weights.count_ones();
        let mut less_weight_only = false;

        diagnostics.log(1, "Starting germ set optimization. Lower score is better.");
        diagnostics.log(1, &format!("Model has {} gauge params.", n_gauge));
        info!(
            num_models = models.len(),
            num_germs = germs.len(),
            n_gauge,
            initial_score = score,
            "Starting germ selection"
        );

        let mut outcome = SearchOutcome::MaxIterations;
        let mut iterations = 0;
        for iter in 0..cfg.max_iter {
            if diagnostics.interrupted() {
                diagnostics.log(1, "Search interrupted.");
                outcome = SearchOutcome::Interrupted;
                break;
            }
            iterations = iter + 1;
            diagnostics.progress(
                iter + 1,
                cfg.max_iter,
                &format!("score={:e}, nGerms={}", score, l1),
            );

            let base = weights.clone();
            let mut found_better = false;
            for neighbor in base.neighbors() {
                let neighbor_score = scorer.worst_case(&neighbor)?;
                let neighbor_l1 = neighbor.count_ones();
                if neighbor_score <= score && (neighbor_l1 < l1 || !less_weight_only) {
                    weights = neighbor;
                    score = neighbor_score;
                    l1 = neighbor_l1;
                    found_better = true;
                    diagnostics.log(
                        2,
                        &format!("Found better neighbor: nGerms = {} score = {:e}", l1, score),
                    );
                }
            }

            if !found_better {
                less_weight_only = true;
                let slack = cfg.slack.amount(score);
                if slack <= 0.0 || slack.is_nan() {
                    return Err(ValidationError::Precondition(format!(
                        "slack must be positive, got {:e} at score {:e}",
                        slack, score
                    ))
                    .into());
                }
                diagnostics.log(
                    2,
                    &format!(
                        "No better neighbor. Relaxing score w/slack: {:e} => {:e}",
                        score,
                        score + slack
                    ),
                );
                score += slack;

                let base = weights.clone();
                for neighbor in base.neighbors() {
                    let neighbor_l1 = neighbor.count_ones();
                    let neighbor_score = match scorer.cached_worst_case(&neighbor) {
                        Some(s) => s,
                        None => scorer.worst_case(&neighbor)?,
                    };
                    if neighbor_l1 < l1 && neighbor_score < score {
                        weights = neighbor;
                        score = neighbor_score;
                        l1 = neighbor_l1;
                        found_better = true;
                        diagnostics.log(
                            2,
                            &format!("Found better neighbor: nGerms = {} score = {:e}", l1, score),
                        );
                    }
                }

                if !found_better {
                    diagnostics.log(1, "Stationary point found!");
                    outcome = SearchOutcome::Stationary;
                    break;
                }
            }
            diagnostics.log(1, "Moving to better neighbor");
        }
        if outcome == SearchOutcome::MaxIterations {
            diagnostics.log(1, "Hit max. iterations");
        }

        let final_score = scorer.worst_case(&weights)?;
        diagnostics.log(1, &format!("score = {:e}", final_score));
        diagnostics.log(1, &format!("weights = {}", weights));
        diagnostics.log(1, &format!("L1(weights) = {}", l1));

        let selected: Vec<Germ> = weights
            .selected_indices()
            .into_iter()
            .map(|i| germs[i].clone())
            .collect();
        info!(
            num_selected = selected.len(),
            score = final_score,
            iterations,
            evaluations = scorer.evaluations(),
            outcome = ?outcome,
            "Germ selection finished"
        );

        Ok(GermSelectionResult {
            selected: Some(selected),
            weights: Some(weights),
            score: Some(final_score),
            iterations,
            outcome,
            score_cache: cfg.return_all.then(|| scorer.into_cache()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingDiagnostics;
    use crate::error::Error;
    use crate::germsel::completeness::test_germ_list_infinite_l;
    use crate::germsel::types::{ScoreFunction, Slack};
    use crate::model::{ExplicitModel, ModelPack};

    fn xyi() -> ExplicitModel {
        ModelPack::Std1qXYI.model().unwrap()
    }

    #[test]
    fn test_randomize_model_list_copies() {
        let model = xyi();
        let copies = randomize_model_list(&[model.clone()], 1e-3, Some(3), 10).unwrap();
        assert_eq!(copies.len(), 3);
        let again = model.randomize_with_unitary(1e-3, 11).unwrap();
        assert_eq!(copies[1].gate("Gx"), again.gate("Gx"));

        let single = randomize_model_list(&[model.clone()], 1e-3, None, 0).unwrap();
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn test_randomize_model_list_rejects_copies_of_many() {
        let model = xyi();
        let result = randomize_model_list(&[model.clone(), model], 1e-3, Some(2), 0);
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::Precondition(_)))
        ));
    }

    #[test]
    fn test_initial_weights_length_mismatch() {
        let optimizer = GermOptimizer::new(GermSelectionConfig::default()).unwrap();
        let germs = ModelPack::Std1qXYI.germs();
        let result = optimizer.optimize(
            &[xyi()],
            &germs,
            Some(&[true, false]),
            &RecordingDiagnostics::new(),
        );
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::LengthMismatch { .. }))
        ));
    }

    #[test]
    fn test_multiple_models_with_copies_rejected() {
        let config = GermSelectionConfig {
            num_copies: Some(2),
            ..Default::default()
        };
        let optimizer = GermOptimizer::new(config).unwrap();
        let result = optimizer.optimize(
            &[xyi(), xyi()],
            &ModelPack::Std1qXYI.germs(),
            None,
            &RecordingDiagnostics::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let optimizer = GermOptimizer::new(GermSelectionConfig::default()).unwrap();
        let diag = RecordingDiagnostics::new();
        assert!(optimizer
            .optimize::<ExplicitModel>(&[], &ModelPack::Std1qXYI.germs(), None, &diag)
            .is_err());
        assert!(optimizer.optimize(&[xyi()], &[], None, &diag).is_err());
    }

    #[test]
    fn test_incomplete_germ_list_reports_model() {
        let optimizer = GermOptimizer::new(GermSelectionConfig::default()).unwrap();
        let germs = ModelPack::Std1qXYI.germs()[..3].to_vec();
        let diag = RecordingDiagnostics::new();
        let result = optimizer.optimize(&[xyi()], &germs, None, &diag).unwrap();
        assert_eq!(result.outcome, SearchOutcome::Incomplete { model_index: 0 });
        assert!(result.selected.is_none());
        assert!(diag.logged("FAILS on model 0"));
    }

    fn xy_germs(extra: &[&[&str]]) -> Vec<Germ> {
        let mut germs = vec![
            Germ::single("Gx"),
            Germ::single("Gy"),
            Germ::new(["Gx", "Gy"]),
        ];
        germs.extend(extra.iter().map(|labels| Germ::new(labels.iter().copied())));
        germs
    }

    const GXGXGYGXGYGY: &[&str] = &["Gx", "Gx", "Gy", "Gx", "Gy", "Gy"];

    #[test]
    fn test_xyi_standard_germs_are_stationary() {
        let config = GermSelectionConfig {
            seed: 2024,
            return_all: true,
            ..Default::default()
        };
        let optimizer = GermOptimizer::new(config.clone()).unwrap();
        let germs = ModelPack::Std1qXYI.germs();
        let diag = RecordingDiagnostics::new();
        let result = optimizer.optimize(&[xyi()], &germs, None, &diag).unwrap();

        // Every single removal costs more than the 10% slack allows
        assert_eq!(result.outcome, SearchOutcome::Stationary);
        assert_eq!(result.iterations, 1);
        assert_eq!(result.selected.as_deref(), Some(germs.as_slice()));
        assert!(diag.logged("Stationary point found!"));
        assert!(result.score.unwrap() < config.force_singletons_score);
        assert!(result.score_cache.as_ref().is_some_and(|c| !c.is_empty()));

        let randomized = randomize_model_list(
            &[xyi()],
            config.randomization_strength,
            config.num_copies,
            config.seed,
        )
        .unwrap();
        let report = test_germ_list_infinite_l(
            &randomized[0],
            &germs,
            ScoreFunction::All,
            None,
            config.threshold,
            false,
            &diag,
        )
        .unwrap();
        assert!(report.complete);
    }

    #[test]
    fn test_selection_drops_duplicate_germ() {
        // Any three XY germs share the [0,0] direction of both gates, so only
        // the duplicate can go without losing completeness
        let config = GermSelectionConfig {
            l1_penalty: 1e6,
            ..Default::default()
        };
        let optimizer = GermOptimizer::new(config).unwrap();
        let model = ModelPack::Std1qXY.model().unwrap();
        let germs = xy_germs(&[GXGXGYGXGYGY, GXGXGYGXGYGY]);
        let diag = RecordingDiagnostics::new();
        let result = optimizer.optimize(&[model], &germs, None, &diag).unwrap();

        assert_eq!(result.outcome, SearchOutcome::Stationary);
        assert_eq!(result.iterations, 2);
        assert_eq!(result.selected, Some(xy_germs(&[GXGXGYGXGYGY])));
        assert!(diag.logged("Moving to better neighbor"));
    }

    #[test]
    fn test_xy_three_germs_incomplete() {
        let config = GermSelectionConfig {
            slack: Slack::Fraction(0.1),
            threshold: 1e6,
            ..Default::default()
        };
        let optimizer = GermOptimizer::new(config).unwrap();
        let model = ModelPack::Std1qXY.model().unwrap();
        let diag = RecordingDiagnostics::new();
        let result = optimizer
            .optimize(&[model], &xy_germs(&[]), None, &diag)
            .unwrap();
        assert_eq!(result.outcome, SearchOutcome::Incomplete { model_index: 0 });
        assert!(result.selected.is_none());
        assert!(diag.logged("Aborting search."));
    }

    #[test]
    fn test_xy_minimal_list_keeps_gx_and_gy() {
        let optimizer = GermOptimizer::new(GermSelectionConfig::default()).unwrap();
        let model = ModelPack::Std1qXY.model().unwrap();
        let germs = xy_germs(&[GXGXGYGXGYGY]);
        let result = optimizer
            .optimize(&[model], &germs, None, &RecordingDiagnostics::new())
            .unwrap();

        assert_eq!(result.outcome, SearchOutcome::Stationary);
        assert_eq!(result.iterations, 1);
        let selected = result.selected.unwrap();
        assert_eq!(selected, germs);
        assert!(selected.contains(&Germ::single("Gx")));
        assert!(selected.contains(&Germ::single("Gy")));
    }

    #[test]
    fn test_interrupt_before_first_iteration() {
        let optimizer = GermOptimizer::new(GermSelectionConfig::default()).unwrap();
        let diag = RecordingDiagnostics::stopping_after(0);
        let germs = ModelPack::Std1qXYI.germs();
        let result = optimizer.optimize(&[xyi()], &germs, None, &diag).unwrap();
        assert_eq!(result.outcome, SearchOutcome::Interrupted);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.selected.unwrap().len(), germs.len());
    }

    #[test]
    fn test_max_iterations_reported() {
        let config = GermSelectionConfig {
            max_iter: 1,
            ..Default::default()
        };
        let optimizer = GermOptimizer::new(config).unwrap();
        let diag = RecordingDiagnostics::new();
        let result = optimizer
            .optimize(&[xyi()], &ModelPack::Std1qXYI.germs(), None, &diag)
            .unwrap();
        assert_eq!(result.iterations, 1);
        if result.outcome == SearchOutcome::MaxIterations {
            assert!(diag.logged("Hit max. iterations"));
        }
    }
}
