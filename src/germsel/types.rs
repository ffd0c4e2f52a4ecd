// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Germ-selection configuration and result types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::score::ScoreCache;
use super::weights::WeightVector;
use crate::error::{Error, Result, ValidationError};
use crate::model::Germ;

/// How a spectrum of observable eigenvalues is reduced to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreFunction {
    /// `Σ 1/|λ|`
    #[default]
    All,
    /// `1 / min |λ|`
    Worst,
}

impl ScoreFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreFunction::All => "all",
            ScoreFunction::Worst => "worst",
        }
    }
}

impl fmt::Display for ScoreFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScoreFunction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(ScoreFunction::All),
            "worst" => Ok(ScoreFunction::Worst),
            other => Err(ValidationError::InvalidArgument(format!(
                "'{}' is not a valid score function; either 'all' or 'worst' must be specified",
                other
            ))
            .into()),
        }
    }
}

/// Amount the current score is loosened by when no neighbor improves it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slack {
    /// Absolute amount added to the score.
    Fixed(f64),
    /// Fraction of the current score.
    Fraction(f64),
}

impl Slack {
    /// Exactly one of `fixed` and `fraction` must be given.
    pub fn from_options(fixed: Option<f64>, fraction: Option<f64>) -> Result<Self> {
        match (fixed, fraction) {
            (Some(f), None) => Ok(Slack::Fixed(f)),
            (None, Some(f)) => Ok(Slack::Fraction(f)),
            _ => Err(ValidationError::Precondition(
                "either a fixed slack or a slack fraction must be specified, not both".into(),
            )
            .into()),
        }
    }

    /// Slack to add at the given score.
    pub fn amount(&self, score: f64) -> f64 {
        match *self {
            Slack::Fixed(s) => s,
            Slack::Fraction(frac) => score * frac,
        }
    }
}

impl Default for Slack {
    fn default() -> Self {
        Slack::Fraction(0.1)
    }
}

/// Options for [`GermOptimizer`](super::GermOptimizer).
#[derive(Debug, Clone)]
pub struct GermSelectionConfig {
    /// Perturb each model with a random unitary before scoring.
    pub randomize: bool,
    /// Magnitude of the random unitary perturbation.
    pub randomization_strength: f64,
    /// Number of randomized copies of a single input model.
    pub num_copies: Option<usize>,
    /// Base seed; copy `i` is randomized with `seed + i`.
    pub seed: u64,
    /// Penalty per selected germ.
    pub l1_penalty: f64,
    /// Penalty per gate of each selected germ.
    pub gate_penalty: f64,
    pub score_function: ScoreFunction,
    /// Maximum number of search iterations.
    pub max_iter: usize,
    pub slack: Slack,
    /// Eigenvalue degeneracy tolerance for twirling during the search.
    pub tol: f64,
    /// Cross-check batched derivatives against single-germ ones.
    pub check: bool,
    /// Score any weight vector dropping a single-gate germ as
    /// `force_singletons_score`.
    pub force_singletons: bool,
    pub force_singletons_score: f64,
    /// Completeness threshold on the initial germ list.
    pub threshold: f64,
    /// Return the score cache with the result.
    pub return_all: bool,
}

impl Default for GermSelectionConfig {
    fn default() -> Self {
        Self {
            randomize: true,
            randomization_strength: 1e-3,
            num_copies: None,
            seed: 0,
            l1_penalty: 1e-2,
            gate_penalty: 0.0,
            score_function: ScoreFunction::All,
            max_iter: 100,
            slack: Slack::default(),
            tol: 1e-6,
            check: false,
            force_singletons: true,
            force_singletons_score: 1e100,
            threshold: 1e6,
            return_all: false,
        }
    }
}

impl GermSelectionConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<()> {
        let field = |name: &str, message: &str| -> Result<()> {
            Err(ValidationError::Field {
                field: name.into(),
                message: message.into(),
            }
            .into())
        };

        if self.randomization_strength < 0.0 || !self.randomization_strength.is_finite() {
            return field("randomization_strength", "must be finite and >= 0");
        }
        if self.num_copies == Some(0) {
            return field("num_copies", "must be > 0 when given");
        }
        if self.l1_penalty.is_nan() || self.l1_penalty < 0.0 {
            return field("l1_penalty", "must be >= 0");
        }
        if self.gate_penalty.is_nan() || self.gate_penalty < 0.0 {
            return field("gate_penalty", "must be >= 0");
        }
        if self.max_iter == 0 {
            return field("max_iter", "must be > 0");
        }
        match self.slack {
            Slack::Fixed(s) if s.is_nan() || s <= 0.0 => {
                return field("slack", "fixed slack must be > 0")
            }
            Slack::Fraction(f) if f.is_nan() || f <= 0.0 => {
                return field("slack", "slack fraction must be > 0")
            }
            _ => {}
        }
        if !self.tol.is_finite() || self.tol <= 0.0 {
            return field("tol", "must be finite and > 0");
        }
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return field("threshold", "must be finite and > 0");
        }
        if !self.force_singletons_score.is_finite() || self.force_singletons_score <= 0.0 {
            return field("force_singletons_score", "must be finite and > 0");
        }
        Ok(())
    }
}

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// No neighbor improved the score even with slack.
    Stationary,
    /// `max_iter` iterations ran without reaching a stationary point.
    MaxIterations,
    /// The caller requested a stop between iterations.
    Interrupted,
    /// The initial germ list is not amplificationally complete for a model.
    Incomplete { model_index: usize },
}

/// Result of a germ-selection run.
#[derive(Debug, Clone)]
pub struct GermSelectionResult {
    /// Selected germs; `None` when the initial list was incomplete.
    pub selected: Option<Vec<Germ>>,
    /// Final weight vector over the candidate germs.
    pub weights: Option<WeightVector>,
    /// Worst-case score of the final weights.
    pub score: Option<f64>,
    /// Number of search iterations executed.
    pub iterations: usize,
    pub outcome: SearchOutcome,
    /// Every score computed during the run, when requested.
    pub score_cache: Option<ScoreCache>,
}

impl GermSelectionResult {
    pub(crate) fn incomplete(model_index: usize) -> Self {
        Self {
            selected: None,
            weights: None,
            score: None,
            iterations: 0,
            outcome: SearchOutcome::Incomplete { model_index },
            score_cache: None,
        }
    }

    /// Whether a germ list was produced.
    pub fn is_solution(&self) -> bool {
        self.selected.is_some()
    }

    /// Serializable view of the result.
    pub fn summary(&self) -> GermSelectionSummary {
        GermSelectionSummary {
            selected: self
                .selected
                .as_ref()
                .map(|germs| germs.iter().map(|g| g.to_string()).collect()),
            num_selected: self.selected.as_ref().map(Vec::len),
            weights: self.weights.as_ref().map(WeightVector::to_bools),
            score: self.score,
            iterations: self.iterations,
            outcome: self.outcome,
            cached_scores: self.score_cache.as_ref().map(ScoreCache::len),
        }
    }
}

/// Serializable germ-selection summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GermSelectionSummary {
    pub selected: Option<Vec<String>>,
    pub num_selected: Option<usize>,
    pub weights: Option<Vec<bool>>,
    pub score: Option<f64>,
    pub iterations: usize,
    pub outcome: SearchOutcome,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cached_scores: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GermSelectionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.score_function, ScoreFunction::All);
        assert_eq!(config.max_iter, 100);
        assert!(config.force_singletons);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cases: Vec<GermSelectionConfig> = vec![
            GermSelectionConfig {
                max_iter: 0,
                ..Default::default()
            },
            GermSelectionConfig {
                slack: Slack::Fraction(0.0),
                ..Default::default()
            },
            GermSelectionConfig {
                slack: Slack::Fixed(-1.0),
                ..Default::default()
            },
            GermSelectionConfig {
                tol: 0.0,
                ..Default::default()
            },
            GermSelectionConfig {
                l1_penalty: -0.1,
                ..Default::default()
            },
            GermSelectionConfig {
                num_copies: Some(0),
                ..Default::default()
            },
            GermSelectionConfig {
                tol: f64::NAN,
                ..Default::default()
            },
            GermSelectionConfig {
                threshold: f64::NAN,
                ..Default::default()
            },
            GermSelectionConfig {
                force_singletons_score: f64::NAN,
                ..Default::default()
            },
            GermSelectionConfig {
                slack: Slack::Fraction(f64::NAN),
                ..Default::default()
            },
            GermSelectionConfig {
                threshold: f64::INFINITY,
                ..Default::default()
            },
        ];
        for config in cases {
            assert!(config.validate().is_err(), "{:?} should be rejected", config);
        }
    }

    #[test]
    fn test_score_function_parse() {
        assert_eq!("all".parse::<ScoreFunction>().unwrap(), ScoreFunction::All);
        assert_eq!("worst".parse::<ScoreFunction>().unwrap(), ScoreFunction::Worst);
        let err = "best".parse::<ScoreFunction>().unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_slack_from_options() {
        assert_eq!(Slack::from_options(Some(0.5), None).unwrap(), Slack::Fixed(0.5));
        assert_eq!(Slack::from_options(None, Some(0.2)).unwrap(), Slack::Fraction(0.2));
        assert!(Slack::from_options(Some(0.5), Some(0.2)).is_err());
        assert!(Slack::from_options(None, None).is_err());
    }

    #[test]
    fn test_slack_amount() {
        assert_eq!(Slack::Fixed(2.0).amount(100.0), 2.0);
        assert!((Slack::Fraction(0.1).amount(50.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_string(&SearchOutcome::Incomplete { model_index: 2 }).unwrap();
        assert_eq!(json, r#"{"kind":"incomplete","model_index":2}"#);
        let json = serde_json::to_string(&SearchOutcome::Stationary).unwrap();
        assert_eq!(json, r#"{"kind":"stationary"}"#);
    }

    #[test]
    fn test_incomplete_summary() {
        let result = GermSelectionResult::incomplete(1);
        assert!(!result.is_solution());
        let summary = result.summary();
        assert_eq!(summary.selected, None);
        assert_eq!(summary.outcome, SearchOutcome::Incomplete { model_index: 1 });
    }
}
