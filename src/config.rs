// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration management for germ selection.
//!
//! Configuration is loaded from multiple sources with the following priority
//! (later sources override earlier ones):
//!
//! 1. Built-in defaults
//! 2. gst.yaml file
//! 3. Environment variables (QUBITOS_GST_*, QUBITOS_LOG_*)
//! 4. CLI arguments

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::{Error, Result};
use crate::germsel::{GermSelectionConfig, ScoreFunction, Slack};
use crate::model::{parse_germs, Germ, ModelPack};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Optimizer options
    #[serde(default)]
    pub germ_selection: GermSelectionSettings,

    /// Model and candidate germs to run on
    #[serde(default)]
    pub run: RunConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(path) = config_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                config = serde_yaml::from_str(&content)?;
            }
        } else {
            for path in &["gst.yaml", "gst.yml", "/etc/qubitos/gst.yaml"] {
                let path = Path::new(path);
                if path.exists() {
                    let content = std::fs::read_to_string(path)?;
                    config = serde_yaml::from_str(&content)?;
                    break;
                }
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        let gs = &mut self.germ_selection;
        if let Ok(val) = env::var("QUBITOS_GST_SEED") {
            if let Ok(seed) = val.parse() {
                gs.seed = seed;
            }
        }
        if let Ok(val) = env::var("QUBITOS_GST_MAX_ITER") {
            if let Ok(max_iter) = val.parse() {
                gs.max_iter = max_iter;
            }
        }
        if let Ok(val) = env::var("QUBITOS_GST_SCORE_FUNC") {
            gs.score_func = val;
        }
        if let Ok(val) = env::var("QUBITOS_GST_RANDOMIZE") {
            gs.randomize = val.to_lowercase() == "true" || val == "1";
        }
        if let Ok(val) = env::var("QUBITOS_GST_VERBOSITY") {
            if let Ok(verbosity) = val.parse() {
                gs.verbosity = verbosity;
            }
        }
        if let Ok(val) = env::var("QUBITOS_GST_MODEL_PACK") {
            self.run.model_pack = val;
        }
        if let Ok(val) = env::var("QUBITOS_GST_GERMS") {
            self.run.germs = Some(val.split(',').map(|s| s.trim().to_string()).collect());
        }
        if let Ok(val) = env::var("QUBITOS_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("QUBITOS_LOG_FORMAT") {
            self.logging.format = val;
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        self.germ_selection.to_germ_selection_config()?;
        let pack = self.run.model_pack()?;
        self.run.candidate_germs(pack)?;
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(Error::Config(format!(
                "log format must be 'json' or 'pretty', got '{}'",
                self.logging.format
            )));
        }
        Ok(())
    }
}

/// Germ-selection options as they appear in the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GermSelectionSettings {
    /// Perturb models with a random unitary before scoring
    #[serde(default = "default_true")]
    pub randomize: bool,

    /// Strength of the random unitary perturbation
    #[serde(default = "default_randomization_strength")]
    pub randomization_strength: f64,

    /// Randomized copies of a single model
    #[serde(default)]
    pub num_copies: Option<usize>,

    /// Base randomization seed
    #[serde(default)]
    pub seed: u64,

    /// Penalty per selected germ
    #[serde(default = "default_l1_penalty")]
    pub l1_penalty: f64,

    /// Penalty per gate in selected germs
    #[serde(default)]
    pub gate_penalty: f64,

    /// Score function ("all" or "worst")
    #[serde(default = "default_score_func")]
    pub score_func: String,

    /// Maximum search iterations
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,

    /// Slack relaxation
    #[serde(default)]
    pub slack: SlackSettings,

    /// Eigenvalue degeneracy tolerance used while twirling
    #[serde(default = "default_tol")]
    pub tol: f64,

    /// Cross-check batched derivatives
    #[serde(default)]
    pub check: bool,

    /// Keep every single-gate germ selected
    #[serde(default = "default_true")]
    pub force_singletons: bool,

    /// Score assigned to weights dropping a single-gate germ
    #[serde(default = "default_force_singletons_score")]
    pub force_singletons_score: f64,

    /// Completeness threshold for the initial germ list
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Return the score cache with the result
    #[serde(default)]
    pub return_all: bool,

    /// Diagnostics verbosity (0 = silent)
    #[serde(default = "default_verbosity")]
    pub verbosity: u8,
}

impl Default for GermSelectionSettings {
    fn default() -> Self {
        Self {
            randomize: true,
            randomization_strength: default_randomization_strength(),
            num_copies: None,
            seed: 0,
            l1_penalty: default_l1_penalty(),
            gate_penalty: 0.0,
            score_func: default_score_func(),
            max_iter: default_max_iter(),
            slack: SlackSettings::default(),
            tol: default_tol(),
            check: false,
            force_singletons: true,
            force_singletons_score: default_force_singletons_score(),
            threshold: default_threshold(),
            return_all: false,
            verbosity: default_verbosity(),
        }
    }
}

impl GermSelectionSettings {
    /// Convert into a validated optimizer configuration.
    pub fn to_germ_selection_config(&self) -> Result<GermSelectionConfig> {
        let config = GermSelectionConfig {
            randomize: self.randomize,
            randomization_strength: self.randomization_strength,
            num_copies: self.num_copies,
            seed: self.seed,
            l1_penalty: self.l1_penalty,
            gate_penalty: self.gate_penalty,
            score_function: self.score_func.parse::<ScoreFunction>()?,
            max_iter: self.max_iter,
            slack: Slack::from_options(self.slack.fixed, self.slack.fraction)?,
            tol: self.tol,
            check: self.check,
            force_singletons: self.force_singletons,
            force_singletons_score: self.force_singletons_score,
            threshold: self.threshold,
            return_all: self.return_all,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Slack options; exactly one must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackSettings {
    /// Absolute slack
    #[serde(default)]
    pub fixed: Option<f64>,

    /// Slack as a fraction of the current score
    #[serde(default)]
    pub fraction: Option<f64>,
}

impl Default for SlackSettings {
    fn default() -> Self {
        Self {
            fixed: None,
            fraction: Some(0.1),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_randomization_strength() -> f64 {
    1e-3
}

fn default_l1_penalty() -> f64 {
    1e-2
}

fn default_score_func() -> String {
    "all".into()
}

fn default_max_iter() -> usize {
    100
}

fn default_tol() -> f64 {
    1e-6
}

fn default_force_singletons_score() -> f64 {
    1e100
}

fn default_threshold() -> f64 {
    1e6
}

fn default_verbosity() -> u8 {
    1
}

/// What to run germ selection on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Standard model pack name
    #[serde(default = "default_model_pack")]
    pub model_pack: String,

    /// Candidate germs (defaults to the pack's germs)
    #[serde(default)]
    pub germs: Option<Vec<String>>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            model_pack: default_model_pack(),
            germs: None,
        }
    }
}

impl RunConfig {
    pub fn model_pack(&self) -> Result<ModelPack> {
        self.model_pack.parse()
    }

    /// Configured candidate germs, or the pack's own list.
    pub fn candidate_germs(&self, pack: ModelPack) -> Result<Vec<Germ>> {
        match &self.germs {
            Some(words) => parse_germs(words),
            None => Ok(pack.germs()),
        }
    }
}

fn default_model_pack() -> String {
    "std1q_xyi".into()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}
