// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Germ selection for gate-set tomography.
//!
//! Picks a small subset of candidate germs whose repetitions amplify every
//! non-gauge gate parameter of a model.
//!
//! # Architecture
//!
//! - [`perfect_twirl_superop`]: Projection onto a germ's eigenspaces
//! - [`bulk_twirled_deriv`]: Twirled Jacobians of many germs at once
//! - [`list_score`]: Reduction of observable eigenvalues to a score
//! - [`test_germ_list_infinite_l`] / [`test_germ_list_finite_l`]:
//!   Amplificational completeness tests
//! - [`GermOptimizer::optimize`]: Local search with slack over germ subsets
//!
//! # References
//!
//! - Greenbaum (2015), "Introduction to Quantum Gate Set Tomography",
//!   arXiv:1509.02921
//! - Blume-Kohout et al. (2017), "Demonstration of qubit operations below a
//!   rigorous fault tolerance threshold with gate set tomography",
//!   Nat. Commun. 8, 14485. doi:10.1038/ncomms14485

pub mod completeness;
pub mod deriv;
pub mod optimize;
pub mod score;
pub mod twirl;
pub mod types;
pub mod weights;

pub use completeness::{
    check_germs_list_completeness, num_non_spam_gauge_params, spectrum_is_complete,
    test_germ_list_finite_l, test_germ_list_infinite_l, AmplificationReport,
};
pub use deriv::{bulk_twirled_deriv, calc_twirled_ddd, twirled_deriv};
pub use optimize::{randomize_model_list, GermOptimizer};
pub use score::{list_score, GermScorer, ScoreCache, ScoringOptions};
pub use twirl::perfect_twirl_superop;
pub use types::{
    GermSelectionConfig, GermSelectionResult, GermSelectionSummary, ScoreFunction, SearchOutcome,
    Slack,
};
pub use weights::WeightVector;
