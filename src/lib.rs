// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! QubitOS gate set tomography germ selection
//!
//! This crate chooses, from a list of candidate germs, a small subset whose
//! repetitions amplify every non-gauge parameter of a gate set.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            GermOptimizer                 │
//! ├──────────────────┬──────────────────────┤
//! │   GermScorer     │ Completeness tests   │
//! ├──────────────────┴──────────────────────┤
//! │   Twirled Jacobians (perfect twirl)      │
//! ├─────────────────────────────────────────┤
//! │   GateSetModel (ExplicitModel, packs)    │
//! ├─────────────────────────────────────────┤
//! │   linalg (expm, eig, eigvalsh, solve)    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration management
//! - [`germsel`]: Twirling, scoring, completeness and the optimizer
//! - [`model`]: Gate-set models and germs
//! - [`linalg`]: Dense complex linear algebra
//! - [`diagnostics`]: Progress and warning sink
//! - [`logging`]: Tracing subscriber setup
//! - [`error`]: Error types

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod germsel;
pub mod linalg;
pub mod logging;
pub mod model;

pub use config::Config;
pub use error::{Error, Result};

#[cfg(test)]
pub mod test_utils;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
