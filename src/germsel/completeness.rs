// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Amplificational completeness tests.
//!
//! A germ list is amplificationally complete when repeating its germs makes
//! every non-gauge gate parameter visible, i.e. the combined Jacobian outer
//! product has no (near-)zero eigenvalue outside the gauge directions.
//! Both tests strip SPAM first so only gate parameters are counted.

use ndarray::{Array3, Axis};
use tracing::debug;

use super::deriv::calc_twirled_ddd;
use super::score::{combined_ddd, list_score, sq_sing_vals_from_deriv};
use super::types::ScoreFunction;
use crate::diagnostics::Diagnostics;
use crate::error::{Result, ValidationError};
use crate::linalg::eigvalsh;
use crate::model::{GateSetModel, Germ};

/// Outcome of an amplification test.
#[derive(Debug, Clone, PartialEq)]
pub struct AmplificationReport {
    /// Whether every non-gauge parameter is amplified.
    pub complete: bool,
    /// Full sorted spectrum, gauge eigenvalues included.
    pub spectrum: Vec<f64>,
}

/// Gauge parameters of the model restricted to its gates.
pub fn num_non_spam_gauge_params<M: GateSetModel>(model: &M) -> Result<usize> {
    model.without_spam().num_gauge_params()
}

fn check_inputs(germs: &[Germ], weights: Option<&[f64]>) -> Result<()> {
    if germs.is_empty() {
        return Err(ValidationError::Precondition("germ list is empty".into()).into());
    }
    if let Some(w) = weights {
        if w.len() != germs.len() {
            return Err(ValidationError::LengthMismatch {
                what: "germ weights".into(),
                expected: germs.len(),
                actual: w.len(),
            }
            .into());
        }
    }
    Ok(())
}

/// Completeness decision on a sorted spectrum: the `n_gauge` smallest
/// eigenvalues are gauge directions, the rest must score below `threshold`.
pub fn spectrum_is_complete(
    spectrum: &[f64],
    n_gauge: usize,
    score_function: ScoreFunction,
    threshold: f64,
) -> bool {
    let observable = spectrum.get(n_gauge..).unwrap_or(&[]);
    list_score(observable, score_function) < threshold
}

/// Test completeness at finite germ power `length`.
///
/// Each germ is raised to `length`, its (untwirled) derivative divided by
/// `length · |germ|`, and the weighted average of `Jᴴ·J` diagonalized.
/// Complete when the worst observable eigenvalue exceeds `tol`.
pub fn test_germ_list_finite_l<M: GateSetModel>(
    model: &M,
    germs: &[Germ],
    length: usize,
    weights: Option<&[f64]>,
    tol: f64,
) -> Result<AmplificationReport> {
    check_inputs(germs, weights)?;
    if length == 0 {
        return Err(ValidationError::Field {
            field: "length".into(),
            message: "must be > 0".into(),
        }
        .into());
    }

    let model = model.without_spam();
    let powered: Vec<Germ> = germs.iter().map(|g| g.repeat(length)).collect();
    let tree = model.bulk_evaltree(&powered)?;
    let (_, dprods) = model.bulk_product_and_dproduct(&tree)?;

    let dd = model.dim() * model.dim();
    let mut normalized = Array3::zeros((germs.len(), dd, model.num_gate_params()));
    for (i, (dprod, germ)) in dprods.iter().zip(germs).enumerate() {
        let scale = (length * germ.len()) as f64;
        normalized
            .index_axis_mut(Axis(0), i)
            .assign(&dprod.mapv(|z| z / scale));
    }

    let spectrum = sq_sing_vals_from_deriv(&normalized, weights)?;
    let n_gauge = model.num_gauge_params()?;
    let complete = spectrum_is_complete(&spectrum, n_gauge, ScoreFunction::Worst, 1.0 / tol);

    debug!(length, complete, n_gauge, "Finite-length amplification test");
    Ok(AmplificationReport { complete, spectrum })
}

/// Test completeness in the infinite-length limit using twirled
/// derivatives.
///
/// Twirling uses `eps = 1/threshold`; weights default to ones. Complete
/// when the score of the observable spectrum is below `threshold`.
pub fn test_germ_list_infinite_l<M: GateSetModel>(
    model: &M,
    germs: &[Germ],
    score_function: ScoreFunction,
    weights: Option<&[f64]>,
    threshold: f64,
    check: bool,
    diagnostics: &dyn Diagnostics,
) -> Result<AmplificationReport> {
    check_inputs(germs, weights)?;

    let model = model.without_spam();
    let ddd = calc_twirled_ddd(&model, germs, 1.0 / threshold, check, None, diagnostics)?;
    let ones;
    let weights = match weights {
        Some(w) => w,
        None => {
            ones = vec![1.0; germs.len()];
            ones.as_slice()
        }
    };
    let combined = combined_ddd(&ddd, weights)?;
    let spectrum = eigvalsh(&combined)?;
    let n_gauge = model.num_gauge_params()?;
    let complete = spectrum_is_complete(&spectrum, n_gauge, score_function, threshold);

    debug!(threshold, complete, n_gauge, "Infinite-length amplification test");
    Ok(AmplificationReport { complete, spectrum })
}

/// Index of the first model for which `germs` is not amplificationally
/// complete, or `None` when complete for all.
pub fn check_germs_list_completeness<M: GateSetModel>(
    models: &[M],
    germs: &[Germ],
    score_function: ScoreFunction,
    threshold: f64,
    diagnostics: &dyn Diagnostics,
) -> Result<Option<usize>> {
    for (index, model) in models.iter().enumerate() {
        let report = test_germ_list_infinite_l(
            model,
            germs,
            score_function,
            None,
            threshold,
            false,
            diagnostics,
        )?;
        if !report.complete {
            return Ok(Some(index));
        }
    }
    Ok(None)
}
