// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Twirled germ Jacobians.
//!
//! The twirled derivative of a germ is the derivative of its product,
//! projected onto the directions that survive infinitely many repetitions:
//! `T(product) · dproduct`, shape `(d², p)` with `p` gate parameters.

use ndarray::{s, Array2, Array3, Axis};
use num_complex::Complex64;
use tracing::debug;

use super::twirl::perfect_twirl_superop;
use crate::diagnostics::Diagnostics;
use crate::error::{Result, ValidationError};
use crate::linalg::{dagger, frobenius_norm};
use crate::model::{GateSetModel, Germ};

/// Bulk and single-germ derivatives may differ by this much before a
/// warning is raised.
const CHECK_TOLERANCE: f64 = 1e-6;

/// Twirled derivative of one germ, shape `(d², p)`.
pub fn twirled_deriv<M: GateSetModel>(
    model: &M,
    germ: &Germ,
    eps: f64,
) -> Result<Array2<Complex64>> {
    let prod = model.product(germ)?;
    let dprod = model.dproduct(germ)?;
    let twirler = perfect_twirl_superop(&prod, eps)?;
    Ok(twirler.dot(&dprod))
}

/// Twirled derivatives of every germ, shape `(n, d², p)`.
///
/// Products and derivatives come from one batched evaluation. With `check`,
/// each germ is recomputed through [`twirled_deriv`] and a mismatch larger
/// than `1e-6` is reported as a warning; the batched values are returned
/// regardless.
pub fn bulk_twirled_deriv<M: GateSetModel>(
    model: &M,
    germs: &[Germ],
    eps: f64,
    check: bool,
    diagnostics: &dyn Diagnostics,
) -> Result<Array3<Complex64>> {
    let d = model.dim();
    let dd = d * d;
    let p = model.num_gate_params();

    let tree = model.bulk_evaltree(germs)?;
    let (prods, dprods) = model.bulk_product_and_dproduct(&tree)?;

    let mut out = Array3::zeros((germs.len(), dd, p));
    for (i, (prod, dprod)) in prods.iter().zip(&dprods).enumerate() {
        let twirler = perfect_twirl_superop(prod, eps)?;
        out.index_axis_mut(Axis(0), i).assign(&twirler.dot(dprod));
    }

    if check {
        for (i, germ) in germs.iter().enumerate() {
            let single = twirled_deriv(model, germ, eps)?;
            let bulk = out.index_axis(Axis(0), i);
            let diff = frobenius_norm((&bulk - &single).iter());
            if diff > CHECK_TOLERANCE {
                diagnostics.warn(&format!(
                    "bulk twirled deriv norm mismatch for {} = {:e} - {:e} = {:e}",
                    germ,
                    frobenius_norm(bulk.iter()),
                    frobenius_norm(single.iter()),
                    diff
                ));
            }
        }
    }

    debug!(
        num_germs = germs.len(),
        num_nodes = tree.num_nodes(),
        "Computed bulk twirled derivatives"
    );
    Ok(out)
}

/// Per-germ `Jᴴ·J` of the length-normalized twirled Jacobians, shape
/// `(n, p, p)`.
///
/// `germ_lengths` defaults to the germs' own lengths.
pub fn calc_twirled_ddd<M: GateSetModel>(
    model: &M,
    germs: &[Germ],
    eps: f64,
    check: bool,
    germ_lengths: Option<&[usize]>,
    diagnostics: &dyn Diagnostics,
) -> Result<Array3<Complex64>> {
    let lengths: Vec<usize> = match germ_lengths {
        Some(l) if l.len() != germs.len() => {
            return Err(ValidationError::LengthMismatch {
                what: "germ lengths".into(),
                expected: germs.len(),
                actual: l.len(),
            }
            .into())
        }
        Some(l) => l.to_vec(),
        None => germs.iter().map(Germ::len).collect(),
    };

    let deriv = bulk_twirled_deriv(model, germs, eps, check, diagnostics)?;
    Ok(ddd_from_deriv(&deriv, |i| lengths[i] as f64))
}

/// `Jᵢᴴ·Jᵢ` for each `Jᵢ = deriv[i] / scale(i)`.
pub(crate) fn ddd_from_deriv<F>(deriv: &Array3<Complex64>, scale: F) -> Array3<Complex64>
where
    F: Fn(usize) -> f64,
{
    let (n, _, p) = deriv.dim();
    let mut ddd = Array3::zeros((n, p, p));
    for i in 0..n {
        let j = deriv.index_axis(Axis(0), i).mapv(|z| z / scale(i));
        ddd.slice_mut(s![i, .., ..]).assign(&dagger(&j).dot(&j));
    }
    ddd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingDiagnostics;
    use crate::model::ModelPack;
    use crate::test_utils::{assert_matrix_close, randomized_xyi};

    #[test]
    fn test_bulk_matches_single() {
        let model = randomized_xyi(5);
        let germs = ModelPack::Std1qXYI.germs();
        let diag = RecordingDiagnostics::new();
        let bulk = bulk_twirled_deriv(&model, &germs, 1e-6, true, &diag).unwrap();
        assert_eq!(bulk.dim(), (11, 16, 48));
        assert!(diag.warnings().is_empty(), "{:?}", diag.warnings());
        for (i, germ) in germs.iter().enumerate() {
            let single = twirled_deriv(&model, germ, 1e-6).unwrap();
            assert_matrix_close(&bulk.index_axis(Axis(0), i).to_owned(), &single, 1e-9);
        }
    }

    #[test]
    fn test_ddd_is_hermitian_psd() {
        let model = randomized_xyi(1);
        let germs = ModelPack::Std1qXYI.germs();
        let ddd = calc_twirled_ddd(
            &model,
            &germs[..4],
            1e-6,
            false,
            None,
            &RecordingDiagnostics::new(),
        )
        .unwrap();
        assert_eq!(ddd.dim(), (4, 48, 48));
        let block = ddd.index_axis(Axis(0), 3).to_owned();
        assert_matrix_close(&block, &dagger(&block), 1e-12);
        let values = crate::linalg::eigvalsh(&block).unwrap();
        assert!(values[0] > -1e-10);
    }

    #[test]
    fn test_germ_length_normalization() {
        let model = randomized_xyi(2);
        let germs = vec![Germ::new(["Gx", "Gy"])];
        let diag = RecordingDiagnostics::new();
        let by_length = calc_twirled_ddd(&model, &germs, 1e-6, false, None, &diag).unwrap();
        let unit = calc_twirled_ddd(&model, &germs, 1e-6, false, Some(&[1]), &diag).unwrap();
        // Dividing J by 2 divides JᴴJ by 4
        let scaled = unit.mapv(|z| z / 4.0);
        assert_matrix_close(
            &by_length.index_axis(Axis(0), 0).to_owned(),
            &scaled.index_axis(Axis(0), 0).to_owned(),
            1e-12,
        );
    }

    #[test]
    fn test_germ_lengths_mismatch_rejected() {
        let model = randomized_xyi(2);
        let germs = ModelPack::Std1qXYI.germs();
        let result = calc_twirled_ddd(
            &model,
            &germs,
            1e-6,
            false,
            Some(&[1, 2]),
            &RecordingDiagnostics::new(),
        );
        assert!(result.is_err());
    }
}
