// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Standard single-qubit model packs with their reference germ lists.

use std::f64::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::explicit::ExplicitModel;
use super::germ::Germ;
use super::ptm::{rotation_ptm, zero_state_vector, PauliAxis};
use crate::error::{Error, Result, ValidationError};
use crate::linalg::identity;

/// Named standard gate sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelPack {
    /// Idle, X(π/2), Y(π/2).
    #[serde(rename = "std1q_xyi")]
    Std1qXYI,
    /// X(π/2), Y(π/2).
    #[serde(rename = "std1q_xy")]
    Std1qXY,
}

impl ModelPack {
    pub fn name(&self) -> &'static str {
        match self {
            ModelPack::Std1qXYI => "std1q_xyi",
            ModelPack::Std1qXY => "std1q_xy",
        }
    }

    /// The ideal target model, with `|0⟩` preparation and measurement.
    pub fn model(&self) -> Result<ExplicitModel> {
        let mut model = ExplicitModel::new(4);
        if *self == ModelPack::Std1qXYI {
            model.add_gate("Gi", identity(4))?;
        }
        model.add_gate("Gx", rotation_ptm(PauliAxis::X, FRAC_PI_2)?)?;
        model.add_gate("Gy", rotation_ptm(PauliAxis::Y, FRAC_PI_2)?)?;
        model.add_prep("rho0", zero_state_vector())?;
        model.add_effect("E0", zero_state_vector())?;
        Ok(model)
    }

    /// Reference germ list; single-gate germs come first.
    pub fn germs(&self) -> Vec<Germ> {
        let words: &[&[&str]] = match self {
            ModelPack::Std1qXYI => &[
                &["Gi"],
                &["Gx"],
                &["Gy"],
                &["Gx", "Gy"],
                &["Gx", "Gy", "Gi"],
                &["Gx", "Gi", "Gy"],
                &["Gx", "Gi", "Gi"],
                &["Gy", "Gi", "Gi"],
                &["Gx", "Gx", "Gi", "Gy"],
                &["Gx", "Gy", "Gy", "Gi"],
                &["Gx", "Gx", "Gy", "Gx", "Gy", "Gy"],
            ],
            ModelPack::Std1qXY => &[&["Gx"], &["Gy"], &["Gx", "Gy"], &["Gx", "Gx", "Gy"]],
        };
        words.iter().map(|w| Germ::new(w.iter().copied())).collect()
    }
}

impl fmt::Display for ModelPack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ModelPack {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "std1q_xyi" => Ok(ModelPack::Std1qXYI),
            "std1q_xy" => Ok(ModelPack::Std1qXY),
            other => Err(ValidationError::InvalidArgument(format!(
                "unknown model pack '{}' (expected std1q_xyi or std1q_xy)",
                other
            ))
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GateSetModel;

    #[test]
    fn test_pack_from_str() {
        assert_eq!("std1q_xyi".parse::<ModelPack>().unwrap(), ModelPack::Std1qXYI);
        assert_eq!("STD1Q_XY".parse::<ModelPack>().unwrap(), ModelPack::Std1qXY);
        assert!("std2q".parse::<ModelPack>().is_err());
    }

    #[test]
    fn test_xyi_germs_start_with_singletons() {
        let pack = ModelPack::Std1qXYI;
        let model = pack.model().unwrap();
        let germs = pack.germs();
        assert_eq!(germs.len(), 11);
        for (germ, label) in germs.iter().zip(model.gate_labels()) {
            assert_eq!(germ, &Germ::single(label.clone()));
        }
    }

    #[test]
    fn test_xy_model_has_two_gates() {
        let model = ModelPack::Std1qXY.model().unwrap();
        assert_eq!(model.gate_labels(), &["Gx", "Gy"]);
        assert_eq!(ModelPack::Std1qXY.germs()[3].to_string(), "GxGxGy");
    }

    #[test]
    fn test_pack_serde_name() {
        let json = serde_json::to_string(&ModelPack::Std1qXYI).unwrap();
        assert_eq!(json, "\"std1q_xyi\"");
        assert_eq!(ModelPack::Std1qXY.to_string(), "std1q_xy");
    }
}
