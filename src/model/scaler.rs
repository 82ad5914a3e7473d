//! Scaling transform
//!
//! Pre-fitted normalization applied before classification. Parameters are
//! exported from the training notebook as JSON:
//!
//! ```json
//! { "type": "standard", "mean": [..6], "scale": [..6] }
//! { "type": "min_max",  "min":  [..6], "max":   [..6] }
//! ```

use std::path::Path;

use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use super::error::InferenceError;
use crate::features::layout::{matches_layout, FEATURE_COUNT};

const ARTIFACT: &str = "scaler";

/// Fitted parameters as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScalerParams {
    /// (x - mean) / scale, zero scale treated as 1
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// (x - min) / (max - min)
    MinMax { min: Vec<f64>, max: Vec<f64> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerFile {
    #[serde(flatten)]
    params: ScalerParams,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
}

/// Loaded scaler with offset/divisor precomputed
#[derive(Debug, Clone)]
pub struct Scaler {
    params: ScalerParams,
    offset: Array1<f64>,
    divisor: Array1<f64>,
}

impl Scaler {
    pub fn new(params: ScalerParams) -> Result<Self, InferenceError> {
        let (offset, divisor): (Vec<f64>, Vec<f64>) = match &params {
            ScalerParams::Standard { mean, scale } => {
                check_lengths("mean", mean, "scale", scale)?;
                let divisor = scale
                    .iter()
                    .map(|&s| if s == 0.0 { 1.0 } else { s })
                    .collect();
                (mean.clone(), divisor)
            }
            ScalerParams::MinMax { min, max } => {
                check_lengths("min", min, "max", max)?;
                if let Some(i) = min.iter().zip(max).position(|(lo, hi)| hi < lo) {
                    return Err(InferenceError::artifact(
                        ARTIFACT,
                        format!("feature {} has max below min", i),
                    ));
                }
                // zero range divides by 1, as a zero std does
                let divisor = min
                    .iter()
                    .zip(max)
                    .map(|(lo, hi)| if hi - lo == 0.0 { 1.0 } else { hi - lo })
                    .collect();
                (min.clone(), divisor)
            }
        };

        if offset.iter().chain(divisor.iter()).any(|v| !v.is_finite()) {
            return Err(InferenceError::artifact(ARTIFACT, "parameters contain non-finite values"));
        }

        Ok(Self {
            params,
            offset: Array1::from(offset),
            divisor: Array1::from(divisor),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, InferenceError> {
        let file: ScalerFile = serde_json::from_str(json)
            .map_err(|e| InferenceError::artifact(ARTIFACT, format!("invalid JSON: {}", e)))?;

        if let Some(names) = &file.feature_names {
            if !matches_layout(names) {
                return Err(InferenceError::artifact(
                    ARTIFACT,
                    format!("fitted on features {:?}, which do not match the current layout", names),
                ));
            }
        }

        Self::new(file.params)
    }

    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            InferenceError::artifact(ARTIFACT, format!("{}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn params(&self) -> &ScalerParams {
        &self.params
    }

    pub fn kind(&self) -> &'static str {
        match self.params {
            ScalerParams::Standard { .. } => "standard",
            ScalerParams::MinMax { .. } => "min_max",
        }
    }

    pub fn dimension(&self) -> usize {
        self.offset.len()
    }

    /// Scale every row of `input`
    pub fn transform(&self, input: ArrayView2<'_, f64>) -> Result<Array2<f64>, InferenceError> {
        if input.ncols() != self.dimension() {
            return Err(InferenceError::ArityMismatch {
                expected: self.dimension(),
                actual: input.ncols(),
            });
        }

        Ok((&input - &self.offset) / &self.divisor)
    }
}

fn check_lengths(a_name: &str, a: &[f64], b_name: &str, b: &[f64]) -> Result<(), InferenceError> {
    if a.len() != FEATURE_COUNT || b.len() != FEATURE_COUNT {
        return Err(InferenceError::artifact(
            ARTIFACT,
            format!(
                "expected {} values in '{}' and '{}', found {} and {}",
                FEATURE_COUNT,
                a_name,
                b_name,
                a.len(),
                b.len()
            ),
        ));
    }
    Ok(())
}
