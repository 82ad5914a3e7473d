//! Classifier trait and the built-in logistic regression
//!
//! The service never trains anything; a classifier only maps scaled
//! vectors to Normal/Failure decisions.

use std::path::Path;

use ndarray::{Array1, ArrayView2};
use serde::{Deserialize, Serialize};

use super::error::InferenceError;
use crate::features::layout::{matches_layout, FEATURE_COUNT};
use crate::features::{Decision, FailureLabel};

const ARTIFACT: &str = "classifier";

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Trait for classifier backends (ONNX, linear weights, test doubles)
pub trait Classifier: Send + Sync {
    /// Short backend name for status reporting
    fn kind(&self) -> &'static str;

    /// Number of input features the model was fitted on
    fn dimension(&self) -> usize;

    /// One decision per row of `scaled`, in row order
    fn predict(&self, scaled: ArrayView2<'_, f64>) -> Result<Vec<Decision>, InferenceError>;
}

// ============================================================================
// LOGISTIC REGRESSION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegressionParams {
    #[serde(rename = "type", default = "default_model_type")]
    pub model_type: String,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

fn default_model_type() -> String {
    "logistic_regression".to_string()
}

fn default_threshold() -> f64 {
    0.5
}

/// Linear model: p = sigmoid(w·x + b), Failure when p >= threshold
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    weights: Array1<f64>,
    intercept: f64,
    threshold: f64,
}

impl LogisticRegression {
    pub fn new(params: LogisticRegressionParams) -> Result<Self, InferenceError> {
        if params.model_type != "logistic_regression" {
            return Err(InferenceError::artifact(
                ARTIFACT,
                format!("unsupported model type '{}'", params.model_type),
            ));
        }
        if params.coefficients.len() != FEATURE_COUNT {
            return Err(InferenceError::artifact(
                ARTIFACT,
                format!(
                    "expected {} coefficients, found {}",
                    FEATURE_COUNT,
                    params.coefficients.len()
                ),
            ));
        }
        if let Some(names) = &params.feature_names {
            if !matches_layout(names) {
                return Err(InferenceError::artifact(
                    ARTIFACT,
                    format!("fitted on features {:?}, which do not match the current layout", names),
                ));
            }
        }
        if !(0.0..=1.0).contains(&params.threshold) {
            return Err(InferenceError::artifact(
                ARTIFACT,
                format!("threshold {} outside [0, 1]", params.threshold),
            ));
        }
        if !params.intercept.is_finite() || params.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(InferenceError::artifact(ARTIFACT, "weights contain non-finite values"));
        }

        Ok(Self {
            weights: Array1::from(params.coefficients),
            intercept: params.intercept,
            threshold: params.threshold,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, InferenceError> {
        let params: LogisticRegressionParams = serde_json::from_str(json)
            .map_err(|e| InferenceError::artifact(ARTIFACT, format!("invalid JSON: {}", e)))?;
        Self::new(params)
    }

    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            InferenceError::artifact(ARTIFACT, format!("{}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Classifier for LogisticRegression {
    fn kind(&self) -> &'static str {
        "logistic_regression"
    }

    fn dimension(&self) -> usize {
        self.weights.len()
    }

    fn predict(&self, scaled: ArrayView2<'_, f64>) -> Result<Vec<Decision>, InferenceError> {
        if scaled.ncols() != self.dimension() {
            return Err(InferenceError::ArityMismatch {
                expected: self.dimension(),
                actual: scaled.ncols(),
            });
        }

        let logits = scaled.dot(&self.weights) + self.intercept;

        logits
            .iter()
            .map(|&z| {
                let p = sigmoid(z);
                if !p.is_finite() {
                    return Err(InferenceError::Runtime(format!("non-finite score for logit {}", z)));
                }
                let label = if p >= self.threshold {
                    FailureLabel::Failure
                } else {
                    FailureLabel::Normal
                };
                Ok(Decision { label, probability: Some(p) })
            })
            .collect()
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
