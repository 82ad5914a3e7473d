//! ONNX classifier - ONNX Runtime Integration
//!
//! Runs a classifier exported with skl2onnx (or any model with a `[N, 6]`
//! float input). Labels come from an int64 `label` output when present,
//! otherwise from float scores thresholded at 0.5.

use std::path::Path;

use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::classifier::Classifier;
use super::error::InferenceError;
use crate::features::layout::FEATURE_COUNT;
use crate::features::{Decision, FailureLabel};
use ndarray::ArrayView2;

const ARTIFACT: &str = "classifier";
const SCORE_THRESHOLD: f64 = 0.5;

pub struct OnnxClassifier {
    /// `Session::run` needs exclusive access
    session: Mutex<Session>,
    label_output: String,
    probability_output: Option<String>,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("label_output", &self.label_output)
            .field("probability_output", &self.probability_output)
            .finish()
    }
}

impl OnnxClassifier {
    /// Load ONNX model from file
    pub fn load(model_path: &Path) -> Result<Self, InferenceError> {
        tracing::info!("Loading ONNX classifier from: {}", model_path.display());

        let model_bytes = std::fs::read(model_path).map_err(|e| {
            InferenceError::artifact(ARTIFACT, format!("{}: {}", model_path.display(), e))
        })?;

        Self::from_bytes(&model_bytes)
    }

    /// Load ONNX model from bytes
    pub fn from_bytes(model_bytes: &[u8]) -> Result<Self, InferenceError> {
        tracing::info!("Loading ONNX classifier from memory ({} bytes)", model_bytes.len());

        let session = Session::builder()
            .map_err(|e| InferenceError::artifact(ARTIFACT, format!("session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::artifact(ARTIFACT, format!("optimization: {}", e)))?
            .commit_from_memory(model_bytes)
            .map_err(|e| InferenceError::artifact(ARTIFACT, format!("load model: {}", e)))?;

        Self::from_session(session)
    }

    fn from_session(session: Session) -> Result<Self, InferenceError> {
        if session.inputs.len() != 1 {
            return Err(InferenceError::artifact(
                ARTIFACT,
                format!("expected a single input tensor, model has {}", session.inputs.len()),
            ));
        }

        let names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
        let label_output = names
            .iter()
            .find(|n| n.as_str() == "label")
            .or_else(|| names.first())
            .cloned()
            .ok_or_else(|| InferenceError::artifact(ARTIFACT, "model defines no outputs"))?;
        let probability_output = names.iter().find(|n| **n != label_output).cloned();

        tracing::info!(
            "ONNX classifier ready (label output '{}', probability output {:?})",
            label_output,
            probability_output
        );

        Ok(Self {
            session: Mutex::new(session),
            label_output,
            probability_output,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn dimension(&self) -> usize {
        FEATURE_COUNT
    }

    fn predict(&self, scaled: ArrayView2<'_, f64>) -> Result<Vec<Decision>, InferenceError> {
        if scaled.ncols() != FEATURE_COUNT {
            return Err(InferenceError::ArityMismatch {
                expected: FEATURE_COUNT,
                actual: scaled.ncols(),
            });
        }
        let rows = scaled.nrows();
        if rows == 0 {
            return Ok(Vec::new());
        }

        let input_array = scaled.mapv(|v| v as f32);
        let input_tensor = Value::from_array(input_array)
            .map_err(|e| InferenceError::Runtime(format!("tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError::Runtime(format!("session run: {}", e)))?;

        let mut probabilities = self
            .probability_output
            .as_deref()
            .and_then(|name| outputs.get(name))
            .and_then(|value| value.try_extract_tensor::<f32>().ok())
            .and_then(|(_, data)| positive_scores(data, rows).ok());

        let label_value = outputs
            .get(self.label_output.as_str())
            .ok_or_else(|| InferenceError::Runtime("label output missing".to_string()))?;

        let labels: Vec<FailureLabel> = if let Ok((_, codes)) = label_value.try_extract_tensor::<i64>() {
            if codes.len() != rows {
                return Err(InferenceError::Runtime(format!(
                    "model returned {} labels for {} rows",
                    codes.len(),
                    rows
                )));
            }
            codes
                .iter()
                .map(|&c| {
                    FailureLabel::from_code(c)
                        .ok_or_else(|| InferenceError::Runtime(format!("label {} is not binary", c)))
                })
                .collect::<Result<_, _>>()?
        } else {
            let (_, data) = label_value
                .try_extract_tensor::<f32>()
                .map_err(|e| InferenceError::Runtime(format!("extract error: {}", e)))?;
            let scores = positive_scores(data, rows)?;
            let labels = scores
                .iter()
                .map(|&p| if p >= SCORE_THRESHOLD { FailureLabel::Failure } else { FailureLabel::Normal })
                .collect();
            probabilities.get_or_insert(scores);
            labels
        };

        Ok(labels
            .into_iter()
            .enumerate()
            .map(|(i, label)| Decision {
                label,
                probability: probabilities.as_ref().map(|p| p[i]),
            })
            .collect())
    }
}

/// Failure score per row from `[N]` scores or `[N, 2]` class probabilities
fn positive_scores(data: &[f32], rows: usize) -> Result<Vec<f64>, InferenceError> {
    let scores: Vec<f64> = if data.len() == rows {
        data.iter().map(|&v| f64::from(v)).collect()
    } else if data.len() == rows * 2 {
        data.chunks_exact(2).map(|pair| f64::from(pair[1])).collect()
    } else {
        return Err(InferenceError::Runtime(format!(
            "cannot read {} scores for {} rows",
            data.len(),
            rows
        )));
    };

    if scores.iter().any(|s| !s.is_finite()) {
        return Err(InferenceError::Runtime("model produced non-finite scores".to_string()));
    }
    Ok(scores)
}
