//! Model Module - failure inference
//!
//! Loads the pre-fitted scaler and classifier and applies them to feature
//! records. Nothing here trains or updates a model.

pub mod artifacts;
pub mod classifier;
pub mod error;
pub mod onnx;
pub mod scaler;
pub mod service;

#[cfg(test)]
mod tests;

pub use artifacts::{ArtifactPaths, ModelMetadata};
pub use classifier::{Classifier, LogisticRegression, LogisticRegressionParams};
pub use error::InferenceError;
pub use onnx::OnnxClassifier;
pub use scaler::{Scaler, ScalerParams};
pub use service::{EngineStatus, InferenceService};
