//! Inference errors
//!
//! Every failure is a deterministic input or artifact problem, so callers
//! get a tagged error instead of a retry hint.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    /// Machine type token outside {L, M, H}
    #[error("unrecognized machine type '{0}', expected one of L, M, H")]
    UnrecognizedCategory(String),

    /// Batch table lacks a required column
    #[error("missing required column '{0}'")]
    MissingColumn(String),

    /// Batch table carries a column outside the layout
    #[error("unexpected column '{0}'")]
    UnexpectedColumn(String),

    /// Numeric field absent, unparseable or not finite
    #[error("field '{field}' is not numeric: '{value}'")]
    NonNumericField { field: String, value: String },

    /// A batch row failed; `row` is 1-based, header excluded
    #[error("row {row}: {source}")]
    InvalidRow {
        row: usize,
        #[source]
        source: Box<InferenceError>,
    },

    /// Table could not be read at all
    #[error("malformed table: {0}")]
    MalformedTable(String),

    /// Feature vector length differs from the fitted artifacts
    #[error("feature vector has {actual} values, expected {expected}")]
    ArityMismatch { expected: usize, actual: usize },

    /// Scaler or classifier unavailable; fatal at startup
    #[error("failed to load {artifact}: {reason}")]
    ArtifactLoadFailure { artifact: &'static str, reason: String },

    /// Classifier failed while running
    #[error("inference failed: {0}")]
    Runtime(String),
}

impl InferenceError {
    pub fn artifact(artifact: &'static str, reason: impl Into<String>) -> Self {
        InferenceError::ArtifactLoadFailure { artifact, reason: reason.into() }
    }

    pub fn non_numeric(field: &str, value: impl Into<String>) -> Self {
        InferenceError::NonNumericField {
            field: field.to_string(),
            value: value.into(),
        }
    }

    /// Attach a 1-based row number
    pub fn at_row(self, row: usize) -> Self {
        InferenceError::InvalidRow { row, source: Box::new(self) }
    }

    /// True for errors caused by the caller's data rather than the model
    pub fn is_input_error(&self) -> bool {
        match self {
            InferenceError::UnrecognizedCategory(_)
            | InferenceError::MissingColumn(_)
            | InferenceError::UnexpectedColumn(_)
            | InferenceError::NonNumericField { .. }
            | InferenceError::MalformedTable(_)
            | InferenceError::ArityMismatch { .. } => true,
            InferenceError::InvalidRow { source, .. } => source.is_input_error(),
            InferenceError::ArtifactLoadFailure { .. } | InferenceError::Runtime(_) => false,
        }
    }
}
