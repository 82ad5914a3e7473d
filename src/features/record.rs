//! Feature Record - one machine's readings, and the prediction made for it

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::layout::{FEATURE_COUNT, FEATURE_FIELDS};
use super::machine_type::MachineType;
use crate::model::InferenceError;

// ============================================================================
// FEATURE RECORD
// ============================================================================

/// A validated record, ready for inference.
///
/// Range rules are only enforced through `validate()`, which the single
/// prediction endpoint calls. Batch rows skip it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct FeatureRecord {
    pub machine_type: MachineType,
    /// Kelvin
    pub air_temperature: f64,
    /// Kelvin
    pub process_temperature: f64,
    #[validate(range(exclusive_min = 0.0, message = "rotational speed must be positive"))]
    pub rotational_speed: f64,
    #[validate(range(exclusive_min = 0.0, message = "torque must be positive"))]
    pub torque: f64,
    #[validate(range(min = 0.0, message = "tool wear cannot be negative"))]
    pub tool_wear: f64,
}

impl FeatureRecord {
    /// Vector in layout order: type code, air, process, speed, torque, wear
    pub fn to_vector(&self) -> [f64; FEATURE_COUNT] {
        [
            f64::from(self.machine_type.code()),
            self.air_temperature,
            self.process_temperature,
            self.rotational_speed,
            self.torque,
            self.tool_wear,
        ]
    }

    /// Reject NaN and infinities, which the scaler would pass straight
    /// through to the classifier.
    pub fn ensure_finite(&self) -> Result<(), InferenceError> {
        let values = self.to_vector();
        for (i, value) in values.iter().enumerate().skip(1) {
            if !value.is_finite() {
                return Err(InferenceError::non_numeric(FEATURE_FIELDS[i], value.to_string()));
            }
        }
        Ok(())
    }
}

// ============================================================================
// RAW INPUT
// ============================================================================

/// A numeric input as typed by a user: a JSON number or a string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn parse(&self, field: &str) -> Result<f64, InferenceError> {
        let value = match self {
            FieldValue::Number(n) => *n,
            FieldValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| InferenceError::non_numeric(field, s.as_str()))?,
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(InferenceError::non_numeric(field, value.to_string()))
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// Unvalidated record: a form submission or one table row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFeatureRecord {
    #[serde(default)]
    pub machine_type: String,
    #[serde(default)]
    pub air_temperature: Option<FieldValue>,
    #[serde(default)]
    pub process_temperature: Option<FieldValue>,
    #[serde(default)]
    pub rotational_speed: Option<FieldValue>,
    #[serde(default)]
    pub torque: Option<FieldValue>,
    #[serde(default)]
    pub tool_wear: Option<FieldValue>,
}

impl RawFeatureRecord {
    /// Build from string cells in layout order
    pub fn from_cells(cells: [&str; FEATURE_COUNT]) -> Self {
        let field = |s: &str| {
            if s.is_empty() {
                None
            } else {
                Some(FieldValue::from(s))
            }
        };

        Self {
            machine_type: cells[0].to_string(),
            air_temperature: field(cells[1]),
            process_temperature: field(cells[2]),
            rotational_speed: field(cells[3]),
            torque: field(cells[4]),
            tool_wear: field(cells[5]),
        }
    }

    /// Machine type first, so an unknown category fails before any
    /// numeric parsing.
    pub fn parse(&self) -> Result<FeatureRecord, InferenceError> {
        let machine_type = MachineType::from_token(&self.machine_type)?;

        let numeric = |value: &Option<FieldValue>, field: &str| match value {
            Some(v) => v.parse(field),
            None => Err(InferenceError::non_numeric(field, "")),
        };

        Ok(FeatureRecord {
            machine_type,
            air_temperature: numeric(&self.air_temperature, FEATURE_FIELDS[1])?,
            process_temperature: numeric(&self.process_temperature, FEATURE_FIELDS[2])?,
            rotational_speed: numeric(&self.rotational_speed, FEATURE_FIELDS[3])?,
            torque: numeric(&self.torque, FEATURE_FIELDS[4])?,
            tool_wear: numeric(&self.tool_wear, FEATURE_FIELDS[5])?,
        })
    }
}

// ============================================================================
// PREDICTION RESULT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureLabel {
    Normal,
    Failure,
}

impl FailureLabel {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(FailureLabel::Normal),
            1 => Some(FailureLabel::Failure),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            FailureLabel::Normal => 0,
            FailureLabel::Failure => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FailureLabel::Normal => "Normal",
            FailureLabel::Failure => "Failure",
        }
    }

    pub fn is_failure(self) -> bool {
        self == FailureLabel::Failure
    }
}

/// Classifier output for one scaled vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub label: FailureLabel,
    /// Probability of failure, when the classifier exposes one
    pub probability: Option<f64>,
}

/// A record together with its predicted label
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub record: FeatureRecord,
    pub label: FailureLabel,
    pub prediction: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_probability: Option<f64>,
}

impl PredictionResult {
    pub fn new(record: FeatureRecord, decision: Decision) -> Self {
        Self {
            record,
            label: decision.label,
            prediction: decision.label.code(),
            failure_probability: decision.probability,
        }
    }
}
