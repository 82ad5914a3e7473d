//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the feature schema.**
//!
//! The scaler and classifier were fitted on vectors in exactly this order.
//! Changing the order, adding or removing a column means the artifacts
//! must be refitted, and `FEATURE_VERSION` must be incremented.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Table column headers in the exact order they appear in the vector
pub const FEATURE_COLUMNS: &[&str] = &[
    "Type",                     // 0: machine type, encoded L=0 M=1 H=2
    "Air temperature [K]",      // 1
    "Process temperature [K]",  // 2
    "Rotational speed [rpm]",   // 3
    "Torque [Nm]",              // 4
    "Tool wear [min]",          // 5
];

/// Field names used by JSON requests, same order as `FEATURE_COLUMNS`
pub const FEATURE_FIELDS: &[&str] = &[
    "machine_type",
    "air_temperature",
    "process_temperature",
    "rotational_speed",
    "torque",
    "tool_wear",
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_COLUMNS.len()!
pub const FEATURE_COUNT: usize = 6;

/// Column appended to batch output with the 0/1 prediction
pub const PREDICTION_COLUMN: &str = "Failure_Prediction";

/// Optional human-readable label column
pub const LABEL_COLUMN: &str = "Failure_Label";

/// Ground-truth column found in the public training dataset
pub const GROUND_TRUTH_COLUMN: &str = "Machine failure";

/// Numeric sensor columns (everything but `Type`)
pub fn sensor_columns() -> &'static [&'static str] {
    &FEATURE_COLUMNS[1..]
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 hash of the feature layout
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_COLUMNS {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for the model status endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub columns: Vec<String>,
    pub fields: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            columns: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            fields: FEATURE_FIELDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LOOKUP
// ============================================================================

/// Check whether a list of names describes this layout, accepting either
/// column headers or JSON field names.
pub fn matches_layout<S: AsRef<str>>(names: &[S]) -> bool {
    if names.len() != FEATURE_COUNT {
        return false;
    }
    let as_columns = names.iter().zip(FEATURE_COLUMNS).all(|(n, c)| n.as_ref() == *c);
    let as_fields = names.iter().zip(FEATURE_FIELDS).all(|(n, f)| n.as_ref() == *f);
    as_columns || as_fields
}
