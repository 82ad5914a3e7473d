//! Features Module - input schema for the failure model
//!
//! Layout, categorical encoding and the record types that flow into and
//! out of the inference service.

pub mod layout;
pub mod machine_type;
pub mod record;

pub use layout::{LayoutInfo, FEATURE_COLUMNS, FEATURE_COUNT, FEATURE_FIELDS};
pub use machine_type::{encode_type, MachineType};
pub use record::{
    Decision, FailureLabel, FeatureRecord, FieldValue, PredictionResult, RawFeatureRecord,
};
