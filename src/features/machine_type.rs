//! Machine type - the only categorical feature
//!
//! Product quality variant of the machine: L(ow), M(edium), H(igh).
//! Encoded as 0, 1, 2 before scaling.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::InferenceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineType {
    #[serde(rename = "L")]
    Low,
    #[serde(rename = "M")]
    Medium,
    #[serde(rename = "H")]
    High,
}

impl MachineType {
    pub const ALL: [MachineType; 3] = [MachineType::Low, MachineType::Medium, MachineType::High];

    /// Parse the literal token used in tables and forms
    pub fn from_token(token: &str) -> Result<Self, InferenceError> {
        match token {
            "L" => Ok(MachineType::Low),
            "M" => Ok(MachineType::Medium),
            "H" => Ok(MachineType::High),
            other => Err(InferenceError::UnrecognizedCategory(other.to_string())),
        }
    }

    /// Integer code fed to the scaler
    pub fn code(self) -> u8 {
        match self {
            MachineType::Low => 0,
            MachineType::Medium => 1,
            MachineType::High => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(MachineType::Low),
            1 => Some(MachineType::Medium),
            2 => Some(MachineType::High),
            _ => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            MachineType::Low => "L",
            MachineType::Medium => "M",
            MachineType::High => "H",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MachineType::Low => "Low",
            MachineType::Medium => "Medium",
            MachineType::High => "High",
        }
    }
}

impl FromStr for MachineType {
    type Err = InferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MachineType::from_token(s)
    }
}

impl fmt::Display for MachineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Map a machine type token to its fixed integer code
pub fn encode_type(value: &str) -> Result<u8, InferenceError> {
    MachineType::from_token(value).map(MachineType::code)
}
