//! Configuration module

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::dataset::BatchOptions;
use crate::insights::InsightsOptions;
use crate::model::ArtifactPaths;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: [u8; 4],

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Fitted scaler (JSON)
    pub scaler_path: PathBuf,

    /// Fitted classifier (.onnx or .json)
    pub classifier_path: PathBuf,

    /// Expected artifact digests, hex SHA-256
    pub scaler_sha256: Option<String>,
    pub classifier_sha256: Option<String>,

    /// Upload size limit in bytes
    pub max_upload_bytes: usize,

    /// Rows shown in table previews
    pub preview_rows: usize,

    /// Pass unknown batch columns through instead of rejecting them
    pub batch_allow_extra_columns: bool,

    /// Default histogram bin count
    pub histogram_bins: usize,

    /// Largest bin count a client may request
    pub max_histogram_bins: usize,

    /// Upper bound for generated sample datasets
    pub max_sample_rows: usize,

    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| {
            lookup(key)
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(false)
        };

        let model_dir = PathBuf::from(lookup("MODEL_DIR").unwrap_or_else(|| "models".to_string()));

        Self {
            host: lookup("HOST")
                .and_then(|h| h.parse::<std::net::Ipv4Addr>().ok())
                .map(|ip| ip.octets())
                .unwrap_or([0, 0, 0, 0]),

            port: parse_var(lookup("PORT")).unwrap_or(8080),

            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),

            scaler_path: lookup("SCALER_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| model_dir.join("scaler.json")),

            classifier_path: lookup("CLASSIFIER_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| model_dir.join("model.json")),

            scaler_sha256: lookup("SCALER_SHA256").filter(|s| !s.trim().is_empty()),
            classifier_sha256: lookup("CLASSIFIER_SHA256").filter(|s| !s.trim().is_empty()),

            max_upload_bytes: parse_var(lookup("MAX_UPLOAD_BYTES")).unwrap_or(50 * 1024 * 1024),

            preview_rows: parse_var(lookup("PREVIEW_ROWS")).unwrap_or(5),

            batch_allow_extra_columns: flag("BATCH_ALLOW_EXTRA_COLUMNS"),

            histogram_bins: parse_var::<usize>(lookup("HISTOGRAM_BINS")).filter(|b| *b > 0).unwrap_or(20),

            max_histogram_bins: parse_var::<usize>(lookup("MAX_HISTOGRAM_BINS"))
                .filter(|b| *b > 0)
                .unwrap_or(200),

            max_sample_rows: parse_var(lookup("MAX_SAMPLE_ROWS")).unwrap_or(10_000),

            log_format: match lookup("LOG_FORMAT").as_deref().map(str::trim) {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        }
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            scaler: self.scaler_path.clone(),
            classifier: self.classifier_path.clone(),
            scaler_sha256: self.scaler_sha256.clone(),
            classifier_sha256: self.classifier_sha256.clone(),
        }
    }

    pub fn batch_options(&self, skip_invalid_rows: bool) -> BatchOptions {
        BatchOptions {
            allow_extra_columns: self.batch_allow_extra_columns,
            skip_invalid_rows,
        }
    }

    pub fn insights_options(&self, bins: Option<usize>) -> InsightsOptions {
        InsightsOptions {
            histogram_bins: bins
                .filter(|b| *b > 0)
                .unwrap_or(self.histogram_bins)
                .min(self.max_histogram_bins),
            preview_rows: self.preview_rows,
        }
    }
}

fn parse_var<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
