//! Artifact loading
//!
//! The scaler and classifier are read once at startup. Both files are
//! hashed so the status endpoint can report exactly which model is live,
//! and an expected digest can be pinned through configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::classifier::{Classifier, LogisticRegression};
use super::error::InferenceError;
use super::onnx::OnnxClassifier;
use super::scaler::Scaler;
use crate::features::layout::{layout_hash, FEATURE_COUNT, FEATURE_VERSION};

/// Where to find the artifacts, and the digests they must have
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub scaler: PathBuf,
    pub classifier: PathBuf,
    pub scaler_sha256: Option<String>,
    pub classifier_sha256: Option<String>,
}

impl ArtifactPaths {
    pub fn new(scaler: impl Into<PathBuf>, classifier: impl Into<PathBuf>) -> Self {
        Self {
            scaler: scaler.into(),
            classifier: classifier.into(),
            scaler_sha256: None,
            classifier_sha256: None,
        }
    }
}

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub scaler_path: String,
    pub scaler_kind: String,
    pub scaler_sha256: String,
    pub classifier_path: String,
    pub classifier_kind: String,
    pub classifier_sha256: String,
    pub features: usize,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

impl ModelMetadata {
    /// Metadata for artifacts built in memory rather than read from disk
    pub fn in_memory(scaler: &Scaler, classifier: &dyn Classifier) -> Self {
        Self {
            scaler_path: "<memory>".to_string(),
            scaler_kind: scaler.kind().to_string(),
            scaler_sha256: String::new(),
            classifier_path: "<memory>".to_string(),
            classifier_kind: classifier.kind().to_string(),
            classifier_sha256: String::new(),
            features: FEATURE_COUNT,
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            loaded_at: chrono::Utc::now(),
        }
    }
}

/// Artifacts ready to hand to the inference service
pub struct LoadedArtifacts {
    pub scaler: Scaler,
    pub classifier: Box<dyn Classifier>,
    pub metadata: ModelMetadata,
}

/// Load and cross-check both artifacts
pub fn load(paths: &ArtifactPaths) -> Result<LoadedArtifacts, InferenceError> {
    let scaler_sha256 = verify_checksum("scaler", &paths.scaler, paths.scaler_sha256.as_deref())?;
    let scaler = Scaler::load(&paths.scaler)?;

    let classifier_sha256 = verify_checksum(
        "classifier",
        &paths.classifier,
        paths.classifier_sha256.as_deref(),
    )?;
    let classifier = load_classifier(&paths.classifier)?;

    if scaler.dimension() != classifier.dimension() {
        return Err(InferenceError::artifact(
            "classifier",
            format!(
                "scaler produces {} features but classifier expects {}",
                scaler.dimension(),
                classifier.dimension()
            ),
        ));
    }

    let metadata = ModelMetadata {
        scaler_path: paths.scaler.display().to_string(),
        scaler_kind: scaler.kind().to_string(),
        scaler_sha256,
        classifier_path: paths.classifier.display().to_string(),
        classifier_kind: classifier.kind().to_string(),
        classifier_sha256,
        features: FEATURE_COUNT,
        feature_version: FEATURE_VERSION,
        layout_hash: layout_hash(),
        loaded_at: chrono::Utc::now(),
    };

    tracing::info!(
        scaler = %metadata.scaler_path,
        scaler_sha256 = %metadata.scaler_sha256,
        classifier = %metadata.classifier_path,
        classifier_sha256 = %metadata.classifier_sha256,
        "Model artifacts loaded"
    );

    Ok(LoadedArtifacts { scaler, classifier, metadata })
}

/// Pick the classifier backend from the file extension
pub fn load_classifier(path: &Path) -> Result<Box<dyn Classifier>, InferenceError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("onnx") => Ok(Box::new(OnnxClassifier::load(path)?)),
        Some("json") => Ok(Box::new(LogisticRegression::load(path)?)),
        _ => Err(InferenceError::artifact(
            "classifier",
            format!("unsupported classifier format: {}", path.display()),
        )),
    }
}

/// Hash a file; fail when it does not match the pinned digest
fn verify_checksum(
    artifact: &'static str,
    path: &Path,
    expected: Option<&str>,
) -> Result<String, InferenceError> {
    let bytes = std::fs::read(path)
        .map_err(|e| InferenceError::artifact(artifact, format!("{}: {}", path.display(), e)))?;
    let actual = sha256_hex(&bytes);

    if let Some(expected) = expected {
        if !expected.trim().eq_ignore_ascii_case(&actual) {
            return Err(InferenceError::artifact(
                artifact,
                format!("checksum mismatch: expected {}, got {}", expected.trim(), actual),
            ));
        }
    }

    Ok(actual)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
