//! Inference Service
//!
//! Context object built once at startup and shared read-only behind an
//! `Arc`. Every prediction goes through `predict_many`, so a single record
//! and a batch of one always agree.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::artifacts::{self, ArtifactPaths, LoadedArtifacts, ModelMetadata};
use super::classifier::Classifier;
use super::error::InferenceError;
use super::scaler::Scaler;
use crate::features::layout::FEATURE_COUNT;
use crate::features::{encode_type, FeatureRecord, PredictionResult, RawFeatureRecord};

/// Engine status for the model endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_loaded: bool,
    pub scaler: String,
    pub classifier: String,
    pub predictions: u64,
    pub failures_predicted: u64,
    pub batches: u64,
    pub avg_latency_ms: f32,
}

#[derive(Debug, Default)]
struct InferenceStats {
    latency_sum_us: AtomicU64,
    calls: AtomicU64,
    predictions: AtomicU64,
    failures: AtomicU64,
    batches: AtomicU64,
}

pub struct InferenceService {
    scaler: Scaler,
    classifier: Box<dyn Classifier>,
    metadata: ModelMetadata,
    stats: InferenceStats,
}

impl std::fmt::Debug for InferenceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceService")
            .field("scaler", &self.scaler.kind())
            .field("classifier", &self.classifier.kind())
            .finish()
    }
}

impl InferenceService {
    /// Read both artifacts from disk
    pub fn load(paths: &ArtifactPaths) -> Result<Self, InferenceError> {
        Self::from_artifacts(artifacts::load(paths)?)
    }

    pub fn from_artifacts(loaded: LoadedArtifacts) -> Result<Self, InferenceError> {
        let LoadedArtifacts { scaler, classifier, metadata } = loaded;

        if scaler.dimension() != FEATURE_COUNT || classifier.dimension() != FEATURE_COUNT {
            return Err(InferenceError::artifact(
                "classifier",
                format!(
                    "artifacts describe {}/{} features, layout has {}",
                    scaler.dimension(),
                    classifier.dimension(),
                    FEATURE_COUNT
                ),
            ));
        }

        Ok(Self {
            scaler,
            classifier,
            metadata,
            stats: InferenceStats::default(),
        })
    }

    /// Build from in-memory artifacts
    pub fn new(scaler: Scaler, classifier: Box<dyn Classifier>) -> Result<Self, InferenceError> {
        let metadata = ModelMetadata::in_memory(&scaler, classifier.as_ref());
        Self::from_artifacts(LoadedArtifacts { scaler, classifier, metadata })
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// "L"/"M"/"H" to 0/1/2
    pub fn encode_type(value: &str) -> Result<u8, InferenceError> {
        encode_type(value)
    }

    pub fn predict_one(&self, record: &FeatureRecord) -> Result<PredictionResult, InferenceError> {
        self.predict_many(std::slice::from_ref(record))?
            .pop()
            .ok_or_else(|| InferenceError::Runtime("classifier returned no decision".to_string()))
    }

    /// Parse an unvalidated record, then predict. Parsing fails before the
    /// scaler or classifier is involved.
    pub fn predict_raw(&self, raw: &RawFeatureRecord) -> Result<PredictionResult, InferenceError> {
        let record = raw.parse()?;
        self.predict_one(&record)
    }

    /// Result i belongs to record i. Any failure discards the whole batch.
    pub fn predict_many(
        &self,
        records: &[FeatureRecord],
    ) -> Result<Vec<PredictionResult>, InferenceError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        for (i, record) in records.iter().enumerate() {
            record.ensure_finite().map_err(|e| {
                if records.len() == 1 {
                    e
                } else {
                    e.at_row(i + 1)
                }
            })?;
        }

        let start = Instant::now();

        let matrix = feature_matrix(records);
        let scaled = self.scaler.transform(matrix.view())?;
        let decisions = self.classifier.predict(scaled.view())?;

        if decisions.len() != records.len() {
            return Err(InferenceError::Runtime(format!(
                "classifier returned {} decisions for {} records",
                decisions.len(),
                records.len()
            )));
        }

        let results: Vec<PredictionResult> = records
            .iter()
            .zip(decisions)
            .map(|(record, decision)| PredictionResult::new(*record, decision))
            .collect();

        self.record_call(start, &results);
        Ok(results)
    }

    /// Count a finished batch upload
    pub fn record_batch(&self) {
        self.stats.batches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn status(&self) -> EngineStatus {
        let sum = self.stats.latency_sum_us.load(Ordering::Relaxed);
        let calls = self.stats.calls.load(Ordering::Relaxed);
        let avg = if calls > 0 { (sum as f32 / calls as f32) / 1000.0 } else { 0.0 };

        EngineStatus {
            model_loaded: true,
            scaler: self.scaler.kind().to_string(),
            classifier: self.classifier.kind().to_string(),
            predictions: self.stats.predictions.load(Ordering::Relaxed),
            failures_predicted: self.stats.failures.load(Ordering::Relaxed),
            batches: self.stats.batches.load(Ordering::Relaxed),
            avg_latency_ms: avg,
        }
    }

    fn record_call(&self, start: Instant, results: &[PredictionResult]) {
        let elapsed = start.elapsed().as_micros() as u64;
        let failures = results.iter().filter(|r| r.label.is_failure()).count() as u64;

        self.stats.latency_sum_us.fetch_add(elapsed, Ordering::Relaxed);
        self.stats.calls.fetch_add(1, Ordering::Relaxed);
        self.stats.predictions.fetch_add(results.len() as u64, Ordering::Relaxed);
        self.stats.failures.fetch_add(failures, Ordering::Relaxed);
    }
}

/// Stack records into an `[N, FEATURE_COUNT]` matrix in layout order
pub fn feature_matrix(records: &[FeatureRecord]) -> Array2<f64> {
    let mut matrix = Array2::<f64>::zeros((records.len(), FEATURE_COUNT));
    for (mut row, record) in matrix.rows_mut().into_iter().zip(records) {
        for (cell, value) in row.iter_mut().zip(record.to_vector()) {
            *cell = value;
        }
    }
    matrix
}
