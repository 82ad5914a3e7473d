//! Prediction handlers

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{csv_attachment, read_table};
use crate::dataset::{self, BatchSummary};
use crate::features::{PredictionResult, RawFeatureRecord};
use crate::{AppResult, AppState};

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    #[serde(flatten)]
    pub result: PredictionResult,
    pub message: &'static str,
}

fn verdict(result: &PredictionResult) -> &'static str {
    if result.label.is_failure() {
        "Machine is likely to FAIL!"
    } else {
        "Machine is operating normally."
    }
}

/// Predict one machine
pub async fn single(
    State(state): State<AppState>,
    Json(raw): Json<RawFeatureRecord>,
) -> AppResult<Json<PredictResponse>> {
    let record = raw.parse()?;
    record.validate()?;

    // the ONNX backend holds a session lock while it runs
    let service = state.service.clone();
    let result = tokio::task::spawn_blocking(move || service.predict_one(&record)).await??;
    tracing::debug!(
        "Prediction for type {}: {}",
        record.machine_type,
        result.label.as_str()
    );

    Ok(Json(PredictResponse {
        message: verdict(&result),
        result,
    }))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Deserialize)]
pub struct BatchQuery {
    #[serde(default)]
    pub format: BatchFormat,
    /// Also emit the Failure_Label column
    #[serde(default)]
    pub labels: bool,
    #[serde(default)]
    pub skip_invalid: bool,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub batch_id: Uuid,
    #[serde(flatten)]
    pub summary: BatchSummary,
}

/// Predict every row of an uploaded CSV
pub async fn batch(
    State(state): State<AppState>,
    Query(query): Query<BatchQuery>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Response> {
    let table = read_table(&headers, body)?;
    let options = state.config.batch_options(query.skip_invalid);
    let preview_rows = state.config.preview_rows;
    let include_labels = query.labels;
    let service = state.service.clone();

    let (summary, output) = tokio::task::spawn_blocking(move || {
        let outcome = dataset::predict_table(&service, &table, &options)?;
        let output = dataset::output_table(&table, &outcome, include_labels);
        let summary = BatchSummary::new(&table, &outcome, &output, preview_rows);
        Ok::<_, crate::model::InferenceError>((summary, output))
    })
    .await??;

    state.service.record_batch();

    let batch_id = Uuid::new_v4();
    tracing::info!(
        "Batch {}: {} rows predicted, {} failures, {} rejected",
        batch_id,
        summary.predicted_rows,
        summary.failure_count,
        summary.rejected.len()
    );

    match query.format {
        BatchFormat::Json => Ok(Json(BatchResponse { batch_id, summary }).into_response()),
        BatchFormat::Csv => {
            let bytes = output.to_csv()?;
            Ok((csv_attachment("predictions.csv"), bytes).into_response())
        }
    }
}
