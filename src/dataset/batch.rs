//! Batch prediction over an uploaded table
//!
//! Column checks run before any row is parsed, so a table missing a
//! required column never produces partial output.

use serde::{Deserialize, Serialize};

use super::table::{Preview, Table};
use crate::features::layout::{FEATURE_COLUMNS, FEATURE_COUNT, LABEL_COLUMN, PREDICTION_COLUMN};
use crate::features::{FeatureRecord, PredictionResult, RawFeatureRecord};
use crate::model::{InferenceError, InferenceService};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOptions {
    /// Keep columns outside the layout instead of rejecting the table
    pub allow_extra_columns: bool,
    /// Drop unparseable rows instead of failing the batch
    pub skip_invalid_rows: bool,
}

/// A row left out of the output, 1-based excluding the header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    pub row: usize,
    pub reason: String,
}

/// Parsed records plus where each came from in the table
#[derive(Debug, Clone, Default)]
pub struct PreparedBatch {
    pub records: Vec<FeatureRecord>,
    pub row_indices: Vec<usize>,
    pub rejected: Vec<RejectedRow>,
}

#[derive(Debug, Clone)]
pub struct PredictedRow {
    pub row_index: usize,
    pub result: PredictionResult,
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub rows: Vec<PredictedRow>,
    pub rejected: Vec<RejectedRow>,
}

impl BatchOutcome {
    pub fn failure_count(&self) -> usize {
        self.rows.iter().filter(|r| r.result.label.is_failure()).count()
    }
}

/// Locate each layout column in the table, in layout order
pub fn resolve_columns(
    table: &Table,
    allow_extra_columns: bool,
) -> Result<[usize; FEATURE_COUNT], InferenceError> {
    let mut indices = [0usize; FEATURE_COUNT];
    for (slot, column) in indices.iter_mut().zip(FEATURE_COLUMNS) {
        *slot = table
            .column_index(column)
            .ok_or_else(|| InferenceError::MissingColumn(column.to_string()))?;
    }

    if !allow_extra_columns {
        if let Some(extra) = table.headers.iter().find(|h| !FEATURE_COLUMNS.contains(&h.as_str())) {
            return Err(InferenceError::UnexpectedColumn(extra.clone()));
        }
    }

    Ok(indices)
}

/// Validate columns, then parse each row into a record
pub fn prepare(table: &Table, options: &BatchOptions) -> Result<PreparedBatch, InferenceError> {
    let columns = resolve_columns(table, options.allow_extra_columns)?;

    let mut batch = PreparedBatch::default();
    for (index, row) in table.rows.iter().enumerate() {
        let cells = columns.map(|c| row.get(c).map(String::as_str).unwrap_or(""));

        match RawFeatureRecord::from_cells(cells).parse() {
            Ok(record) => {
                batch.records.push(record);
                batch.row_indices.push(index);
            }
            Err(e) if options.skip_invalid_rows => {
                batch.rejected.push(RejectedRow { row: index + 1, reason: e.to_string() });
            }
            Err(e) => return Err(e.at_row(index + 1)),
        }
    }

    Ok(batch)
}

/// Predict every usable row of `table`
pub fn predict_table(
    service: &InferenceService,
    table: &Table,
    options: &BatchOptions,
) -> Result<BatchOutcome, InferenceError> {
    let prepared = prepare(table, options)?;

    if !prepared.rejected.is_empty() {
        tracing::warn!("Skipped {} invalid rows in batch", prepared.rejected.len());
    }

    let results = service.predict_many(&prepared.records).map_err(|e| match e {
        InferenceError::InvalidRow { row, source } => InferenceError::InvalidRow {
            row: prepared.row_indices[row - 1] + 1,
            source,
        },
        other => other,
    })?;

    let rows = prepared
        .row_indices
        .into_iter()
        .zip(results)
        .map(|(row_index, result)| PredictedRow { row_index, result })
        .collect();

    Ok(BatchOutcome { rows, rejected: prepared.rejected })
}

/// Input columns followed by the prediction column (and label column)
pub fn output_table(table: &Table, outcome: &BatchOutcome, include_labels: bool) -> Table {
    let keep: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.as_str() != PREDICTION_COLUMN && h.as_str() != LABEL_COLUMN)
        .map(|(i, _)| i)
        .collect();

    let mut headers: Vec<String> = keep.iter().map(|&i| table.headers[i].clone()).collect();
    headers.push(PREDICTION_COLUMN.to_string());
    if include_labels {
        headers.push(LABEL_COLUMN.to_string());
    }

    let rows = outcome
        .rows
        .iter()
        .map(|predicted| {
            let source = &table.rows[predicted.row_index];
            let mut row: Vec<String> = keep
                .iter()
                .map(|&i| source.get(i).cloned().unwrap_or_default())
                .collect();
            row.push(predicted.result.prediction.to_string());
            if include_labels {
                row.push(predicted.result.label.as_str().to_string());
            }
            row
        })
        .collect();

    Table::new(headers, rows)
}

/// Summary returned to JSON clients
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total_rows: usize,
    pub predicted_rows: usize,
    pub failure_count: usize,
    pub normal_count: usize,
    pub rejected: Vec<RejectedRow>,
    pub preview: Preview,
}

impl BatchSummary {
    pub fn new(table: &Table, outcome: &BatchOutcome, output: &Table, preview_rows: usize) -> Self {
        let failure_count = outcome.failure_count();
        Self {
            total_rows: table.len(),
            predicted_rows: outcome.rows.len(),
            failure_count,
            normal_count: outcome.rows.len() - failure_count,
            rejected: outcome.rejected.clone(),
            preview: output.preview(preview_rows),
        }
    }
}
